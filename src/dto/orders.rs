use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    Bill, ClientDetails, DiscountType, ItemStyle, Order, OrderItem, OrderStatus, OrderType,
    PaymentStatus, ShippingDetails,
};

fn one() -> i32 {
    1
}

/// One requested line; prices come from the catalogue, never from the client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct OrderItemRequest {
    pub item_type_id: Uuid,
    pub fabric_id: Option<Uuid>,
    #[serde(default)]
    pub fabric_meters: Decimal,
    #[validate(nested)]
    pub style: Option<ItemStyle>,
    #[serde(default = "one")]
    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,
    #[serde(default)]
    pub alteration: Decimal,
    #[serde(default)]
    pub handwork: Decimal,
    #[serde(default)]
    pub other_charges: Decimal,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateOrderRequest {
    pub branch_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    #[validate(nested)]
    pub client_details: Option<ClientDetails>,
    pub order_type: OrderType,
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_value: Decimal,
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub advance_payment: Decimal,
    #[validate(nested)]
    pub shipping_details: Option<ShippingDetails>,
    pub notes: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
}

/// Omitted fields keep their stored values; `items`, when present, replaces
/// every line.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Option<Vec<OrderItemRequest>>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub advance_payment: Option<Decimal>,
    #[validate(nested)]
    pub shipping_details: Option<ShippingDetails>,
    pub notes: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
    pub advance_payment: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub bill: Option<Bill>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
