use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::orders::OrderItemRequest;
use crate::models::{ClientDetails, DiscountType, Invoice, OrderType, PendingOrder};

/// Counter-side intake captured before pricing; billed later into an invoice.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePendingOrderRequest {
    pub branch_id: Option<Uuid>,
    #[validate(nested)]
    pub customer: ClientDetails,
    pub order_type: OrderType,
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<OrderItemRequest>,
    pub master_name: Option<String>,
    pub salesman_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BillPendingOrderRequest {
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_value: Decimal,
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub paid_amount: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingOrderList {
    pub items: Vec<PendingOrder>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceList {
    pub items: Vec<Invoice>,
}
