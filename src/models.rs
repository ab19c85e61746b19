use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Text-backed enum: serde snake_case, `as_str` for storage, `FromStr` for loading.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} `{}`", stringify!($name), other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(
    /// Production stages of an order. Staff may set any value; no transition table applies.
    OrderStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        InProgress => "in_progress",
        MeasurementTaken => "measurement_taken",
        Cutting => "cutting",
        Stitching => "stitching",
        QualityCheck => "quality_check",
        ReadyForDelivery => "ready_for_delivery",
        OutForDelivery => "out_for_delivery",
        Delivered => "delivered",
        Completed => "completed",
        Cancelled => "cancelled",
        OnHold => "on_hold",
    }
);

text_enum!(PaymentStatus {
    Pending => "pending",
    Partial => "partial",
    Paid => "paid",
    Overdue => "overdue",
    Refunded => "refunded",
});

text_enum!(
    /// Only `Fabric` changes pricing; every other type is priced as a stitched line.
    OrderType {
        Stitching => "stitching",
        Fabric => "fabric",
        Alteration => "alteration",
        Readymade => "readymade",
    }
);

text_enum!(DiscountType {
    Percentage => "percentage",
    Fixed => "fixed",
});

text_enum!(FabricType {
    Cotton => "cotton",
    Silk => "silk",
    Linen => "linen",
    Wool => "wool",
    Polyester => "polyester",
    Blend => "blend",
    Other => "other",
});

text_enum!(PendingOrderStatus {
    Pending => "pending",
    Billed => "billed",
    Expired => "expired",
});

text_enum!(Role {
    Director => "director",
    SuperAdmin => "super_admin",
    Admin => "admin",
    Manager => "manager",
    Staff => "staff",
});

impl Default for DiscountType {
    fn default() -> Self {
        DiscountType::Fixed
    }
}

impl Role {
    /// Directors and super admins see every branch.
    pub fn sees_all_branches(&self) -> bool {
        matches!(self, Role::Director | Role::SuperAdmin)
    }
}

/// Parse a text column back into its enum, treating garbage as a server fault.
pub fn parse_stored<T>(value: &str) -> Result<T, AppError>
where
    T: FromStr<Err = String>,
{
    value
        .parse::<T>()
        .map_err(|err| AppError::Internal(anyhow::anyhow!("corrupt stored value: {err}")))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub branch_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Fabric {
    pub id: Uuid,
    pub name: String,
    pub fabric_type: FabricType,
    pub color: Option<String>,
    pub price_per_meter: Decimal,
    pub in_stock_meters: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ItemStyle {
    pub style_id: Option<Uuid>,
    #[validate(length(min = 1, max = 120))]
    pub style_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemMaster {
    pub id: Uuid,
    pub name: String,
    pub stitching_charge: Decimal,
    pub category: Option<String>,
    pub styles: Vec<ItemStyle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StyleMaster {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub item_master_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Client {
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    pub name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub gstin: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inline customer snapshot captured when no registered client is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ClientDetails {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 10, max = 15))]
    pub mobile: String,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub gstin: Option<String>,
}

impl From<&Client> for ClientDetails {
    fn from(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            mobile: client.mobile.clone(),
            email: client.email.clone(),
            address: client.address.clone(),
            city: client.city.clone(),
            state: client.state.clone(),
            pincode: client.pincode.clone(),
            gstin: client.gstin.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct ShippingDetails {
    #[validate(length(min = 1))]
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub contact_name: Option<String>,
    pub contact_mobile: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub branch_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub client_details: Option<ClientDetails>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub advance_payment: Decimal,
    pub shipping_details: Option<ShippingDetails>,
    pub notes: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub actual_delivery_date: Option<NaiveDate>,
    pub bill_id: Option<Uuid>,
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub item_type_id: Uuid,
    pub item_name: String,
    pub fabric_id: Option<Uuid>,
    pub fabric_name: Option<String>,
    pub fabric_meters: Decimal,
    pub style: Option<ItemStyle>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub fabric_cost: Decimal,
    pub stitching_cost: Decimal,
    pub alteration: Decimal,
    pub handwork: Decimal,
    pub other_charges: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Bill {
    pub id: Uuid,
    pub bill_number: String,
    pub order_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub bill_date: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub pdf_url: Option<String>,
    pub pdf_public_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One priced line as stored on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceLine {
    pub item_type_id: Uuid,
    pub item_name: String,
    pub fabric_id: Option<Uuid>,
    pub fabric_name: Option<String>,
    pub fabric_meters: Decimal,
    pub style: Option<ItemStyle>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub fabric_cost: Decimal,
    pub stitching_cost: Decimal,
    pub alteration: Decimal,
    pub handwork: Decimal,
    pub other_charges: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingOrder {
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    pub customer: ClientDetails,
    pub order_type: OrderType,
    #[schema(value_type = Vec<Object>)]
    pub items: serde_json::Value,
    pub master_name: Option<String>,
    pub salesman_name: Option<String>,
    pub notes: Option<String>,
    pub status: PendingOrderStatus,
    pub expires_at: DateTime<Utc>,
    pub invoice_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub pending_order_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub customer: ClientDetails,
    pub order_type: OrderType,
    pub items: Vec<InvoiceLine>,
    pub subtotal: Decimal,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
