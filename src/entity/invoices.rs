use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub pending_order_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary")]
    pub customer: Json,
    pub order_type: String,
    /// Priced lines, stored as the serialized `InvoiceLine` list.
    #[sea_orm(column_type = "JsonBinary")]
    pub items: Json,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub subtotal: Decimal,
    pub discount_type: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub taxable_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub tax_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub tax_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub paid_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub balance_amount: Decimal,
    pub payment_status: String,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
