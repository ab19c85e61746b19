use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub bill_number: String,
    #[sea_orm(unique)]
    pub order_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub bill_date: DateTimeWithTimeZone,
    pub due_date: Option<Date>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub subtotal: Decimal,
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
    pub pending_amount: Decimal,
    pub payment_status: String,
    pub notes: Option<String>,
    pub pdf_url: Option<String>,
    pub pdf_public_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Orders,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
