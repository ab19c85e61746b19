use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_number: String,
    pub branch_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub client_details: Option<Json>,
    pub order_type: String,
    pub status: String,
    pub payment_status: String,
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
    pub advance_payment: Decimal,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub shipping_details: Option<Json>,
    pub notes: Option<String>,
    pub expected_delivery_date: Option<Date>,
    pub actual_delivery_date: Option<Date>,
    pub bill_id: Option<Uuid>,
    pub pdf_url: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id"
    )]
    Clients,
    #[sea_orm(
        belongs_to = "super::branches::Entity",
        from = "Column::BranchId",
        to = "super::branches::Column::Id"
    )]
    Branches,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
    #[sea_orm(has_one = "super::bills::Entity")]
    Bills,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<super::branches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branches.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
