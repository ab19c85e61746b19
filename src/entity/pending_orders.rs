use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pending_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary")]
    pub customer: Json,
    pub order_type: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub items: Json,
    pub master_name: Option<String>,
    pub salesman_name: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub expires_at: DateTimeWithTimeZone,
    pub invoice_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
