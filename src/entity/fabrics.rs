use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fabrics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub fabric_type: String,
    pub color: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price_per_meter: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub in_stock_meters: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
