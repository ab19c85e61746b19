use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub item_type_id: Uuid,
    pub item_name: String,
    pub fabric_id: Option<Uuid>,
    pub fabric_name: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub fabric_meters: Decimal,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub style: Option<Json>,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub fabric_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub stitching_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub alteration: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub handwork: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub other_charges: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_price: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Orders,
    #[sea_orm(
        belongs_to = "super::item_masters::Entity",
        from = "Column::ItemTypeId",
        to = "super::item_masters::Column::Id"
    )]
    ItemMasters,
    #[sea_orm(
        belongs_to = "super::fabrics::Entity",
        from = "Column::FabricId",
        to = "super::fabrics::Column::Id"
    )]
    Fabrics,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::item_masters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemMasters.def()
    }
}

impl Related<super::fabrics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fabrics.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
