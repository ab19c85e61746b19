use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "style_masters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub item_master_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item_masters::Entity",
        from = "Column::ItemMasterId",
        to = "super::item_masters::Column::Id"
    )]
    ItemMasters,
}

impl Related<super::item_masters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemMasters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
