use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "item_masters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub stitching_charge: Decimal,
    pub category: Option<String>,
    /// Embedded `[{style_id, style_name, description}]`.
    #[sea_orm(column_type = "JsonBinary")]
    pub styles: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::style_masters::Entity")]
    StyleMasters,
}

impl Related<super::style_masters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StyleMasters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
