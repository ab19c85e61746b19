use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Branch, Fabric, FabricType, ItemMaster, ItemStyle, StyleMaster};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateBranchRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateBranchRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateFabricRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub fabric_type: FabricType,
    pub color: Option<String>,
    pub price_per_meter: Decimal,
    #[serde(default)]
    pub in_stock_meters: Decimal,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateFabricRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub fabric_type: Option<FabricType>,
    pub color: Option<String>,
    pub price_per_meter: Option<Decimal>,
    pub in_stock_meters: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub stitching_charge: Decimal,
    pub category: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub styles: Vec<ItemStyle>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub stitching_charge: Option<Decimal>,
    pub category: Option<String>,
    #[validate(nested)]
    pub styles: Option<Vec<ItemStyle>>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateStyleRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
    pub item_master_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateStyleRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub item_master_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BranchList {
    pub items: Vec<Branch>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FabricList {
    pub items: Vec<Fabric>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemList {
    pub items: Vec<ItemMaster>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StyleList {
    pub items: Vec<StyleMaster>,
}
