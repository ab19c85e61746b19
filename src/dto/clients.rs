use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::Client;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateClientRequest {
    pub branch_id: Option<Uuid>,
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

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 10, max = 15))]
    pub mobile: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub gstin: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClientList {
    pub items: Vec<Client>,
}
