use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Bill, Order};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GenerateBillRequest {
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BillGenerated {
    pub order: Order,
    pub bill: Bill,
    pub pdf_url: Option<String>,
    pub pdf_size: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BillList {
    pub items: Vec<Bill>,
}
