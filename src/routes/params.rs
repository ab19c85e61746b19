use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{OrderStatus, PaymentStatus, PendingOrderStatus};

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

// Query strings keep page/per_page inline: serde_urlencoded cannot parse
// numbers through `#[serde(flatten)]`.

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogueQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive name search.
    pub q: Option<String>,
}

impl CatalogueQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Matches name or mobile.
    pub q: Option<String>,
}

impl ClientQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub client_id: Option<Uuid>,
    pub sort_order: Option<SortOrder>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub payment_status: Option<PaymentStatus>,
}

impl PaymentQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PendingOrderQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<PendingOrderStatus>,
}

impl PendingOrderQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}
