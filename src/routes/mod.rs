use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod bills;
pub mod catalogue;
pub mod clients;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod pending_orders;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/branches", catalogue::branches_router())
        .nest("/fabrics", catalogue::fabrics_router())
        .nest("/items", catalogue::items_router())
        .nest("/styles", catalogue::styles_router())
        .nest("/clients", clients::router())
        .nest("/orders", orders::router())
        .nest("/bills", bills::router())
        .nest("/pending-orders", pending_orders::router())
        .nest("/invoices", pending_orders::invoices_router())
}
