use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::bills::{BillGenerated, BillList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Bill,
    response::ApiResponse,
    routes::params::PaymentQuery,
    services::bill_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bills))
        .route("/{id}", get(get_bill))
        .route("/{id}/pdf", post(regenerate_pdf))
}

#[utoipa::path(
    get,
    path = "/api/bills",
    params(PaymentQuery),
    responses((status = 200, description = "List bills", body = ApiResponse<BillList>)),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn list_bills(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PaymentQuery>,
) -> AppResult<Json<ApiResponse<BillList>>> {
    let resp = bill_service::list_bills(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bills/{id}",
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Get bill", body = ApiResponse<Bill>),
        (status = 404, description = "Bill not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn get_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Bill>>> {
    let resp = bill_service::get_bill(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bills/{id}/pdf",
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Re-render and re-upload the bill PDF", body = ApiResponse<BillGenerated>),
        (status = 500, description = "Rendering or upload failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn regenerate_pdf(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BillGenerated>>> {
    let resp = bill_service::regenerate_pdf(&state, &user, id).await?;
    Ok(Json(resp))
}
