use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        bills::{BillGenerated, GenerateBillRequest},
        orders::{
            CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderRequest,
            UpdatePaymentRequest, UpdateStatusRequest,
        },
    },
    error::AppResult,
    extract::ApiJson,
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{bill_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/{id}/status", patch(update_status))
        .route("/{id}/payment", patch(update_payment))
        .route("/{id}/bill", post(generate_bill))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderListQuery),
    responses((status = 200, description = "List orders", body = ApiResponse<OrderList>)),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Create order", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid order"),
        (status = 404, description = "Unknown item type, fabric or client")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::create_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items and bill", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Update order", body = ApiResponse<OrderWithItems>),
        (status = 409, description = "Order already billed")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::update_order(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses((status = 200, description = "Delete order, its items, bill and bill PDF")),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::delete_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateStatusRequest,
    responses((status = 200, description = "Update production status", body = ApiResponse<Order>)),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/payment",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdatePaymentRequest,
    responses((status = 200, description = "Update payment status", body = ApiResponse<Order>)),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdatePaymentRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_payment(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/bill",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = GenerateBillRequest,
    responses(
        (status = 200, description = "Bill generated, rendered and uploaded", body = ApiResponse<BillGenerated>),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already billed")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn generate_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<ApiJson<GenerateBillRequest>>,
) -> AppResult<Json<ApiResponse<BillGenerated>>> {
    let payload = payload.map(|ApiJson(p)| p).unwrap_or_default();
    let resp = bill_service::generate_bill(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
