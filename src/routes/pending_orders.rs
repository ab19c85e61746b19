use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::pending_orders::{
        BillPendingOrderRequest, CreatePendingOrderRequest, InvoiceList, PendingOrderList,
        RecordPaymentRequest,
    },
    error::AppResult,
    extract::ApiJson,
    middleware::auth::AuthUser,
    models::{Invoice, PendingOrder},
    pdf::PDF_CONTENT_TYPE,
    response::ApiResponse,
    routes::params::{PaymentQuery, PendingOrderQuery},
    services::pending_order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pending_orders).post(create_pending_order))
        .route(
            "/{id}",
            get(get_pending_order).delete(delete_pending_order),
        )
        .route("/{id}/bill", post(bill_pending_order))
}

pub fn invoices_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices))
        .route("/{id}", get(get_invoice))
        .route("/{id}/payments", post(record_payment))
        .route("/{id}/pdf", get(invoice_pdf))
}

#[utoipa::path(
    get,
    path = "/api/pending-orders",
    params(PendingOrderQuery),
    responses((status = 200, description = "List pending orders; stale ones are expired first", body = ApiResponse<PendingOrderList>)),
    security(("bearer_auth" = [])),
    tag = "Pending orders"
)]
pub async fn list_pending_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PendingOrderQuery>,
) -> AppResult<Json<ApiResponse<PendingOrderList>>> {
    let resp = pending_order_service::list_pending_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/pending-orders",
    request_body = CreatePendingOrderRequest,
    responses((status = 200, description = "Capture a pending order", body = ApiResponse<PendingOrder>)),
    security(("bearer_auth" = [])),
    tag = "Pending orders"
)]
pub async fn create_pending_order(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreatePendingOrderRequest>,
) -> AppResult<Json<ApiResponse<PendingOrder>>> {
    let resp = pending_order_service::create_pending_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/pending-orders/{id}",
    params(("id" = Uuid, Path, description = "Pending order ID")),
    responses(
        (status = 200, description = "Get pending order", body = ApiResponse<PendingOrder>),
        (status = 404, description = "Pending order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Pending orders"
)]
pub async fn get_pending_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PendingOrder>>> {
    let resp = pending_order_service::get_pending_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/pending-orders/{id}",
    params(("id" = Uuid, Path, description = "Pending order ID")),
    responses(
        (status = 200, description = "Delete pending order"),
        (status = 409, description = "Already billed")
    ),
    security(("bearer_auth" = [])),
    tag = "Pending orders"
)]
pub async fn delete_pending_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = pending_order_service::delete_pending_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/pending-orders/{id}/bill",
    params(("id" = Uuid, Path, description = "Pending order ID")),
    request_body = BillPendingOrderRequest,
    responses(
        (status = 200, description = "Price the pending order into an invoice", body = ApiResponse<Invoice>),
        (status = 409, description = "Pending order is billed or expired")
    ),
    security(("bearer_auth" = [])),
    tag = "Pending orders"
)]
pub async fn bill_pending_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<ApiJson<BillPendingOrderRequest>>,
) -> AppResult<Json<ApiResponse<Invoice>>> {
    let payload = payload.map(|ApiJson(p)| p).unwrap_or_default();
    let resp = pending_order_service::bill_pending_order(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    params(PaymentQuery),
    responses((status = 200, description = "List invoices", body = ApiResponse<InvoiceList>)),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PaymentQuery>,
) -> AppResult<Json<ApiResponse<InvoiceList>>> {
    let resp = pending_order_service::list_invoices(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Get invoice", body = ApiResponse<Invoice>),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Invoice>>> {
    let resp = pending_order_service::get_invoice(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/invoices/{id}/payments",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Record a payment", body = ApiResponse<Invoice>),
        (status = 400, description = "Amount must be positive")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn record_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<RecordPaymentRequest>,
) -> AppResult<Json<ApiResponse<Invoice>>> {
    let resp = pending_order_service::record_invoice_payment(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}/pdf",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice PDF", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn invoice_pdf(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let (filename, pdf) = pending_order_service::invoice_pdf(&state, &user, id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{filename}\""),
            ),
        ],
        pdf.as_ref().clone(),
    )
        .into_response())
}
