use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::clients::{ClientList, CreateClientRequest, UpdateClientRequest},
    error::AppResult,
    extract::ApiJson,
    middleware::auth::AuthUser,
    models::Client,
    response::ApiResponse,
    routes::params::ClientQuery,
    services::client_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
}

#[utoipa::path(
    get,
    path = "/api/clients",
    params(ClientQuery),
    responses((status = 200, description = "List clients in the caller's branch", body = ApiResponse<ClientList>)),
    security(("bearer_auth" = [])),
    tag = "Clients"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ClientQuery>,
) -> AppResult<Json<ApiResponse<ClientList>>> {
    let resp = client_service::list_clients(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Get client", body = ApiResponse<Client>),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Clients"
)]
pub async fn get_client(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Client>>> {
    let resp = client_service::get_client(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/clients",
    request_body = CreateClientRequest,
    responses((status = 200, description = "Create client", body = ApiResponse<Client>)),
    security(("bearer_auth" = [])),
    tag = "Clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateClientRequest>,
) -> AppResult<Json<ApiResponse<Client>>> {
    let resp = client_service::create_client(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    params(("id" = Uuid, Path, description = "Client ID")),
    request_body = UpdateClientRequest,
    responses((status = 200, description = "Update client", body = ApiResponse<Client>)),
    security(("bearer_auth" = [])),
    tag = "Clients"
)]
pub async fn update_client(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateClientRequest>,
) -> AppResult<Json<ApiResponse<Client>>> {
    let resp = client_service::update_client(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Delete client"),
        (status = 409, description = "Client has orders")
    ),
    security(("bearer_auth" = [])),
    tag = "Clients"
)]
pub async fn delete_client(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = client_service::delete_client(&state, &user, id).await?;
    Ok(Json(resp))
}
