//! Branches, fabrics, item masters and style masters.
//!
//! Reads are open to any signed-in user; writes require an admin role.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::catalogue::{
        BranchList, CreateBranchRequest, CreateFabricRequest, CreateItemRequest,
        CreateStyleRequest, FabricList, ItemList, StyleList, UpdateBranchRequest,
        UpdateFabricRequest, UpdateItemRequest, UpdateStyleRequest,
    },
    error::AppResult,
    extract::ApiJson,
    middleware::auth::AuthUser,
    models::{Branch, Fabric, ItemMaster, StyleMaster},
    response::ApiResponse,
    routes::params::CatalogueQuery,
    services::catalogue_service,
    state::AppState,
};

pub fn branches_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_branches).post(create_branch))
        .route(
            "/{id}",
            get(get_branch).put(update_branch).delete(delete_branch),
        )
}

pub fn fabrics_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_fabrics).post(create_fabric))
        .route(
            "/{id}",
            get(get_fabric).put(update_fabric).delete(delete_fabric),
        )
}

pub fn items_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
}

pub fn styles_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_styles).post(create_style))
        .route(
            "/{id}",
            get(get_style).put(update_style).delete(delete_style),
        )
}

// ---- branches ----

#[utoipa::path(
    get,
    path = "/api/branches",
    params(CatalogueQuery),
    responses((status = 200, description = "List branches", body = ApiResponse<BranchList>)),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn list_branches(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<CatalogueQuery>,
) -> AppResult<Json<ApiResponse<BranchList>>> {
    let resp = catalogue_service::list_branches(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/branches/{id}",
    params(("id" = Uuid, Path, description = "Branch ID")),
    responses(
        (status = 200, description = "Get branch", body = ApiResponse<Branch>),
        (status = 404, description = "Branch not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn get_branch(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Branch>>> {
    let resp = catalogue_service::get_branch(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/branches",
    request_body = CreateBranchRequest,
    responses(
        (status = 200, description = "Create branch", body = ApiResponse<Branch>),
        (status = 409, description = "Duplicate name or code")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn create_branch(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateBranchRequest>,
) -> AppResult<Json<ApiResponse<Branch>>> {
    let resp = catalogue_service::create_branch(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/branches/{id}",
    params(("id" = Uuid, Path, description = "Branch ID")),
    request_body = UpdateBranchRequest,
    responses((status = 200, description = "Update branch", body = ApiResponse<Branch>)),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn update_branch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateBranchRequest>,
) -> AppResult<Json<ApiResponse<Branch>>> {
    let resp = catalogue_service::update_branch(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/branches/{id}",
    params(("id" = Uuid, Path, description = "Branch ID")),
    responses((status = 200, description = "Delete branch")),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn delete_branch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalogue_service::delete_branch(&state, &user, id).await?;
    Ok(Json(resp))
}

// ---- fabrics ----

#[utoipa::path(
    get,
    path = "/api/fabrics",
    params(CatalogueQuery),
    responses((status = 200, description = "List fabrics", body = ApiResponse<FabricList>)),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn list_fabrics(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<CatalogueQuery>,
) -> AppResult<Json<ApiResponse<FabricList>>> {
    let resp = catalogue_service::list_fabrics(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/fabrics/{id}",
    params(("id" = Uuid, Path, description = "Fabric ID")),
    responses(
        (status = 200, description = "Get fabric", body = ApiResponse<Fabric>),
        (status = 404, description = "Fabric not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn get_fabric(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Fabric>>> {
    let resp = catalogue_service::get_fabric(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/fabrics",
    request_body = CreateFabricRequest,
    responses((status = 200, description = "Create fabric", body = ApiResponse<Fabric>)),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn create_fabric(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateFabricRequest>,
) -> AppResult<Json<ApiResponse<Fabric>>> {
    let resp = catalogue_service::create_fabric(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/fabrics/{id}",
    params(("id" = Uuid, Path, description = "Fabric ID")),
    request_body = UpdateFabricRequest,
    responses((status = 200, description = "Update fabric", body = ApiResponse<Fabric>)),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn update_fabric(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateFabricRequest>,
) -> AppResult<Json<ApiResponse<Fabric>>> {
    let resp = catalogue_service::update_fabric(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/fabrics/{id}",
    params(("id" = Uuid, Path, description = "Fabric ID")),
    responses(
        (status = 200, description = "Delete fabric"),
        (status = 409, description = "Fabric is referenced by orders")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn delete_fabric(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalogue_service::delete_fabric(&state, &user, id).await?;
    Ok(Json(resp))
}

// ---- item masters ----

#[utoipa::path(
    get,
    path = "/api/items",
    params(CatalogueQuery),
    responses((status = 200, description = "List item masters", body = ApiResponse<ItemList>)),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn list_items(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<CatalogueQuery>,
) -> AppResult<Json<ApiResponse<ItemList>>> {
    let resp = catalogue_service::list_items(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/items/{id}",
    params(("id" = Uuid, Path, description = "Item master ID")),
    responses(
        (status = 200, description = "Get item master", body = ApiResponse<ItemMaster>),
        (status = 404, description = "Item type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn get_item(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ItemMaster>>> {
    let resp = catalogue_service::get_item(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/items",
    request_body = CreateItemRequest,
    responses((status = 200, description = "Create item master", body = ApiResponse<ItemMaster>)),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateItemRequest>,
) -> AppResult<Json<ApiResponse<ItemMaster>>> {
    let resp = catalogue_service::create_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/items/{id}",
    params(("id" = Uuid, Path, description = "Item master ID")),
    request_body = UpdateItemRequest,
    responses((status = 200, description = "Update item master", body = ApiResponse<ItemMaster>)),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateItemRequest>,
) -> AppResult<Json<ApiResponse<ItemMaster>>> {
    let resp = catalogue_service::update_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    params(("id" = Uuid, Path, description = "Item master ID")),
    responses(
        (status = 200, description = "Delete item master"),
        (status = 409, description = "Item type is referenced by orders")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalogue_service::delete_item(&state, &user, id).await?;
    Ok(Json(resp))
}

// ---- style masters ----

#[utoipa::path(
    get,
    path = "/api/styles",
    params(CatalogueQuery),
    responses((status = 200, description = "List style masters", body = ApiResponse<StyleList>)),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn list_styles(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<CatalogueQuery>,
) -> AppResult<Json<ApiResponse<StyleList>>> {
    let resp = catalogue_service::list_styles(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/styles/{id}",
    params(("id" = Uuid, Path, description = "Style master ID")),
    responses((status = 200, description = "Get style master", body = ApiResponse<StyleMaster>)),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn get_style(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StyleMaster>>> {
    let resp = catalogue_service::get_style(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/styles",
    request_body = CreateStyleRequest,
    responses((status = 200, description = "Create style master", body = ApiResponse<StyleMaster>)),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn create_style(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateStyleRequest>,
) -> AppResult<Json<ApiResponse<StyleMaster>>> {
    let resp = catalogue_service::create_style(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/styles/{id}",
    params(("id" = Uuid, Path, description = "Style master ID")),
    request_body = UpdateStyleRequest,
    responses((status = 200, description = "Update style master", body = ApiResponse<StyleMaster>)),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn update_style(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateStyleRequest>,
) -> AppResult<Json<ApiResponse<StyleMaster>>> {
    let resp = catalogue_service::update_style(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/styles/{id}",
    params(("id" = Uuid, Path, description = "Style master ID")),
    responses((status = 200, description = "Delete style master")),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn delete_style(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalogue_service::delete_style(&state, &user, id).await?;
    Ok(Json(resp))
}
