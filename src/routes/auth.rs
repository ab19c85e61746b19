use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    error::AppResult,
    extract::ApiJson,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/me", get(me))
}

/// Exchange credentials for a 24 hour bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Unknown email or wrong password")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    auth_service::login_user(&state, body).await.map(Json)
}

/// Open while no account exists, director-only afterwards.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Staff account created", body = ApiResponse<User>),
        (status = 401, description = "Token required once an account exists"),
        (status = 403, description = "Caller is not a director"),
        (status = 409, description = "Email already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    auth_service::register_user(&state, caller, body)
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Profile of the token holder", body = ApiResponse<User>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    caller: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    auth_service::current_user(&state, &caller).await.map(Json)
}
