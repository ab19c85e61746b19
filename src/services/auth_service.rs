use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;
use validator::Validate;

use super::{utc, write_error};
use crate::{
    audit,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    entity::users::{self, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_director},
    models::{Role, User, parse_stored},
    response::{ApiResponse, Meta},
    state::AppState,
};

const TOKEN_TTL_HOURS: i64 = 24;

/// Create a staff account. The first account may be created without a token;
/// after that only directors and super admins can register users.
pub async fn register_user(
    state: &AppState,
    caller: Option<AuthUser>,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    payload.validate()?;

    let existing_users = Users::find().count(&state.orm).await?;
    match (&caller, existing_users) {
        (_, 0) => tracing::info!(email = %payload.email, "bootstrapping first account"),
        (Some(caller), _) => ensure_director(caller)?,
        (None, _) => {
            return Err(AppError::Unauthorized("Missing Authorization header".into()));
        }
    }

    let taken = Users::find()
        .filter(users::Column::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict("Email is already taken".into()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let model = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        name: Set(payload.name),
        password_hash: Set(password_hash),
        role: Set(payload.role.as_str().to_string()),
        branch_id: Set(payload.branch_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| write_error(e, "Email is already taken"))?;

    let actor = caller.map(|c| c.user_id).unwrap_or(model.id);
    audit::record(
        &state.orm,
        actor,
        "user_register",
        "users",
        serde_json::json!({ "user_id": model.id, "role": model.role }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(model)?,
        None,
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user = Users::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let user = user_from_entity(user)?;
    let token = issue_token(&state.config.jwt_secret, &user)?;

    audit::record(
        &state.orm,
        user.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { token, user },
        Some(Meta::empty()),
    ))
}

/// Profile behind a bearer token; a deleted account reads as unauthorized.
pub async fn current_user(state: &AppState, caller: &AuthUser) -> AppResult<ApiResponse<User>> {
    let user = Users::find_by_id(caller.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))?;
    Ok(ApiResponse::success(
        "Current user",
        user_from_entity(user)?,
        Some(Meta::empty()),
    ))
}

pub fn issue_token(secret: &str, user: &User) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.as_str().to_string(),
        branch_id: user.branch_id,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn user_from_entity(model: users::Model) -> AppResult<User> {
    Ok(User {
        id: model.id,
        email: model.email,
        name: model.name,
        role: parse_stored::<Role>(&model.role)?,
        branch_id: model.branch_id,
        created_at: utc(model.created_at),
    })
}
