use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::header,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::{ColumnTrait, Condition};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, models::Role, state::AppState};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    pub branch_id: Option<Uuid>,
}

impl AuthUser {
    /// Whether a record owned by `branch_id` is visible to this user.
    pub fn can_access(&self, branch_id: Option<Uuid>) -> bool {
        self.role.sees_all_branches() || self.branch_id == branch_id
    }

    /// List filter restricting `column` to the user's branch.
    pub fn branch_condition<C: ColumnTrait>(&self, column: C) -> Condition {
        if self.role.sees_all_branches() {
            return Condition::all();
        }
        match self.branch_id {
            Some(branch_id) => Condition::all().add(column.eq(branch_id)),
            None => Condition::all().add(column.is_null()),
        }
    }

    /// Branch stamped on records this user creates.
    pub fn owning_branch(&self, requested: Option<Uuid>) -> Option<Uuid> {
        if self.role.sees_all_branches() {
            requested.or(self.branch_id)
        } else {
            self.branch_id
        }
    }
}

pub fn ensure_role(user: &AuthUser, allowed: &[Role]) -> Result<(), AppError> {
    if !allowed.contains(&user.role) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Catalogue and account administration.
pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &[Role::Director, Role::SuperAdmin, Role::Admin])
}

pub fn ensure_director(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &[Role::Director, Role::SuperAdmin])
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?
            .trim();

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;
        let role = decoded
            .claims
            .role
            .parse::<Role>()
            .map_err(|_| AppError::Unauthorized("Invalid role in token".into()))?;

        Ok(AuthUser {
            user_id,
            role,
            branch_id: decoded.claims.branch_id,
        })
    }
}

/// Absent header yields `None`; a present but bad token is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(None);
        }
        <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
