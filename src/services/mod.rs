pub mod auth_service;
pub mod bill_service;
pub mod catalogue_service;
pub mod client_service;
pub mod documents;
pub mod order_service;
pub mod pending_order_service;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr, prelude::DateTimeWithTimeZone};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{AppError, AppResult};

pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> AppResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::Validation(format!("{field} must not be negative")));
    }
    Ok(())
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))
}

pub(crate) fn from_json<T: DeserializeOwned>(value: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt stored document: {e}")))
}

pub(crate) fn utc(value: DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

pub(crate) fn now() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

/// Constraint violations become conflicts; everything else stays a server error.
pub(crate) fn write_error(err: DbErr, conflict: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_))
        | Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::Conflict(conflict.to_string()),
        _ => AppError::OrmError(err),
    }
}
