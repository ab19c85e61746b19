use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::{entity::audit_logs, error::AppResult};

/// One row of the append-only audit trail.
#[derive(Debug, Clone)]
pub struct AuditEntry<'a> {
    pub actor: Option<Uuid>,
    pub action: &'a str,
    pub resource: Option<&'a str>,
    pub metadata: Option<Value>,
}

pub async fn append(conn: &DatabaseConnection, entry: AuditEntry<'_>) -> AppResult<()> {
    audit_logs::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(entry.actor),
        action: Set(entry.action.to_string()),
        resource: Set(entry.resource.map(str::to_string)),
        metadata: Set(entry.metadata),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Writes an audit row for a completed write; a failure here is only logged.
pub async fn record(
    conn: &DatabaseConnection,
    user_id: Uuid,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    let entry = AuditEntry {
        actor: Some(user_id),
        action,
        resource: Some(resource),
        metadata: Some(metadata),
    };
    if let Err(err) = append(conn, entry).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
