//! Audit trail entry model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Kind of mutation recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    StatusChange,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::StatusChange => "status_change",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "status_change" => Some(Self::StatusChange),
            _ => None,
        }
    }
}

/// One audit record: who did what to which resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_id: String,
    pub action: AuditAction,
    /// Resource family, e.g. `"schedule"`.
    pub resource: String,
    pub resource_id: Uuid,
    /// Free-form JSON payload describing the change.
    pub details: Value,
    /// Epoch ms.
    pub created_at: i64,
}

impl AuditEntry {
    pub fn new(
        actor_id: &str,
        action: AuditAction,
        resource: &str,
        resource_id: Uuid,
        details: Value,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id: actor_id.to_string(),
            action,
            resource: resource.to_string(),
            resource_id,
            details,
            created_at: now_ms,
        }
    }
}
