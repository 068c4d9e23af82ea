//! Audit trail repository contract and SQLite implementation.
//!
//! # Invariants
//! - Audit rows are append-only.
//! - `details` is stored as JSON text and must parse back on read.

use super::{parse_uuid, RepoError, RepoResult, SqliteRepository};
use crate::model::audit::{AuditAction, AuditEntry};
use rusqlite::{params, Row};
use uuid::Uuid;

/// Repository interface for audit records.
pub trait AuditRepository {
    fn record_audit(&self, entry: &AuditEntry) -> RepoResult<()>;
    /// Lists entries for one resource, oldest first.
    fn list_audit_for_resource(&self, resource: &str, resource_id: Uuid)
        -> RepoResult<Vec<AuditEntry>>;
    fn count_audit_entries(&self) -> RepoResult<u64>;
}

impl AuditRepository for SqliteRepository<'_> {
    fn record_audit(&self, entry: &AuditEntry) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO audit_logs (
                id,
                actor_id,
                action,
                resource,
                resource_id,
                details,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                entry.id.to_string(),
                entry.actor_id.as_str(),
                entry.action.as_str(),
                entry.resource.as_str(),
                entry.resource_id.to_string(),
                entry.details.to_string(),
                entry.created_at,
            ],
        )?;
        Ok(())
    }

    fn list_audit_for_resource(
        &self,
        resource: &str,
        resource_id: Uuid,
    ) -> RepoResult<Vec<AuditEntry>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, actor_id, action, resource, resource_id, details, created_at
             FROM audit_logs
             WHERE resource = ?1 AND resource_id = ?2
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query(params![resource, resource_id.to_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_audit_row(row)?);
        }
        Ok(entries)
    }

    fn count_audit_entries(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM audit_logs;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative audit count {count}")))
    }
}

fn parse_audit_row(row: &Row<'_>) -> RepoResult<AuditEntry> {
    let id_text: String = row.get("id")?;
    let resource_text: String = row.get("resource_id")?;

    let action_text: String = row.get("action")?;
    let action = AuditAction::parse(&action_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid audit action `{action_text}` in audit_logs.action"
        ))
    })?;

    let details_text: String = row.get("details")?;
    let details = serde_json::from_str(&details_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid JSON in audit_logs.details: {err}"))
    })?;

    Ok(AuditEntry {
        id: parse_uuid(&id_text, "audit_logs.id")?,
        actor_id: row.get("actor_id")?,
        action,
        resource: row.get("resource")?,
        resource_id: parse_uuid(&resource_text, "audit_logs.resource_id")?,
        details,
        created_at: row.get("created_at")?,
    })
}
