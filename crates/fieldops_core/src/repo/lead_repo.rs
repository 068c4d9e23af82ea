//! Lead repository contract and SQLite implementation.
//!
//! # Invariants
//! - Status columns are written only through the typed status enums.
//! - Every write bumps `updated_at`.

use super::{ensure_changed, parse_uuid, RepoError, RepoResult, SqliteRepository};
use crate::model::lead::{Lead, LeadAssignmentStatus, LeadId, LeadStatus, ScheduleStatus};
use rusqlite::{params, OptionalExtension, Row};

const LEAD_SELECT_SQL: &str = "SELECT
    id,
    client_name,
    address,
    status,
    schedule_status,
    assignment_status,
    created_at,
    updated_at
FROM leads";

/// Repository interface for lead records.
pub trait LeadRepository {
    fn insert_lead(&self, lead: &Lead) -> RepoResult<()>;
    fn get_lead(&self, id: LeadId) -> RepoResult<Option<Lead>>;
    /// Lists leads newest first, optionally filtered by status.
    fn list_leads(&self, status: Option<LeadStatus>) -> RepoResult<Vec<Lead>>;
    fn set_lead_status(&self, id: LeadId, status: LeadStatus, now_ms: i64) -> RepoResult<()>;
    fn set_lead_schedule_status(
        &self,
        id: LeadId,
        status: ScheduleStatus,
        now_ms: i64,
    ) -> RepoResult<()>;
    fn set_lead_assignment_status(
        &self,
        id: LeadId,
        status: LeadAssignmentStatus,
        now_ms: i64,
    ) -> RepoResult<()>;
}

impl LeadRepository for SqliteRepository<'_> {
    fn insert_lead(&self, lead: &Lead) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO leads (
                id,
                client_name,
                address,
                status,
                schedule_status,
                assignment_status,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                lead.id.to_string(),
                lead.client_name.as_str(),
                lead.address.as_deref(),
                lead.status.as_str(),
                lead.schedule_status.as_str(),
                lead.assignment_status.as_str(),
                lead.created_at,
                lead.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_lead(&self, id: LeadId) -> RepoResult<Option<Lead>> {
        let row = self
            .conn()
            .query_row(
                &format!("{LEAD_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_lead_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn list_leads(&self, status: Option<LeadStatus>) -> RepoResult<Vec<Lead>> {
        let mut stmt = self.conn().prepare(&format!(
            "{LEAD_SELECT_SQL}
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY created_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([status.map(LeadStatus::as_str)])?;
        let mut leads = Vec::new();
        while let Some(row) = rows.next()? {
            leads.push(parse_lead_row(row)?);
        }
        Ok(leads)
    }

    fn set_lead_status(&self, id: LeadId, status: LeadStatus, now_ms: i64) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE leads SET status = ?2, updated_at = ?3 WHERE id = ?1;",
            params![id.to_string(), status.as_str(), now_ms],
        )?;
        ensure_changed(changed, "lead", id)
    }

    fn set_lead_schedule_status(
        &self,
        id: LeadId,
        status: ScheduleStatus,
        now_ms: i64,
    ) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE leads SET schedule_status = ?2, updated_at = ?3 WHERE id = ?1;",
            params![id.to_string(), status.as_str(), now_ms],
        )?;
        ensure_changed(changed, "lead", id)
    }

    fn set_lead_assignment_status(
        &self,
        id: LeadId,
        status: LeadAssignmentStatus,
        now_ms: i64,
    ) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE leads SET assignment_status = ?2, updated_at = ?3 WHERE id = ?1;",
            params![id.to_string(), status.as_str(), now_ms],
        )?;
        ensure_changed(changed, "lead", id)
    }
}

fn parse_lead_row(row: &Row<'_>) -> RepoResult<Lead> {
    let id_text: String = row.get("id")?;

    let status_text: String = row.get("status")?;
    let status = LeadStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid lead status `{status_text}` in leads.status"))
    })?;

    let schedule_text: String = row.get("schedule_status")?;
    let schedule_status = ScheduleStatus::parse(&schedule_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid schedule status `{schedule_text}` in leads.schedule_status"
        ))
    })?;

    let assignment_text: String = row.get("assignment_status")?;
    let assignment_status = LeadAssignmentStatus::parse(&assignment_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid assignment status `{assignment_text}` in leads.assignment_status"
        ))
    })?;

    Ok(Lead {
        id: parse_uuid(&id_text, "leads.id")?,
        client_name: row.get("client_name")?,
        address: row.get("address")?,
        status,
        schedule_status,
        assignment_status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
