//! Schedule repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist bookings and their active/deleted lifecycle flags.
//!
//! # Invariants
//! - Soft-deleted schedules (`deleted_at IS NOT NULL`) are invisible to reads.
//! - Deactivation and deletion never remove rows.
//! - Dates are stored as `YYYY-MM-DD` text.

use super::{
    bool_to_int, date_to_db, ensure_changed, parse_bool, parse_date, parse_uuid, RepoResult,
    SqliteRepository,
};
use crate::model::lead::LeadId;
use crate::model::schedule::{Schedule, ScheduleId};
use rusqlite::{params, OptionalExtension, Row};

pub(crate) const SCHEDULE_COLUMNS: &str = "s.id AS id,
    s.lead_id AS lead_id,
    s.date AS date,
    s.time_slot AS time_slot,
    s.duration_minutes AS duration_minutes,
    s.notes AS notes,
    s.is_active AS is_active,
    s.created_by AS created_by,
    s.created_at AS created_at,
    s.updated_at AS updated_at";

/// Repository interface for schedules.
pub trait ScheduleRepository {
    fn insert_schedule(&self, schedule: &Schedule) -> RepoResult<()>;
    /// Loads one non-deleted schedule, active or superseded.
    fn get_schedule(&self, id: ScheduleId) -> RepoResult<Option<Schedule>>;
    fn find_active_schedule_for_lead(&self, lead_id: LeadId) -> RepoResult<Option<Schedule>>;
    /// Lists a lead's non-deleted schedules, newest first.
    fn list_schedules_for_lead(&self, lead_id: LeadId) -> RepoResult<Vec<Schedule>>;
    /// Writes date, slot, duration and notes of an existing schedule.
    fn update_schedule(&self, schedule: &Schedule) -> RepoResult<()>;
    fn deactivate_schedule(&self, id: ScheduleId, now_ms: i64) -> RepoResult<()>;
    fn soft_delete_schedule(&self, id: ScheduleId, now_ms: i64) -> RepoResult<()>;
}

impl ScheduleRepository for SqliteRepository<'_> {
    fn insert_schedule(&self, schedule: &Schedule) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO schedules (
                id,
                lead_id,
                date,
                time_slot,
                duration_minutes,
                notes,
                is_active,
                created_by,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                schedule.id.to_string(),
                schedule.lead_id.to_string(),
                date_to_db(schedule.date),
                schedule.time_slot.as_str(),
                schedule.duration_minutes,
                schedule.notes.as_deref(),
                bool_to_int(schedule.is_active),
                schedule.created_by.as_str(),
                schedule.created_at,
                schedule.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_schedule(&self, id: ScheduleId) -> RepoResult<Option<Schedule>> {
        let row = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {SCHEDULE_COLUMNS} FROM schedules s
                     WHERE s.id = ?1 AND s.deleted_at IS NULL;"
                ),
                [id.to_string()],
                |row| Ok(parse_schedule_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn find_active_schedule_for_lead(&self, lead_id: LeadId) -> RepoResult<Option<Schedule>> {
        let row = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {SCHEDULE_COLUMNS} FROM schedules s
                     WHERE s.lead_id = ?1
                       AND s.is_active = 1
                       AND s.deleted_at IS NULL
                     ORDER BY s.created_at DESC, s.id ASC
                     LIMIT 1;"
                ),
                [lead_id.to_string()],
                |row| Ok(parse_schedule_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn list_schedules_for_lead(&self, lead_id: LeadId) -> RepoResult<Vec<Schedule>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules s
             WHERE s.lead_id = ?1 AND s.deleted_at IS NULL
             ORDER BY s.created_at DESC, s.id ASC;"
        ))?;
        let mut rows = stmt.query([lead_id.to_string()])?;
        let mut schedules = Vec::new();
        while let Some(row) = rows.next()? {
            schedules.push(parse_schedule_row(row)?);
        }
        Ok(schedules)
    }

    fn update_schedule(&self, schedule: &Schedule) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE schedules
             SET
                date = ?2,
                time_slot = ?3,
                duration_minutes = ?4,
                notes = ?5,
                updated_at = ?6
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![
                schedule.id.to_string(),
                date_to_db(schedule.date),
                schedule.time_slot.as_str(),
                schedule.duration_minutes,
                schedule.notes.as_deref(),
                schedule.updated_at,
            ],
        )?;
        ensure_changed(changed, "schedule", schedule.id)
    }

    fn deactivate_schedule(&self, id: ScheduleId, now_ms: i64) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE schedules
             SET is_active = 0, updated_at = ?2
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![id.to_string(), now_ms],
        )?;
        ensure_changed(changed, "schedule", id)
    }

    fn soft_delete_schedule(&self, id: ScheduleId, now_ms: i64) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE schedules
             SET is_active = 0, deleted_at = ?2, updated_at = ?2
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![id.to_string(), now_ms],
        )?;
        ensure_changed(changed, "schedule", id)
    }
}

/// Parses a row selected with [`SCHEDULE_COLUMNS`].
pub(crate) fn parse_schedule_row(row: &Row<'_>) -> RepoResult<Schedule> {
    let id_text: String = row.get("id")?;
    let lead_text: String = row.get("lead_id")?;
    let date_text: String = row.get("date")?;

    Ok(Schedule {
        id: parse_uuid(&id_text, "schedules.id")?,
        lead_id: parse_uuid(&lead_text, "schedules.lead_id")?,
        date: parse_date(&date_text, "schedules.date")?,
        time_slot: row.get("time_slot")?,
        duration_minutes: row.get("duration_minutes")?,
        notes: row.get("notes")?,
        is_active: parse_bool(row.get("is_active")?, "schedules.is_active")?,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
