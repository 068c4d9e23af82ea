//! Assignment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist schedule-to-agent bindings and their status lifecycle.
//! - Load an agent's active jobs joined with their schedules for buffer
//!   checks.
//!
//! # Invariants
//! - Assignment rows are never deleted; cancellation clears `is_active`.
//! - Assignment counts include inactive rows of every status.

use super::schedule_repo::{parse_schedule_row, SCHEDULE_COLUMNS};
use super::{
    bool_to_int, ensure_changed, parse_bool, parse_uuid, RepoError, RepoResult, SqliteRepository,
};
use crate::model::agent::AgentId;
use crate::model::assignment::{Assignment, AssignmentId, AssignmentStatus};
use crate::model::schedule::{Schedule, ScheduleId};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

const ASSIGNMENT_COLUMNS: &str = "a.id AS assignment_id,
    a.lead_id AS assignment_lead_id,
    a.schedule_id AS assignment_schedule_id,
    a.agent_id AS agent_id,
    a.status AS status,
    a.is_active AS assignment_is_active,
    a.assigned_by AS assigned_by,
    a.assigned_at AS assigned_at,
    a.started_at AS started_at,
    a.completed_at AS completed_at";

/// One active job of an agent: the assignment and the booking it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentJob {
    pub assignment: Assignment,
    pub schedule: Schedule,
}

/// Repository interface for assignments.
pub trait AssignmentRepository {
    fn insert_assignment(&self, assignment: &Assignment) -> RepoResult<()>;
    fn get_assignment(&self, id: AssignmentId) -> RepoResult<Option<Assignment>>;
    fn find_active_assignment_for_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> RepoResult<Option<Assignment>>;
    /// Counts assignments of any status referencing the schedule.
    fn count_assignments_for_schedule(&self, schedule_id: ScheduleId) -> RepoResult<u64>;
    /// Lists the agent's active assignments on live schedules, ordered by
    /// date then assignment time, optionally skipping one schedule.
    /// Superseded and deleted schedules never count as jobs.
    fn list_active_jobs_for_agent(
        &self,
        agent_id: AgentId,
        exclude_schedule: Option<ScheduleId>,
    ) -> RepoResult<Vec<AgentJob>>;
    /// Writes status, activity flag and lifecycle timestamps.
    fn update_assignment(&self, assignment: &Assignment) -> RepoResult<()>;
}

impl AssignmentRepository for SqliteRepository<'_> {
    fn insert_assignment(&self, assignment: &Assignment) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO assignments (
                id,
                lead_id,
                schedule_id,
                agent_id,
                status,
                is_active,
                assigned_by,
                assigned_at,
                started_at,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                assignment.id.to_string(),
                assignment.lead_id.to_string(),
                assignment.schedule_id.to_string(),
                assignment.agent_id.to_string(),
                assignment.status.as_str(),
                bool_to_int(assignment.is_active),
                assignment.assigned_by.as_str(),
                assignment.assigned_at,
                assignment.started_at,
                assignment.completed_at,
            ],
        )?;
        Ok(())
    }

    fn get_assignment(&self, id: AssignmentId) -> RepoResult<Option<Assignment>> {
        let row = self
            .conn()
            .query_row(
                &format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments a WHERE a.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_assignment_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn find_active_assignment_for_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> RepoResult<Option<Assignment>> {
        let row = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {ASSIGNMENT_COLUMNS} FROM assignments a
                     WHERE a.schedule_id = ?1 AND a.is_active = 1
                     ORDER BY a.assigned_at DESC, a.id ASC
                     LIMIT 1;"
                ),
                [schedule_id.to_string()],
                |row| Ok(parse_assignment_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn count_assignments_for_schedule(&self, schedule_id: ScheduleId) -> RepoResult<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM assignments WHERE schedule_id = ?1;",
            [schedule_id.to_string()],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative assignment count {count}")))
    }

    fn list_active_jobs_for_agent(
        &self,
        agent_id: AgentId,
        exclude_schedule: Option<ScheduleId>,
    ) -> RepoResult<Vec<AgentJob>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {ASSIGNMENT_COLUMNS}, {SCHEDULE_COLUMNS}
             FROM assignments a
             JOIN schedules s ON s.id = a.schedule_id
             WHERE a.agent_id = ?1
               AND a.is_active = 1
               AND s.is_active = 1
               AND s.deleted_at IS NULL
               AND (?2 IS NULL OR a.schedule_id != ?2)
             ORDER BY s.date ASC, a.assigned_at ASC, a.id ASC;"
        ))?;
        let mut rows = stmt.query(params![
            agent_id.to_string(),
            exclude_schedule.map(|id| id.to_string()),
        ])?;

        let mut jobs = Vec::new();
        while let Some(row) = rows.next()? {
            jobs.push(AgentJob {
                assignment: parse_assignment_row(row)?,
                schedule: parse_schedule_row(row)?,
            });
        }
        Ok(jobs)
    }

    fn update_assignment(&self, assignment: &Assignment) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE assignments
             SET
                status = ?2,
                is_active = ?3,
                started_at = ?4,
                completed_at = ?5
             WHERE id = ?1;",
            params![
                assignment.id.to_string(),
                assignment.status.as_str(),
                bool_to_int(assignment.is_active),
                assignment.started_at,
                assignment.completed_at,
            ],
        )?;
        ensure_changed(changed, "assignment", assignment.id)
    }
}

fn parse_assignment_row(row: &Row<'_>) -> RepoResult<Assignment> {
    let id_text: String = row.get("assignment_id")?;
    let lead_text: String = row.get("assignment_lead_id")?;
    let schedule_text: String = row.get("assignment_schedule_id")?;
    let agent_text: String = row.get("agent_id")?;

    let status_text: String = row.get("status")?;
    let status = AssignmentStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid assignment status `{status_text}` in assignments.status"
        ))
    })?;

    Ok(Assignment {
        id: parse_uuid(&id_text, "assignments.id")?,
        lead_id: parse_uuid(&lead_text, "assignments.lead_id")?,
        schedule_id: parse_uuid(&schedule_text, "assignments.schedule_id")?,
        agent_id: parse_uuid(&agent_text, "assignments.agent_id")?,
        status,
        is_active: parse_bool(row.get("assignment_is_active")?, "assignments.is_active")?,
        assigned_by: row.get("assigned_by")?,
        assigned_at: row.get("assigned_at")?,
        started_at: row.get("started_at")?,
        completed_at: row.get("completed_at")?,
    })
}
