//! Schedule use-case service.
//!
//! # Responsibility
//! - Create, reschedule and delete lead bookings.
//! - Apply buffer checks when an assigned job is moved.
//! - Record one audit entry per successful mutation.
//!
//! # Invariants
//! - Only `confirm` leads can be scheduled, and only for a future day.
//! - Creating a schedule for an already-scheduled lead supersedes the prior
//!   active schedule, unless the lead has an assigned job.
//! - Superseded schedules are read-only.
//! - A schedule referenced by any assignment cannot be deleted.
//! - Completed jobs cannot be rescheduled.
//! - No buffer check runs at creation; no agent is attached yet.

use super::guards::{
    canonical_time_slot, ensure_agent_buffer, ensure_future_date, ensure_valid_duration,
    window_error,
};
use super::{log_outcome, ServiceError, ServiceResult};
use crate::config::{Clock, SchedulingPolicy, SystemClock};
use crate::model::assignment::AssignmentStatus;
use crate::model::audit::{AuditAction, AuditEntry};
use crate::model::lead::{LeadId, LeadStatus, ScheduleStatus};
use crate::model::schedule::{DeleteOutcome, NewSchedule, Schedule, ScheduleChanges, ScheduleId};
use crate::repo::FieldOpsStore;
use crate::timing::time_slot::{
    compute_window, validate_time_slot_format, TIME_SLOT_FORMAT_HINT,
};
use log::info;
use serde_json::json;
use std::time::Instant;
use uuid::Uuid;

const AUDIT_RESOURCE: &str = "schedule";

/// Schedule service facade over a field-ops store.
pub struct ScheduleService<S: FieldOpsStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    policy: SchedulingPolicy,
}

impl<S: FieldOpsStore> ScheduleService<S> {
    /// Creates service with the wall clock and default policy.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock, SchedulingPolicy::default())
    }
}

impl<S: FieldOpsStore, C: Clock> ScheduleService<S, C> {
    pub fn with_clock(store: S, clock: C, policy: SchedulingPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    /// Checks slot text before any lookup, with the user-facing message.
    pub fn validate_time_slot_format(&self, text: &str) -> ServiceResult<()> {
        validate_time_slot_format(text)
            .map_err(|_| ServiceError::InvalidFormat(TIME_SLOT_FORMAT_HINT.to_string()))
    }

    /// Loads one non-deleted schedule.
    pub fn get_schedule(&self, id: ScheduleId) -> ServiceResult<Schedule> {
        self.store
            .get_schedule(id)?
            .ok_or(ServiceError::NotFound {
                entity: "schedule",
                id,
            })
    }

    /// Lists a lead's schedules, newest first, including superseded ones.
    pub fn list_schedules_for_lead(&self, lead_id: LeadId) -> ServiceResult<Vec<Schedule>> {
        Ok(self.store.list_schedules_for_lead(lead_id)?)
    }

    /// Books a new time slot for a confirmed lead.
    ///
    /// # Errors
    /// - `NotFound` when the lead does not exist.
    /// - `InvalidState` for cancelled/unconfirmed/assigned leads, non-future
    ///   dates, out-of-range durations, or an inconsistent lead schedule flag.
    /// - `InvalidFormat` when the time slot does not parse.
    pub fn create_schedule(
        &self,
        request: &NewSchedule,
        actor_id: &str,
    ) -> ServiceResult<Schedule> {
        let started_at = Instant::now();
        info!(
            "event=schedule_create module=service status=start lead_id={}",
            request.lead_id
        );

        let result = self
            .store
            .in_transaction(|store| -> ServiceResult<Schedule> {
                let lead = store
                    .get_lead(request.lead_id)?
                    .ok_or(ServiceError::NotFound {
                        entity: "lead",
                        id: request.lead_id,
                    })?;

                if lead.status == LeadStatus::Cancelled {
                    return Err(ServiceError::invalid_state("cannot schedule a cancelled lead"));
                }
                if lead.status != LeadStatus::Confirm {
                    return Err(ServiceError::invalid_state(format!(
                        "lead must be confirmed before scheduling (status is {})",
                        lead.status.as_str()
                    )));
                }
                ensure_future_date(request.date, self.clock.today())?;
                ensure_valid_duration(request.duration_minutes)?;
                let time_slot = canonical_time_slot(&request.time_slot)?;
                if lead.is_assigned() {
                    return Err(ServiceError::invalid_state(
                        "lead has an assigned job; reschedule it instead of booking a new slot",
                    ));
                }

                let now = self.clock.now_ms();
                let replaced = store.find_active_schedule_for_lead(lead.id)?;
                if let Some(previous) = &replaced {
                    if lead.schedule_status == ScheduleStatus::NotScheduled {
                        return Err(ServiceError::invalid_state(format!(
                            "lead {} is marked not scheduled but has active schedule {}",
                            lead.id, previous.id
                        )));
                    }
                    store.deactivate_schedule(previous.id, now)?;
                }

                let schedule = Schedule {
                    id: Uuid::new_v4(),
                    lead_id: lead.id,
                    date: request.date,
                    time_slot,
                    duration_minutes: request.duration_minutes,
                    notes: request.notes.clone(),
                    is_active: true,
                    created_by: actor_id.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                store.insert_schedule(&schedule)?;
                store.set_lead_schedule_status(lead.id, ScheduleStatus::Scheduled, now)?;
                store.record_audit(&AuditEntry::new(
                    actor_id,
                    AuditAction::Create,
                    AUDIT_RESOURCE,
                    schedule.id,
                    json!({
                        "lead_id": lead.id,
                        "date": schedule.date,
                        "time_slot": schedule.time_slot,
                        "duration_minutes": schedule.duration_minutes,
                        "replaced_schedule_id": replaced.as_ref().map(|s| s.id),
                    }),
                    now,
                ))?;
                Ok(schedule)
            });

        log_outcome("schedule_create", started_at, result)
    }

    /// Edits or reschedules an existing booking.
    ///
    /// Unassigned leads get a free-form edit where only changed fields are
    /// validated. Assigned jobs are validated on their effective values and
    /// checked against the agent's other jobs that day.
    ///
    /// # Errors
    /// - `NotFound` for a missing schedule, lead, or active assignment.
    /// - `InvalidState` for superseded schedules, completed jobs, or violated
    ///   date/duration rules.
    /// - `InvalidFormat` when the effective time slot does not parse.
    /// - `Conflict` when the new window breaks the agent buffer.
    pub fn update_schedule(
        &self,
        schedule_id: ScheduleId,
        changes: &ScheduleChanges,
        actor_id: &str,
    ) -> ServiceResult<Schedule> {
        let started_at = Instant::now();
        info!("event=schedule_update module=service status=start schedule_id={schedule_id}");

        let result = self
            .store
            .in_transaction(|store| -> ServiceResult<Schedule> {
                let current = store
                    .get_schedule(schedule_id)?
                    .ok_or(ServiceError::NotFound {
                        entity: "schedule",
                        id: schedule_id,
                    })?;
                if !current.is_active {
                    return Err(ServiceError::invalid_state(
                        "cannot update a superseded schedule",
                    ));
                }
                let lead = store
                    .get_lead(current.lead_id)?
                    .ok_or(ServiceError::NotFound {
                        entity: "lead",
                        id: current.lead_id,
                    })?;
                let today = self.clock.today();

                let mut updated = changes.apply_to(&current);
                let agent_id = if lead.is_assigned() {
                    let assignment = store
                        .find_active_assignment_for_schedule(current.id)?
                        .ok_or(ServiceError::NotFound {
                            entity: "active assignment for schedule",
                            id: current.id,
                        })?;
                    if assignment.status == AssignmentStatus::Completed {
                        return Err(ServiceError::invalid_state(
                            "assignment already completed, cannot reschedule",
                        ));
                    }

                    ensure_future_date(updated.date, today)?;
                    ensure_valid_duration(updated.duration_minutes)?;
                    updated.time_slot = canonical_time_slot(&updated.time_slot)?;
                    let window = compute_window(&updated.time_slot, updated.duration_minutes)
                        .map_err(window_error)?;
                    ensure_agent_buffer(
                        store,
                        assignment.agent_id,
                        Some(current.id),
                        updated.date,
                        window,
                        self.policy.min_buffer_minutes(),
                    )?;
                    Some(assignment.agent_id)
                } else {
                    if let Some(date) = changes.date {
                        ensure_future_date(date, today)?;
                    }
                    if let Some(duration) = changes.duration_minutes {
                        ensure_valid_duration(duration)?;
                    }
                    if let Some(time_slot) = &changes.time_slot {
                        updated.time_slot = canonical_time_slot(time_slot)?;
                    }
                    None
                };

                let now = self.clock.now_ms();
                updated.updated_at = now;
                store.update_schedule(&updated)?;
                store.record_audit(&AuditEntry::new(
                    actor_id,
                    AuditAction::Update,
                    AUDIT_RESOURCE,
                    updated.id,
                    json!({
                        "agent_id": agent_id,
                        "before": {
                            "date": current.date,
                            "time_slot": current.time_slot,
                            "duration_minutes": current.duration_minutes,
                        },
                        "after": {
                            "date": updated.date,
                            "time_slot": updated.time_slot,
                            "duration_minutes": updated.duration_minutes,
                        },
                    }),
                    now,
                ))?;
                Ok(updated)
            });

        log_outcome("schedule_update", started_at, result)
    }

    /// Soft-deletes a schedule that no assignment has ever referenced.
    ///
    /// # Errors
    /// - `NotFound` when the schedule does not exist or is already deleted.
    /// - `InvalidState` when any assignment references the schedule.
    pub fn delete_schedule(
        &self,
        schedule_id: ScheduleId,
        actor_id: &str,
    ) -> ServiceResult<DeleteOutcome> {
        let started_at = Instant::now();
        info!("event=schedule_delete module=service status=start schedule_id={schedule_id}");

        let result = self
            .store
            .in_transaction(|store| -> ServiceResult<DeleteOutcome> {
                let schedule = store
                    .get_schedule(schedule_id)?
                    .ok_or(ServiceError::NotFound {
                        entity: "schedule",
                        id: schedule_id,
                    })?;

                let assignments = store.count_assignments_for_schedule(schedule_id)?;
                if assignments > 0 {
                    return Err(ServiceError::invalid_state(
                        "cannot delete schedule with assignments",
                    ));
                }

                let now = self.clock.now_ms();
                store.soft_delete_schedule(schedule_id, now)?;
                if schedule.is_active {
                    store.set_lead_schedule_status(
                        schedule.lead_id,
                        ScheduleStatus::NotScheduled,
                        now,
                    )?;
                }
                store.record_audit(&AuditEntry::new(
                    actor_id,
                    AuditAction::Delete,
                    AUDIT_RESOURCE,
                    schedule_id,
                    json!({
                        "lead_id": schedule.lead_id,
                        "was_active": schedule.is_active,
                    }),
                    now,
                ))?;
                Ok(DeleteOutcome { deleted: true })
            });

        log_outcome("schedule_delete", started_at, result)
    }
}
