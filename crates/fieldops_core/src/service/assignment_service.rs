//! Assignment use-case service.
//!
//! # Responsibility
//! - Bind active schedules to active agents.
//! - Drive the assignment status lifecycle and its timestamps.
//!
//! # Invariants
//! - New assignments respect the agent buffer against same-day jobs.
//! - One active assignment per schedule.
//! - Cancelling releases the lead back to `not_assigned`.

use super::guards::{ensure_agent_buffer, window_error};
use super::{log_outcome, ServiceError, ServiceResult};
use crate::config::{Clock, SchedulingPolicy, SystemClock};
use crate::model::agent::AgentId;
use crate::model::assignment::{Assignment, AssignmentId, AssignmentStatus};
use crate::model::audit::{AuditAction, AuditEntry};
use crate::model::lead::LeadAssignmentStatus;
use crate::model::schedule::ScheduleId;
use crate::repo::{AgentJob, FieldOpsStore};
use log::info;
use serde_json::json;
use std::time::Instant;

const AUDIT_RESOURCE: &str = "assignment";

/// Assignment service facade.
pub struct AssignmentService<S: FieldOpsStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    policy: SchedulingPolicy,
}

impl<S: FieldOpsStore> AssignmentService<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock, SchedulingPolicy::default())
    }
}

impl<S: FieldOpsStore, C: Clock> AssignmentService<S, C> {
    pub fn with_clock(store: S, clock: C, policy: SchedulingPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub fn get_assignment(&self, id: AssignmentId) -> ServiceResult<Assignment> {
        self.store
            .get_assignment(id)?
            .ok_or(ServiceError::NotFound {
                entity: "assignment",
                id,
            })
    }

    /// Lists the agent's active jobs with their schedules.
    pub fn list_for_agent(&self, agent_id: AgentId) -> ServiceResult<Vec<AgentJob>> {
        Ok(self.store.list_active_jobs_for_agent(agent_id, None)?)
    }

    /// Assigns an active schedule to an agent as a `pending` job.
    ///
    /// # Errors
    /// - `NotFound` for a missing schedule or agent.
    /// - `InvalidState` for inactive schedules/agents or an already
    ///   assigned schedule.
    /// - `InvalidFormat` when the schedule's stored slot does not parse.
    /// - `InvalidState` when its stored duration is outside one day.
    /// - `Conflict` when the agent has another job too close that day.
    pub fn assign(
        &self,
        schedule_id: ScheduleId,
        agent_id: AgentId,
        actor_id: &str,
    ) -> ServiceResult<Assignment> {
        let started_at = Instant::now();
        info!(
            "event=assignment_create module=service status=start schedule_id={schedule_id} agent_id={agent_id}"
        );

        let result = self
            .store
            .in_transaction(|store| -> ServiceResult<Assignment> {
                let schedule = store
                    .get_schedule(schedule_id)?
                    .ok_or(ServiceError::NotFound {
                        entity: "schedule",
                        id: schedule_id,
                    })?;
                if !schedule.is_active {
                    return Err(ServiceError::invalid_state(
                        "cannot assign a superseded schedule",
                    ));
                }

                let agent = store.get_agent(agent_id)?.ok_or(ServiceError::NotFound {
                    entity: "agent",
                    id: agent_id,
                })?;
                if !agent.is_active {
                    return Err(ServiceError::invalid_state(format!(
                        "agent {} is inactive",
                        agent.display_name
                    )));
                }

                if store
                    .find_active_assignment_for_schedule(schedule_id)?
                    .is_some()
                {
                    return Err(ServiceError::invalid_state(
                        "schedule already has an active assignment",
                    ));
                }

                let window = schedule.window().map_err(window_error)?;
                ensure_agent_buffer(
                    store,
                    agent_id,
                    Some(schedule_id),
                    schedule.date,
                    window,
                    self.policy.min_buffer_minutes(),
                )?;

                let now = self.clock.now_ms();
                let assignment =
                    Assignment::new(schedule.lead_id, schedule_id, agent_id, actor_id, now);
                store.insert_assignment(&assignment)?;
                store.set_lead_assignment_status(
                    schedule.lead_id,
                    LeadAssignmentStatus::Assigned,
                    now,
                )?;
                store.record_audit(&AuditEntry::new(
                    actor_id,
                    AuditAction::Create,
                    AUDIT_RESOURCE,
                    assignment.id,
                    json!({
                        "schedule_id": schedule_id,
                        "agent_id": agent_id,
                        "date": schedule.date,
                        "time_slot": schedule.time_slot,
                    }),
                    now,
                ))?;
                Ok(assignment)
            });

        log_outcome("assignment_create", started_at, result)
    }

    /// Moves an assignment along its lifecycle.
    ///
    /// # Errors
    /// - `NotFound` for a missing assignment.
    /// - `InvalidState` for transitions the lifecycle does not allow.
    pub fn update_status(
        &self,
        id: AssignmentId,
        next: AssignmentStatus,
        actor_id: &str,
    ) -> ServiceResult<Assignment> {
        let started_at = Instant::now();
        let result = self
            .store
            .in_transaction(|store| -> ServiceResult<Assignment> {
                let mut assignment = store.get_assignment(id)?.ok_or(ServiceError::NotFound {
                    entity: "assignment",
                    id,
                })?;
                let previous = assignment.status;
                if !previous.can_transition_to(next) {
                    return Err(ServiceError::invalid_state(format!(
                        "cannot move assignment from {} to {}",
                        previous.as_str(),
                        next.as_str()
                    )));
                }

                let now = self.clock.now_ms();
                assignment.status = next;
                match next {
                    AssignmentStatus::InProgress if assignment.started_at.is_none() => {
                        assignment.started_at = Some(now);
                    }
                    AssignmentStatus::Completed => assignment.completed_at = Some(now),
                    AssignmentStatus::Cancelled => assignment.is_active = false,
                    _ => {}
                }

                store.update_assignment(&assignment)?;
                if next == AssignmentStatus::Cancelled {
                    store.set_lead_assignment_status(
                        assignment.lead_id,
                        LeadAssignmentStatus::NotAssigned,
                        now,
                    )?;
                }
                store.record_audit(&AuditEntry::new(
                    actor_id,
                    AuditAction::StatusChange,
                    AUDIT_RESOURCE,
                    id,
                    json!({ "from": previous, "to": next }),
                    now,
                ))?;
                Ok(assignment)
            });

        log_outcome("assignment_status", started_at, result)
    }
}
