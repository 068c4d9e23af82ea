//! Agent use-case service.

use super::{log_outcome, ServiceError, ServiceResult};
use crate::config::{Clock, SystemClock};
use crate::model::agent::{Agent, AgentId};
use crate::model::audit::{AuditAction, AuditEntry};
use crate::repo::FieldOpsStore;
use serde_json::json;
use std::time::Instant;

const AUDIT_RESOURCE: &str = "agent";

/// Agent service facade.
pub struct AgentService<S: FieldOpsStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
}

impl<S: FieldOpsStore> AgentService<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: FieldOpsStore, C: Clock> AgentService<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn create_agent(&self, display_name: &str, actor_id: &str) -> ServiceResult<Agent> {
        let started_at = Instant::now();
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return log_outcome(
                "agent_create",
                started_at,
                Err(ServiceError::invalid_state("agent name must not be blank")),
            );
        }

        let result = self.store.in_transaction(|store| -> ServiceResult<Agent> {
            let now = self.clock.now_ms();
            let agent = Agent::new(display_name, now);
            store.insert_agent(&agent)?;
            store.record_audit(&AuditEntry::new(
                actor_id,
                AuditAction::Create,
                AUDIT_RESOURCE,
                agent.id,
                json!({ "display_name": agent.display_name }),
                now,
            ))?;
            Ok(agent)
        });

        log_outcome("agent_create", started_at, result)
    }

    pub fn get_agent(&self, id: AgentId) -> ServiceResult<Agent> {
        self.store
            .get_agent(id)?
            .ok_or(ServiceError::NotFound { entity: "agent", id })
    }

    pub fn list_agents(&self, include_inactive: bool) -> ServiceResult<Vec<Agent>> {
        Ok(self.store.list_agents(include_inactive)?)
    }

    /// Stops an agent from taking new assignments. Existing ones are kept.
    pub fn deactivate_agent(&self, id: AgentId, actor_id: &str) -> ServiceResult<Agent> {
        let started_at = Instant::now();
        let result = self.store.in_transaction(|store| -> ServiceResult<Agent> {
            let mut agent = store
                .get_agent(id)?
                .ok_or(ServiceError::NotFound { entity: "agent", id })?;
            if !agent.is_active {
                return Ok(agent);
            }

            store.set_agent_active(id, false)?;
            store.record_audit(&AuditEntry::new(
                actor_id,
                AuditAction::StatusChange,
                AUDIT_RESOURCE,
                id,
                json!({ "is_active": false }),
                self.clock.now_ms(),
            ))?;
            agent.is_active = false;
            Ok(agent)
        });

        log_outcome("agent_deactivate", started_at, result)
    }
}
