//! Lead use-case service.
//!
//! # Invariants
//! - Client names are trimmed and must not be blank.
//! - `completed` and `cancelled` leads accept no further status change.

use super::{log_outcome, ServiceError, ServiceResult};
use crate::config::{Clock, SystemClock};
use crate::model::audit::{AuditAction, AuditEntry};
use crate::model::lead::{Lead, LeadId, LeadStatus};
use crate::repo::FieldOpsStore;
use serde_json::json;
use std::time::Instant;

const AUDIT_RESOURCE: &str = "lead";

/// Lead service facade.
pub struct LeadService<S: FieldOpsStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
}

impl<S: FieldOpsStore> LeadService<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: FieldOpsStore, C: Clock> LeadService<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Creates a lead in `created` status.
    pub fn create_lead(
        &self,
        client_name: &str,
        address: Option<String>,
        actor_id: &str,
    ) -> ServiceResult<Lead> {
        let started_at = Instant::now();
        let client_name = client_name.trim();
        if client_name.is_empty() {
            return log_outcome(
                "lead_create",
                started_at,
                Err(ServiceError::invalid_state("client name must not be blank")),
            );
        }

        let result = self.store.in_transaction(|store| -> ServiceResult<Lead> {
            let now = self.clock.now_ms();
            let address = address
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
            let lead = Lead::new(client_name, address, now);
            store.insert_lead(&lead)?;
            store.record_audit(&AuditEntry::new(
                actor_id,
                AuditAction::Create,
                AUDIT_RESOURCE,
                lead.id,
                json!({ "client_name": lead.client_name }),
                now,
            ))?;
            Ok(lead)
        });

        log_outcome("lead_create", started_at, result)
    }

    pub fn get_lead(&self, id: LeadId) -> ServiceResult<Lead> {
        self.store
            .get_lead(id)?
            .ok_or(ServiceError::NotFound { entity: "lead", id })
    }

    pub fn list_leads(&self, status: Option<LeadStatus>) -> ServiceResult<Vec<Lead>> {
        Ok(self.store.list_leads(status)?)
    }

    /// Moves a lead to `status`. Setting the current status is a no-op and
    /// writes no audit entry.
    pub fn set_status(
        &self,
        id: LeadId,
        status: LeadStatus,
        actor_id: &str,
    ) -> ServiceResult<Lead> {
        let started_at = Instant::now();
        let result = self.store.in_transaction(|store| -> ServiceResult<Lead> {
            let mut lead = store
                .get_lead(id)?
                .ok_or(ServiceError::NotFound { entity: "lead", id })?;
            if lead.status == status {
                return Ok(lead);
            }
            if lead.status.is_terminal() {
                return Err(ServiceError::invalid_state(format!(
                    "lead is {} and cannot change status",
                    lead.status.as_str()
                )));
            }

            let now = self.clock.now_ms();
            store.set_lead_status(id, status, now)?;
            store.record_audit(&AuditEntry::new(
                actor_id,
                AuditAction::StatusChange,
                AUDIT_RESOURCE,
                id,
                json!({ "from": lead.status, "to": status }),
                now,
            ))?;
            lead.status = status;
            lead.updated_at = now;
            Ok(lead)
        });

        log_outcome("lead_set_status", started_at, result)
    }
}
