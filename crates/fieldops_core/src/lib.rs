//! Core domain logic for FieldOps.
//! This crate is the single source of truth for scheduling invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod timing;

pub use config::{Clock, FixedClock, SchedulingPolicy, SystemClock, MAX_BUFFER_MINUTES};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::agent::{Agent, AgentId};
pub use model::assignment::{Assignment, AssignmentId, AssignmentStatus};
pub use model::audit::{AuditAction, AuditEntry};
pub use model::lead::{Lead, LeadAssignmentStatus, LeadId, LeadStatus, ScheduleStatus};
pub use model::schedule::{DeleteOutcome, NewSchedule, Schedule, ScheduleChanges, ScheduleId};
pub use repo::{
    AgentJob, AgentRepository, AssignmentRepository, AuditRepository, FieldOpsStore,
    LeadRepository, RepoError, RepoResult, ScheduleRepository, SqliteRepository, Transactional,
};
pub use service::agent_service::AgentService;
pub use service::assignment_service::AssignmentService;
pub use service::lead_service::LeadService;
pub use service::schedule_service::ScheduleService;
pub use service::{ServiceError, ServiceResult};
pub use timing::buffer::{satisfies_buffer, MIN_BUFFER_MINUTES};
pub use timing::time_slot::{
    compute_window, format_time_slot, parse_time_slot, validate_time_slot_format, JobWindow,
    TimeSlotError, MAX_JOB_DURATION_MINUTES,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
