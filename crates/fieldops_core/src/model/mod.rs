//! Domain model for leads, agents, schedules, assignments and audit entries.
//!
//! # Responsibility
//! - Define canonical records used by services and repositories.
//! - Own status vocabularies and their persisted text form.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Status text is `snake_case` both in storage and in serialized output.

pub mod agent;
pub mod assignment;
pub mod audit;
pub mod lead;
pub mod schedule;
