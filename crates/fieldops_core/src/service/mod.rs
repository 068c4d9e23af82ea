//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Enforce lead/schedule/assignment business rules above storage.
//! - Keep CLI and other callers decoupled from storage details.
//!
//! # Invariants
//! - Every mutation runs inside one store transaction together with its
//!   audit record; failures write nothing.
//! - Domain failures surface as one of four kinds: not found, invalid
//!   format, invalid state, conflict.

use crate::repo::RepoError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

pub mod agent_service;
pub mod assignment_service;
mod guards;
pub mod lead_service;
pub mod schedule_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by every use-case service.
#[derive(Debug)]
pub enum ServiceError {
    /// Referenced lead/schedule/agent/assignment does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Input text does not match the expected format.
    InvalidFormat(String),
    /// A status, date or duration precondition is violated.
    InvalidState(String),
    /// The proposed job window is too close to another job of the same agent.
    Conflict(String),
    /// Storage failure.
    Repo(RepoError),
}

impl ServiceError {
    /// Stable machine-readable code for callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidFormat(_) => "INVALID_FORMAT",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Conflict(_) => "CONFLICT",
            Self::Repo(_) => "STORAGE",
        }
    }

    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidFormat(message) => write!(f, "{message}"),
            Self::InvalidState(message) => write!(f, "{message}"),
            Self::Conflict(message) => write!(f, "{message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

/// Emits the `status=ok|error` event for one finished use-case call.
///
/// Domain rejections log at `warn`, storage failures at `error`.
pub(crate) fn log_outcome<T>(
    event: &'static str,
    started_at: Instant,
    result: ServiceResult<T>,
) -> ServiceResult<T> {
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!("event={event} module=service status=ok duration_ms={duration_ms}"),
        Err(err @ ServiceError::Repo(_)) => error!(
            "event={event} module=service status=error duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
        Err(err) => warn!(
            "event={event} module=service status=rejected duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn repo_not_found_maps_to_domain_not_found() {
        let id = Uuid::new_v4();
        let err: ServiceError = RepoError::NotFound {
            entity: "schedule",
            id,
        }
        .into();
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.to_string(), format!("schedule not found: {id}"));
    }

    #[test]
    fn invalid_data_maps_to_storage() {
        let err: ServiceError = RepoError::InvalidData("bad row".to_string()).into();
        assert_eq!(err.code(), "STORAGE");
    }
}
