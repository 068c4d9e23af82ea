//! Assignment domain model and status lifecycle.
//!
//! # Responsibility
//! - Bind one schedule to one agent.
//! - Define which status transitions an assignment may take.
//!
//! # Invariants
//! - `completed` and `cancelled` are terminal.
//! - A `completed` assignment's schedule cannot be rescheduled.
//! - At most one active assignment exists per schedule.

use super::agent::AgentId;
use super::lead::LeadId;
use super::schedule::ScheduleId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable assignment identifier.
pub type AssignmentId = Uuid;

/// Field progress of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    InProgress,
    Completed,
    Rescheduled,
    Cancelled,
    OnHold,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Rescheduled => "rescheduled",
            Self::Cancelled => "cancelled",
            Self::OnHold => "on_hold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "rescheduled" => Some(Self::Rescheduled),
            "cancelled" => Some(Self::Cancelled),
            "on_hold" => Some(Self::OnHold),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns whether `self -> next` is an allowed lifecycle step.
    pub fn can_transition_to(self, next: Self) -> bool {
        use AssignmentStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress | OnHold | Cancelled | Rescheduled)
                | (InProgress, Completed | OnHold | Cancelled)
                | (OnHold, Pending | InProgress | Cancelled)
                | (Rescheduled, Pending | InProgress | Cancelled)
        )
    }
}

/// Binding of a schedule to a field agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub lead_id: LeadId,
    pub schedule_id: ScheduleId,
    pub agent_id: AgentId,
    pub status: AssignmentStatus,
    pub is_active: bool,
    pub assigned_by: String,
    /// Epoch ms.
    pub assigned_at: i64,
    /// Epoch ms of the first move into `in_progress`.
    pub started_at: Option<i64>,
    /// Epoch ms of completion.
    pub completed_at: Option<i64>,
}

impl Assignment {
    /// Creates a `pending`, active assignment.
    pub fn new(
        lead_id: LeadId,
        schedule_id: ScheduleId,
        agent_id: AgentId,
        assigned_by: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            lead_id,
            schedule_id,
            agent_id,
            status: AssignmentStatus::Pending,
            is_active: true,
            assigned_by: assigned_by.into(),
            assigned_at: now_ms,
            started_at: None,
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AssignmentStatus::{self, *};

    #[test]
    fn terminal_statuses_allow_no_transition() {
        let all = [Pending, InProgress, Completed, Rescheduled, Cancelled, OnHold];
        for terminal in [Completed, Cancelled] {
            for next in all {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn lifecycle_accepts_expected_steps() {
        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(OnHold.can_transition_to(Pending));
        assert!(Rescheduled.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!InProgress.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn status_text_roundtrips() {
        for status in [Pending, InProgress, Completed, Rescheduled, Cancelled, OnHold] {
            assert_eq!(AssignmentStatus::parse(status.as_str()), Some(status));
        }
    }
}
