//! Lead domain model.
//!
//! # Responsibility
//! - Define the prospective-job record and its three status axes.
//!
//! # Invariants
//! - Only leads in `LeadStatus::Confirm` may receive a new schedule.
//! - `schedule_status` mirrors whether an active schedule exists.
//! - `assignment_status` mirrors whether an active assignment exists.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable lead identifier.
pub type LeadId = Uuid;

/// Sales/operations status of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Draft,
    Created,
    /// Client confirmed the job; the only status that accepts scheduling.
    Confirm,
    InProgress,
    FollowUp,
    Completed,
    Cancelled,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Created => "created",
            Self::Confirm => "confirm",
            Self::InProgress => "in_progress",
            Self::FollowUp => "follow_up",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "created" => Some(Self::Created),
            "confirm" => Some(Self::Confirm),
            "in_progress" => Some(Self::InProgress),
            "follow_up" => Some(Self::FollowUp),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Terminal statuses accept no further status changes.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Whether a lead currently has an active schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    NotScheduled,
    Scheduled,
}

impl ScheduleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotScheduled => "not_scheduled",
            Self::Scheduled => "scheduled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_scheduled" => Some(Self::NotScheduled),
            "scheduled" => Some(Self::Scheduled),
            _ => None,
        }
    }
}

/// Whether a lead's active schedule is bound to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadAssignmentStatus {
    NotAssigned,
    Assigned,
}

impl LeadAssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotAssigned => "not_assigned",
            Self::Assigned => "assigned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_assigned" => Some(Self::NotAssigned),
            "assigned" => Some(Self::Assigned),
            _ => None,
        }
    }
}

/// Prospective cleaning job / client record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub client_name: String,
    pub address: Option<String>,
    pub status: LeadStatus,
    pub schedule_status: ScheduleStatus,
    pub assignment_status: LeadAssignmentStatus,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Lead {
    /// Creates a fresh lead in `created` status with no schedule or agent.
    pub fn new(client_name: impl Into<String>, address: Option<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_name: client_name.into(),
            address,
            status: LeadStatus::Created,
            schedule_status: ScheduleStatus::NotScheduled,
            assignment_status: LeadAssignmentStatus::NotAssigned,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assignment_status == LeadAssignmentStatus::Assigned
    }
}

#[cfg(test)]
mod tests {
    use super::{Lead, LeadAssignmentStatus, LeadStatus, ScheduleStatus};

    #[test]
    fn status_text_roundtrips_for_every_variant() {
        for status in [
            LeadStatus::Draft,
            LeadStatus::Created,
            LeadStatus::Confirm,
            LeadStatus::InProgress,
            LeadStatus::FollowUp,
            LeadStatus::Completed,
            LeadStatus::Cancelled,
        ] {
            assert_eq!(LeadStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LeadStatus::parse("confirmed"), None);
    }

    #[test]
    fn new_lead_starts_unscheduled_and_unassigned() {
        let lead = Lead::new("Acme Offices", None, 1_000);
        assert_eq!(lead.status, LeadStatus::Created);
        assert_eq!(lead.schedule_status, ScheduleStatus::NotScheduled);
        assert_eq!(lead.assignment_status, LeadAssignmentStatus::NotAssigned);
        assert!(!lead.is_assigned());
    }
}
