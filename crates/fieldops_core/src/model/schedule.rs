//! Schedule domain model.
//!
//! # Responsibility
//! - Define one calendar booking (date + slot + duration) for a lead.
//! - Define create/update request shapes used by the schedule service.
//!
//! # Invariants
//! - At most one active schedule exists per lead.
//! - `time_slot` is stored as entered; legacy rows may hold unparsable text.
//! - `duration_minutes` is positive for every schedule written by services.

use super::lead::LeadId;
use crate::timing::time_slot::{compute_window, JobWindow, TimeSlotError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable schedule identifier.
pub type ScheduleId = Uuid;

/// Persisted calendar booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub lead_id: LeadId,
    /// Local calendar day of the job.
    pub date: NaiveDate,
    /// Human-readable start time, e.g. `"9:00 AM"`.
    pub time_slot: String,
    pub duration_minutes: i64,
    pub notes: Option<String>,
    /// `false` once superseded by a reschedule or deleted.
    pub is_active: bool,
    pub created_by: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Schedule {
    /// Job window of this booking on its calendar day.
    pub fn window(&self) -> Result<JobWindow, TimeSlotError> {
        compute_window(&self.time_slot, self.duration_minutes)
    }
}

/// Input for creating a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSchedule {
    pub lead_id: LeadId,
    pub date: NaiveDate,
    pub time_slot: String,
    pub duration_minutes: i64,
    pub notes: Option<String>,
}

/// Partial update for a schedule. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleChanges {
    pub date: Option<NaiveDate>,
    pub time_slot: Option<String>,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
}

impl ScheduleChanges {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.time_slot.is_none()
            && self.duration_minutes.is_none()
            && self.notes.is_none()
    }

    /// Overlays changed fields onto `current`, keeping everything else.
    pub fn apply_to(&self, current: &Schedule) -> Schedule {
        Schedule {
            date: self.date.unwrap_or(current.date),
            time_slot: self
                .time_slot
                .clone()
                .unwrap_or_else(|| current.time_slot.clone()),
            duration_minutes: self.duration_minutes.unwrap_or(current.duration_minutes),
            notes: self.notes.clone().or_else(|| current.notes.clone()),
            ..current.clone()
        }
    }
}

/// Result of a successful schedule deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::{Schedule, ScheduleChanges};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn sample() -> Schedule {
        Schedule {
            id: Uuid::new_v4(),
            lead_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2030, 5, 6).unwrap(),
            time_slot: "9:00 AM".to_string(),
            duration_minutes: 90,
            notes: Some("gate code 1234".to_string()),
            is_active: true,
            created_by: "ops".to_string(),
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn apply_to_overrides_only_changed_fields() {
        let current = sample();
        let changes = ScheduleChanges {
            time_slot: Some("1:00 PM".to_string()),
            ..ScheduleChanges::default()
        };

        let merged = changes.apply_to(&current);
        assert_eq!(merged.time_slot, "1:00 PM");
        assert_eq!(merged.date, current.date);
        assert_eq!(merged.duration_minutes, 90);
        assert_eq!(merged.notes.as_deref(), Some("gate code 1234"));
        assert_eq!(merged.id, current.id);
    }

    #[test]
    fn window_uses_slot_and_duration() {
        let window = sample().window().unwrap();
        assert_eq!(window.start_minutes, 540);
        assert_eq!(window.end_minutes, 630);
        assert!(ScheduleChanges::default().is_empty());
    }
}
