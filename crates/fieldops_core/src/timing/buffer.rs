//! Minimum-gap checks between job windows of one agent.
//!
//! # Responsibility
//! - Decide whether a candidate window keeps the required gap to another.
//! - Scan an agent's competing same-day jobs for the first violation.
//!
//! # Invariants
//! - Only jobs on the same calendar day are ever compared; callers filter.
//! - A competing job whose stored slot or duration is unreadable counts as
//!   a violation.

use super::time_slot::{compute_window, JobWindow};

/// Minimum separation between any two active jobs of one agent.
pub const MIN_BUFFER_MINUTES: i64 = 120;

/// Stored slot text that cannot be parsed blocks the booking instead of
/// being skipped.
pub const UNREADABLE_SLOT_BLOCKS_BOOKING: bool = true;

/// Returns whether the new window starts at least `buffer_minutes` after the
/// existing one ends, or ends at least `buffer_minutes` before it starts.
///
/// Argument pairs must not be interleaved: `existing_*` belong to one window
/// and `new_*` to the other. Which window is called "existing" does not
/// change the answer.
pub fn satisfies_buffer(
    existing_start: i64,
    existing_end: i64,
    new_start: i64,
    new_end: i64,
    buffer_minutes: i64,
) -> bool {
    new_start >= existing_end.saturating_add(buffer_minutes)
        || new_end <= existing_start.saturating_sub(buffer_minutes)
}

/// Window-typed form of [`satisfies_buffer`].
pub fn windows_separated(existing: JobWindow, candidate: JobWindow, buffer_minutes: i64) -> bool {
    satisfies_buffer(
        existing.start_minutes,
        existing.end_minutes,
        candidate.start_minutes,
        candidate.end_minutes,
        buffer_minutes,
    )
}

/// One already-booked job competing with a candidate window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetingJob<Id> {
    pub id: Id,
    /// Slot text as stored, possibly legacy or malformed.
    pub time_slot: String,
    pub duration_minutes: i64,
}

/// Why a competing job blocks the candidate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationReason {
    /// Gap between the two windows is smaller than the buffer, or they overlap.
    TooClose { existing: JobWindow },
    /// Stored slot text or duration of the competing job does not form a
    /// window.
    UnreadableTimeSlot,
}

/// First competing job that blocks a candidate window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferViolation<Id> {
    pub competing_id: Id,
    pub reason: ViolationReason,
}

/// Returns the first competing job the candidate window is too close to.
///
/// Competitors are checked in iteration order and must already be filtered
/// to the candidate's calendar day.
pub fn find_buffer_violation<Id, I>(
    candidate: JobWindow,
    competitors: I,
    buffer_minutes: i64,
) -> Option<BufferViolation<Id>>
where
    I: IntoIterator<Item = CompetingJob<Id>>,
{
    for job in competitors {
        match compute_window(&job.time_slot, job.duration_minutes) {
            Ok(existing) => {
                if !windows_separated(existing, candidate, buffer_minutes) {
                    return Some(BufferViolation {
                        competing_id: job.id,
                        reason: ViolationReason::TooClose { existing },
                    });
                }
            }
            Err(_) if UNREADABLE_SLOT_BLOCKS_BOOKING => {
                return Some(BufferViolation {
                    competing_id: job.id,
                    reason: ViolationReason::UnreadableTimeSlot,
                });
            }
            Err(_) => continue,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{
        find_buffer_violation, satisfies_buffer, CompetingJob, JobWindow, ViolationReason,
        MIN_BUFFER_MINUTES,
    };

    fn job(id: u32, slot: &str, duration: i64) -> CompetingJob<u32> {
        CompetingJob {
            id,
            time_slot: slot.to_string(),
            duration_minutes: duration,
        }
    }

    #[test]
    fn exact_buffer_after_existing_is_allowed() {
        assert!(satisfies_buffer(540, 600, 720, 780, MIN_BUFFER_MINUTES));
    }

    #[test]
    fn one_minute_short_is_rejected() {
        assert!(!satisfies_buffer(540, 600, 719, 780, MIN_BUFFER_MINUTES));
    }

    #[test]
    fn ending_well_before_existing_is_allowed() {
        assert!(satisfies_buffer(540, 600, 300, 419, MIN_BUFFER_MINUTES));
        assert!(!satisfies_buffer(540, 600, 300, 421, MIN_BUFFER_MINUTES));
    }

    #[test]
    fn overlap_is_rejected() {
        assert!(!satisfies_buffer(540, 660, 600, 720, MIN_BUFFER_MINUTES));
        assert!(!satisfies_buffer(540, 660, 540, 660, MIN_BUFFER_MINUTES));
    }

    #[test]
    fn extreme_values_saturate_instead_of_wrapping() {
        assert!(!satisfies_buffer(540, i64::MAX, 600, 660, MIN_BUFFER_MINUTES));
        assert!(!satisfies_buffer(540, 600, 600, 660, i64::MAX));
        assert!(satisfies_buffer(i64::MIN, i64::MIN + 1, 540, 600, MIN_BUFFER_MINUTES));
    }

    #[test]
    fn competing_job_with_oversized_duration_blocks() {
        let candidate = JobWindow {
            start_minutes: 1200,
            end_minutes: 1260,
        };
        let violation =
            find_buffer_violation(candidate, vec![job(9, "9:00 AM", i64::MAX)], MIN_BUFFER_MINUTES)
                .expect("oversized stored duration must block");
        assert_eq!(violation.reason, ViolationReason::UnreadableTimeSlot);
    }

    #[test]
    fn zero_buffer_allows_adjacent_windows() {
        assert!(satisfies_buffer(540, 600, 600, 660, 0));
    }

    #[test]
    fn violation_scan_returns_first_blocking_job() {
        let candidate = JobWindow {
            start_minutes: 780,
            end_minutes: 840,
        };
        let competitors = vec![
            job(1, "8:00 AM", 60),
            job(2, "12:00 PM", 60),
            job(3, "1:30 PM", 60),
        ];

        let violation = find_buffer_violation(candidate, competitors, MIN_BUFFER_MINUTES)
            .expect("12:00 PM job is too close");
        assert_eq!(violation.competing_id, 2);
        assert!(matches!(
            violation.reason,
            ViolationReason::TooClose { existing } if existing.start_minutes == 720
        ));
    }

    #[test]
    fn unreadable_competing_slot_blocks() {
        let candidate = JobWindow {
            start_minutes: 540,
            end_minutes: 600,
        };
        let violation =
            find_buffer_violation(candidate, vec![job(7, "morning", 60)], MIN_BUFFER_MINUTES)
                .expect("unreadable slot must block");
        assert_eq!(violation.reason, ViolationReason::UnreadableTimeSlot);
    }

    #[test]
    fn no_competitors_means_no_violation() {
        let candidate = JobWindow {
            start_minutes: 540,
            end_minutes: 600,
        };
        let none: Vec<CompetingJob<u32>> = Vec::new();
        assert!(find_buffer_violation(candidate, none, MIN_BUFFER_MINUTES).is_none());
    }
}
