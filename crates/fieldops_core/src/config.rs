//! Runtime configuration injected into services.
//!
//! # Responsibility
//! - Carry scheduling rules that are tunable per deployment.
//! - Provide the calendar/clock seam so date rules are testable.
//!
//! # Invariants
//! - "Today" is the local calendar day; times of day never take part in
//!   the future-date rule.
//! - The agent buffer is within 0..=`MAX_BUFFER_MINUTES`.

use crate::service::{ServiceError, ServiceResult};
use crate::timing::buffer::MIN_BUFFER_MINUTES;
use crate::timing::time_slot::MINUTES_PER_DAY;
use chrono::{Local, NaiveDate, Utc};

/// Largest configurable gap between two same-day jobs.
pub const MAX_BUFFER_MINUTES: i64 = MINUTES_PER_DAY as i64;

/// Scheduling rules applied by schedule and assignment services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingPolicy {
    min_buffer_minutes: i64,
}

impl SchedulingPolicy {
    /// Builds a policy with a custom agent buffer.
    ///
    /// # Errors
    /// - `InvalidState` when the buffer is negative or longer than a day.
    pub fn new(min_buffer_minutes: i64) -> ServiceResult<Self> {
        if !(0..=MAX_BUFFER_MINUTES).contains(&min_buffer_minutes) {
            return Err(ServiceError::invalid_state(format!(
                "buffer must be 0-{MAX_BUFFER_MINUTES} minutes (got {min_buffer_minutes})"
            )));
        }
        Ok(Self { min_buffer_minutes })
    }

    /// Minimum gap between two same-day jobs of one agent.
    pub fn min_buffer_minutes(&self) -> i64 {
        self.min_buffer_minutes
    }
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            min_buffer_minutes: MIN_BUFFER_MINUTES,
        }
    }
}

/// Source of the current calendar day and timestamp.
pub trait Clock {
    /// Local calendar day, truncated to midnight.
    fn today(&self) -> NaiveDate;
    /// Current Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Wall clock in the process' local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock pinned to one day, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub today: NaiveDate,
    pub now_ms: i64,
}

impl FixedClock {
    pub fn on(today: NaiveDate) -> Self {
        Self { today, now_ms: 0 }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now_ms(&self) -> i64 {
        self.now_ms
    }
}
