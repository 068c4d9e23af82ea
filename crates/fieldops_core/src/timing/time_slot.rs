//! Time-slot text codec and job window construction.
//!
//! # Responsibility
//! - Parse `H:MM AM|PM` slot text into a minute-of-day value.
//! - Render minute-of-day values back into canonical slot text.
//! - Build `[start, end)` job windows from a slot and a duration.
//!
//! # Invariants
//! - Accepted hours are 1-12, minutes 00-59, meridiem is case-insensitive.
//! - `12:xx AM` maps to hour 0, `12:xx PM` stays hour 12.
//! - Window ends are never clamped to the end of the day.
//! - Job durations are 1..=`MAX_JOB_DURATION_MINUTES`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of minutes in one calendar day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Longest bookable job. A window may still end past midnight.
pub const MAX_JOB_DURATION_MINUTES: i64 = MINUTES_PER_DAY as i64;

/// User-facing hint attached to every rejected slot.
pub const TIME_SLOT_FORMAT_HINT: &str = "time slot must look like 9:00 AM";

static TIME_SLOT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{1,2})\s*:\s*(\d{2})\s*(AM|PM)$").expect("valid time slot regex")
});

/// Why a time-slot string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSlotErrorReason {
    /// Text does not have the `H:MM AM|PM` shape.
    Malformed,
    /// Shape matched but hour is outside 1-12.
    HourOutOfRange(u32),
    /// Shape matched but minute is outside 0-59.
    MinuteOutOfRange(u32),
    /// Slot parsed but the job duration is outside 1..=`MAX_JOB_DURATION_MINUTES`.
    DurationOutOfRange(i64),
}

/// Parser error for time-slot text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlotError {
    /// Original (untrimmed) input.
    pub input: String,
    pub reason: TimeSlotErrorReason,
}

impl Display for TimeSlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            TimeSlotErrorReason::Malformed => {
                write!(f, "invalid time slot `{}`: expected H:MM AM|PM", self.input)
            }
            TimeSlotErrorReason::HourOutOfRange(hour) => {
                write!(f, "invalid time slot `{}`: hour {hour} is not 1-12", self.input)
            }
            TimeSlotErrorReason::MinuteOutOfRange(minute) => write!(
                f,
                "invalid time slot `{}`: minute {minute} is not 0-59",
                self.input
            ),
            TimeSlotErrorReason::DurationOutOfRange(duration) => write!(
                f,
                "invalid job window at `{}`: duration {duration} is not 1-{MAX_JOB_DURATION_MINUTES} minutes",
                self.input
            ),
        }
    }
}

impl Error for TimeSlotError {}

/// Guard error carrying only the user-facing format hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTimeSlot;

impl Display for InvalidTimeSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(TIME_SLOT_FORMAT_HINT)
    }
}

impl Error for InvalidTimeSlot {}

/// Half-open `[start_minutes, end_minutes)` interval of one job on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobWindow {
    pub start_minutes: i64,
    /// May exceed 1439 when the job nominally runs past midnight.
    pub end_minutes: i64,
}

impl JobWindow {
    /// Length of the window in minutes.
    pub fn duration_minutes(&self) -> i64 {
        self.end_minutes - self.start_minutes
    }
}

/// Parses slot text like `"2:30 PM"` into minutes since local midnight.
///
/// Surrounding whitespace and whitespace around the colon or before the
/// meridiem are ignored.
///
/// # Errors
/// - `Malformed` when the text does not match `H:MM AM|PM`.
/// - `HourOutOfRange` / `MinuteOutOfRange` for matched but invalid values.
pub fn parse_time_slot(text: &str) -> Result<u16, TimeSlotError> {
    let fail = |reason| TimeSlotError {
        input: text.to_string(),
        reason,
    };

    let captures = TIME_SLOT_RE
        .captures(text.trim())
        .ok_or_else(|| fail(TimeSlotErrorReason::Malformed))?;

    let hour: u32 = captures[1]
        .parse()
        .map_err(|_| fail(TimeSlotErrorReason::Malformed))?;
    let minute: u32 = captures[2]
        .parse()
        .map_err(|_| fail(TimeSlotErrorReason::Malformed))?;
    let is_pm = captures[3].eq_ignore_ascii_case("PM");

    if !(1..=12).contains(&hour) {
        return Err(fail(TimeSlotErrorReason::HourOutOfRange(hour)));
    }
    if minute > 59 {
        return Err(fail(TimeSlotErrorReason::MinuteOutOfRange(minute)));
    }

    let hour_24 = match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };

    Ok((hour_24 * 60 + minute) as u16)
}

/// Renders a minute-of-day value as canonical slot text (`"9:05 AM"`).
///
/// Returns `None` when `minute_of_day` is not within one day.
pub fn format_time_slot(minute_of_day: u16) -> Option<String> {
    if minute_of_day >= MINUTES_PER_DAY {
        return None;
    }

    let hour_24 = minute_of_day / 60;
    let minute = minute_of_day % 60;
    let meridiem = if hour_24 < 12 { "AM" } else { "PM" };
    let hour_12 = match hour_24 % 12 {
        0 => 12,
        h => h,
    };

    Some(format!("{hour_12}:{minute:02} {meridiem}"))
}

/// Checks slot text, reporting failures with the user-facing hint only.
pub fn validate_time_slot_format(text: &str) -> Result<(), InvalidTimeSlot> {
    parse_time_slot(text).map(|_| ()).map_err(|_| InvalidTimeSlot)
}

/// Builds the job window for a slot and duration.
///
/// Propagates parser failures unchanged and rejects durations outside
/// 1..=`MAX_JOB_DURATION_MINUTES` with `DurationOutOfRange`.
pub fn compute_window(text: &str, duration_minutes: i64) -> Result<JobWindow, TimeSlotError> {
    let start_minutes = i64::from(parse_time_slot(text)?);
    let end_minutes = Some(duration_minutes)
        .filter(|duration| (1..=MAX_JOB_DURATION_MINUTES).contains(duration))
        .and_then(|duration| start_minutes.checked_add(duration))
        .ok_or_else(|| TimeSlotError {
            input: text.to_string(),
            reason: TimeSlotErrorReason::DurationOutOfRange(duration_minutes),
        })?;
    Ok(JobWindow {
        start_minutes,
        end_minutes,
    })
}
