//! Precondition checks shared by schedule and assignment services.

use super::{ServiceError, ServiceResult};
use crate::model::agent::AgentId;
use crate::model::schedule::ScheduleId;
use crate::repo::AssignmentRepository;
use crate::timing::buffer::{find_buffer_violation, CompetingJob, ViolationReason};
use crate::timing::time_slot::{
    format_time_slot, parse_time_slot, JobWindow, TimeSlotError, TimeSlotErrorReason,
    MAX_JOB_DURATION_MINUTES, TIME_SLOT_FORMAT_HINT,
};
use chrono::NaiveDate;
use log::warn;

/// Same-day scheduling is rejected: the date must be after today.
pub(crate) fn ensure_future_date(date: NaiveDate, today: NaiveDate) -> ServiceResult<()> {
    if date <= today {
        return Err(ServiceError::invalid_state(format!(
            "date must be in the future (got {date}, today is {today})"
        )));
    }
    Ok(())
}

/// Durations must be positive and at most one day.
pub(crate) fn ensure_valid_duration(duration_minutes: i64) -> ServiceResult<()> {
    if duration_minutes <= 0 {
        return Err(ServiceError::invalid_state(format!(
            "duration must be a positive number of minutes (got {duration_minutes})"
        )));
    }
    if duration_minutes > MAX_JOB_DURATION_MINUTES {
        return Err(ServiceError::invalid_state(format!(
            "duration must be at most {MAX_JOB_DURATION_MINUTES} minutes (got {duration_minutes})"
        )));
    }
    Ok(())
}

/// Maps a window build failure onto the service error kinds.
pub(crate) fn window_error(err: TimeSlotError) -> ServiceError {
    match err.reason {
        TimeSlotErrorReason::DurationOutOfRange(_) => ServiceError::InvalidState(err.to_string()),
        _ => ServiceError::InvalidFormat(err.to_string()),
    }
}

/// Parses slot text and returns its canonical rendering.
pub(crate) fn canonical_time_slot(text: &str) -> ServiceResult<String> {
    parse_time_slot(text)
        .ok()
        .and_then(format_time_slot)
        .ok_or_else(|| ServiceError::InvalidFormat(TIME_SLOT_FORMAT_HINT.to_string()))
}

/// Rejects `window` on `date` when it is too close to another active job of
/// the agent on the same calendar day.
///
/// Jobs on other days are never compared, even when a window nominally
/// runs past midnight.
pub(crate) fn ensure_agent_buffer<S>(
    store: &S,
    agent_id: AgentId,
    exclude_schedule: Option<ScheduleId>,
    date: NaiveDate,
    window: JobWindow,
    buffer_minutes: i64,
) -> ServiceResult<()>
where
    S: AssignmentRepository + ?Sized,
{
    let same_day = store
        .list_active_jobs_for_agent(agent_id, exclude_schedule)?
        .into_iter()
        .filter(|job| job.schedule.date == date)
        .map(|job| CompetingJob {
            id: job.schedule.id,
            time_slot: job.schedule.time_slot,
            duration_minutes: job.schedule.duration_minutes,
        });

    let Some(violation) = find_buffer_violation(window, same_day, buffer_minutes) else {
        return Ok(());
    };

    let reason = match violation.reason {
        ViolationReason::TooClose { .. } => "too_close",
        ViolationReason::UnreadableTimeSlot => "unreadable_time_slot",
    };
    warn!(
        "event=buffer_check module=service status=conflict agent_id={agent_id} date={date} competing_schedule_id={} reason={reason}",
        violation.competing_id
    );

    Err(ServiceError::Conflict(format!(
        "would conflict with another job for the same agent on that day; minimum {} gap required",
        describe_gap(buffer_minutes)
    )))
}

fn describe_gap(buffer_minutes: i64) -> String {
    match buffer_minutes {
        m if m > 0 && m % 60 == 0 => format!("{}-hour", m / 60),
        m => format!("{m}-minute"),
    }
}
