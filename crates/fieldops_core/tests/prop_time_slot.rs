//! Property-based tests for time-slot parsing and buffer checks.

use fieldops_core::{format_time_slot, parse_time_slot, satisfies_buffer, MIN_BUFFER_MINUTES};
use proptest::prelude::*;

fn arb_meridiem() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("AM"), Just("PM"), Just("am"), Just("pm"), Just("Pm")]
}

fn arb_space() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(""), Just(" "), Just("  ")]
}

fn arb_window() -> impl Strategy<Value = (i64, i64)> {
    (0i64..1440, 1i64..600).prop_map(|(start, duration)| (start, start + duration))
}

proptest! {
    #[test]
    fn format_then_parse_roundtrips(minute in 0u16..1440) {
        let text = format_time_slot(minute).unwrap();
        prop_assert_eq!(parse_time_slot(&text).unwrap(), minute);
    }

    #[test]
    fn parse_matches_twelve_hour_arithmetic(
        hour in 1u32..=12,
        minute in 0u32..60,
        meridiem in arb_meridiem(),
        lead in arb_space(),
        around_colon in arb_space(),
        before_meridiem in arb_space(),
    ) {
        let text = format!(
            "{lead}{hour}{around_colon}:{around_colon}{minute:02}{before_meridiem}{meridiem}{lead}"
        );
        let is_pm = meridiem.eq_ignore_ascii_case("pm");
        let hour_24 = match (hour, is_pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };

        let parsed = parse_time_slot(&text).unwrap();
        prop_assert_eq!(u32::from(parsed), hour_24 * 60 + minute);
        prop_assert!(parsed < 1440);
    }

    #[test]
    fn parse_rejects_out_of_range_minutes(hour in 1u32..=12, minute in 60u32..100) {
        let text = format!("{hour}:{minute} AM");
        prop_assert!(parse_time_slot(&text).is_err());
    }

    #[test]
    fn buffer_answer_does_not_depend_on_which_window_is_existing(
        a in arb_window(),
        b in arb_window(),
    ) {
        prop_assert_eq!(
            satisfies_buffer(a.0, a.1, b.0, b.1, MIN_BUFFER_MINUTES),
            satisfies_buffer(b.0, b.1, a.0, a.1, MIN_BUFFER_MINUTES)
        );
    }

    #[test]
    fn overlapping_windows_never_satisfy_buffer(a in arb_window(), b in arb_window()) {
        let overlaps = a.0 < b.1 && b.0 < a.1;
        if overlaps {
            prop_assert!(!satisfies_buffer(a.0, a.1, b.0, b.1, MIN_BUFFER_MINUTES));
        }
    }
}

#[test]
fn reference_buffer_cases() {
    assert!(satisfies_buffer(540, 600, 720, 780, MIN_BUFFER_MINUTES));
    assert!(!satisfies_buffer(540, 600, 719, 780, MIN_BUFFER_MINUTES));
    assert!(satisfies_buffer(540, 600, 300, 419, MIN_BUFFER_MINUTES));
    assert!(!satisfies_buffer(540, 660, 600, 720, MIN_BUFFER_MINUTES));
}
