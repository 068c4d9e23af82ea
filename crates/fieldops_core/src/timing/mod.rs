//! Time-slot parsing and same-day buffer checks.
//!
//! # Responsibility
//! - Convert human-readable slots (`"9:00 AM"`) into minute-of-day values.
//! - Decide whether two job windows of one agent are far enough apart.
//!
//! # Invariants
//! - Everything in this module is pure: no I/O, no clock, no logging.
//! - Minute-of-day values are in `[0, 1439]`; window ends may exceed 1439.

pub mod buffer;
pub mod time_slot;
