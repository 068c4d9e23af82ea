//! Integration tests for the `fieldops` binary.
//!
//! Each test runs the real binary against its own temporary database.

// `Command::cargo_bin` is deprecated in newer assert_cmd releases.
#![allow(deprecated)]

use assert_cmd::Command;
use chrono::{Days, Local};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("fieldops").unwrap();
        cmd.arg("--db")
            .arg(self.dir.path().join("ops.db"))
            .env("FIELDOPS_LOG_LEVEL", "error")
            .env_remove("FIELDOPS_LOG_DIR")
            .env_remove("FIELDOPS_BUFFER_MINUTES")
            .env_remove("FIELDOPS_ACTOR");
        cmd
    }

    /// Runs a command that must succeed and returns its JSON output.
    fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn confirmed_lead(&self, name: &str) -> String {
        let lead = self.json(&["lead", "add", name]);
        let id = id_of(&lead);
        self.json(&["lead", "status", &id, "confirm"]);
        id
    }

    fn book(&self, lead_id: &str, date: &str, time: &str) -> String {
        let schedule = self.json(&[
            "schedule", "create", "--lead", lead_id, "--date", date, "--time", time,
            "--duration", "60",
        ]);
        id_of(&schedule)
    }
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

fn days_from_now(days: u64) -> String {
    Local::now()
        .date_naive()
        .checked_add_days(Days::new(days))
        .unwrap()
        .to_string()
}

#[test]
fn ping_reports_core_linkage() {
    Command::cargo_bin("fieldops")
        .unwrap()
        .env("FIELDOPS_LOG_LEVEL", "error")
        .arg("ping")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ping\": \"pong\""));
}

#[test]
fn slot_parse_prints_minute_of_day_and_canonical_form() {
    let ws = Workspace::new();
    let parsed = ws.json(&["slot", "parse", " 2:30 pm"]);

    assert_eq!(parsed["minute_of_day"], 870);
    assert_eq!(parsed["canonical"], "2:30 PM");
}

#[test]
fn slot_window_prints_half_open_interval() {
    let ws = Workspace::new();
    let window = ws.json(&["slot", "window", "11:30 PM", "--duration", "90"]);

    assert_eq!(window["start_minutes"], 1410);
    assert_eq!(window["end_minutes"], 1500);
}

#[test]
fn slot_parse_rejects_out_of_range_hour() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["slot", "parse", "25:00 AM"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[INVALID_FORMAT]"));
}

#[test]
fn unconfirmed_lead_cannot_be_scheduled() {
    let ws = Workspace::new();
    let lead = ws.json(&["lead", "add", "Harbor Dental"]);
    let date = days_from_now(3);

    ws.cmd()
        .args([
            "schedule", "create", "--lead", &id_of(&lead), "--date", &date, "--time", "9:00 AM",
            "--duration", "60",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[INVALID_STATE]"))
        .stderr(predicate::str::contains("confirmed"));

    let schedules = ws.json(&["schedule", "list", "--lead", &id_of(&lead)]);
    assert_eq!(schedules.as_array().unwrap().len(), 0);
}

#[test]
fn malformed_time_is_rejected_before_lookup() {
    let ws = Workspace::new();
    let date = days_from_now(3);

    ws.cmd()
        .args([
            "schedule",
            "create",
            "--lead",
            "00000000-0000-0000-0000-000000000000",
            "--date",
            &date,
            "--time",
            "9am",
            "--duration",
            "60",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "error[INVALID_FORMAT]: time slot must look like 9:00 AM",
        ));
}

#[test]
fn booking_flow_enforces_agent_buffer() {
    let ws = Workspace::new();
    let date = days_from_now(5);
    let agent = id_of(&ws.json(&["agent", "add", "Rosa Diaz"]));

    let first_lead = ws.confirmed_lead("Harbor Dental");
    let first = ws.book(&first_lead, &date, "9:00 AM");
    let assignment = ws.json(&["assign", &first, &agent]);
    assert_eq!(assignment["status"], "pending");

    let second_lead = ws.confirmed_lead("Northside Bakery");
    let second = ws.book(&second_lead, &date, "10:30 am");
    ws.cmd()
        .args(["assign", &second, &agent])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[CONFLICT]"))
        .stderr(predicate::str::contains("minimum 2-hour gap required"));

    let moved = ws.json(&["schedule", "update", &second, "--time", "12:00 pm"]);
    assert_eq!(moved["time_slot"], "12:00 PM");
    ws.json(&["assign", &second, &agent]);

    let jobs = ws.json(&["assignment", "list", "--agent", &agent]);
    assert_eq!(jobs.as_array().unwrap().len(), 2);

    ws.cmd()
        .args(["schedule", "delete", &first])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "error[INVALID_STATE]: cannot delete schedule with assignments",
        ));
}

#[test]
fn buffer_minutes_flag_overrides_default_gap() {
    let ws = Workspace::new();
    let date = days_from_now(5);
    let agent = id_of(&ws.json(&["agent", "add", "Rosa Diaz"]));
    let first = ws.book(&ws.confirmed_lead("Harbor Dental"), &date, "9:00 AM");
    let second = ws.book(&ws.confirmed_lead("Northside Bakery"), &date, "10:30 AM");

    ws.json(&["--buffer-minutes", "30", "assign", &first, &agent]);
    ws.json(&["--buffer-minutes", "30", "assign", &second, &agent]);
}

#[test]
fn buffer_minutes_outside_one_day_is_rejected() {
    let ws = Workspace::new();
    let lead = ws.json(&["lead", "add", "Harbor Dental"]);

    ws.cmd()
        .env("FIELDOPS_BUFFER_MINUTES", "-5")
        .args(["lead", "show", &id_of(&lead)])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "error[INVALID_STATE]: buffer must be 0-1440 minutes (got -5)",
        ));

    ws.cmd()
        .args(["--buffer-minutes", "-30", "lead", "show", &id_of(&lead)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[INVALID_STATE]"));

    ws.cmd()
        .args(["--buffer-minutes", "1441", "lead", "show", &id_of(&lead)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[INVALID_STATE]"));
}

#[test]
fn oversized_durations_are_rejected() {
    let ws = Workspace::new();
    let date = days_from_now(4);
    let lead = ws.confirmed_lead("Harbor Dental");

    ws.cmd()
        .args(["slot", "window", "9:00 AM", "--duration", "9223372036854775807"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--duration"));

    ws.cmd()
        .args([
            "schedule", "create", "--lead", &lead, "--date", &date, "--time", "9:00 AM",
            "--duration", "1441",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[INVALID_STATE]"))
        .stderr(predicate::str::contains("at most 1440 minutes"));

    let full_day = ws.json(&["slot", "window", "9:00 AM", "--duration", "1440"]);
    assert_eq!(full_day["end_minutes"], 540 + 1440);
}

#[test]
fn delete_and_audit_trail() {
    let ws = Workspace::new();
    let date = days_from_now(2);
    let lead = ws.confirmed_lead("Harbor Dental");
    let schedule = ws.book(&lead, &date, "1:15 PM");

    let outcome = ws.json(&["--actor", "dispatcher-7", "schedule", "delete", &schedule]);
    assert_eq!(outcome["deleted"], true);

    ws.cmd()
        .args(["schedule", "show", &schedule])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[NOT_FOUND]"));

    let lead_json = ws.json(&["lead", "show", &lead]);
    assert_eq!(lead_json["schedule_status"], "not_scheduled");

    let audit = ws.json(&["audit", "list", "schedule", &schedule]);
    let entries = audit.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["action"], "create");
    assert_eq!(entries[0]["actor_id"], "cli");
    assert_eq!(entries[1]["action"], "delete");
    assert_eq!(entries[1]["actor_id"], "dispatcher-7");
}

#[test]
fn unknown_status_is_rejected_by_argument_parser() {
    let ws = Workspace::new();
    ws.cmd()
        .args([
            "lead",
            "status",
            "00000000-0000-0000-0000-000000000000",
            "maybe",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown lead status"));
}
