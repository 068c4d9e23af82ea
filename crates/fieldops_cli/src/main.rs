//! `fieldops` CLI: drive the scheduling core from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Create a lead and confirm it
//! fieldops --db ops.db lead add "Harbor Dental" --address "12 Quay St"
//! fieldops --db ops.db lead status <LEAD_ID> confirm
//!
//! # Book and assign the job
//! fieldops --db ops.db schedule create --lead <LEAD_ID> --date 2030-03-12 --time "9:00 AM" --duration 90
//! fieldops --db ops.db agent add "Rosa Diaz"
//! fieldops --db ops.db assign <SCHEDULE_ID> <AGENT_ID>
//!
//! # Inspect slot text without touching a database
//! fieldops slot window "2:30 PM" --duration 60
//! ```
//!
//! Results are printed as JSON on stdout. Failures print `error[CODE]: message`
//! on stderr and exit non-zero.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fieldops_core::db::open_db;
use fieldops_core::{
    compute_window, core_version, default_log_level, format_time_slot, init_logging,
    parse_time_slot, ping, AgentService, AssignmentService, AssignmentStatus, AuditRepository,
    LeadService, LeadStatus, NewSchedule, ScheduleChanges, ScheduleService, SchedulingPolicy,
    ServiceError, SqliteRepository, TimeSlotError, MAX_JOB_DURATION_MINUTES, MIN_BUFFER_MINUTES,
};
use log::info;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "fieldops", version, about = "Field-service scheduling CLI")]
struct Cli {
    /// SQLite database file (created and migrated on first use)
    #[arg(long, env = "FIELDOPS_DB", global = true, default_value = "fieldops.db")]
    db: PathBuf,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, env = "FIELDOPS_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rotating log files (logs go to stderr if omitted)
    #[arg(long, env = "FIELDOPS_LOG_DIR", global = true)]
    log_dir: Option<String>,

    /// Minimum gap in minutes between two same-day jobs of one agent (0-1440)
    #[arg(
        long,
        env = "FIELDOPS_BUFFER_MINUTES",
        global = true,
        default_value_t = MIN_BUFFER_MINUTES,
        allow_negative_numbers = true
    )]
    buffer_minutes: i64,

    /// Actor id written to the audit trail
    #[arg(long, env = "FIELDOPS_ACTOR", global = true, default_value = "cli")]
    actor: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the core library is linked
    Ping,
    /// Parse time-slot text
    #[command(subcommand)]
    Slot(SlotCommand),
    /// Manage leads
    #[command(subcommand)]
    Lead(LeadCommand),
    /// Manage field agents
    #[command(subcommand)]
    Agent(AgentCommand),
    /// Book, reschedule and delete schedules
    #[command(subcommand)]
    Schedule(ScheduleCommand),
    /// Assign a schedule to an agent
    Assign { schedule_id: Uuid, agent_id: Uuid },
    /// Inspect and progress assignments
    #[command(subcommand)]
    Assignment(AssignmentCommand),
    /// Read the audit trail
    #[command(subcommand)]
    Audit(AuditCommand),
}

#[derive(Subcommand)]
enum SlotCommand {
    /// Print the minute of day and canonical form of a slot
    Parse { text: String },
    /// Print the job window for a slot and duration
    Window {
        text: String,
        #[arg(
            long,
            value_parser = clap::value_parser!(i64).range(1..=MAX_JOB_DURATION_MINUTES)
        )]
        duration: i64,
    },
}

#[derive(Subcommand)]
enum LeadCommand {
    /// Create a lead in `created` status
    Add {
        name: String,
        #[arg(long)]
        address: Option<String>,
    },
    /// Show one lead
    Show { id: Uuid },
    /// List leads, newest first
    List {
        #[arg(long, value_parser = parse_lead_status)]
        status: Option<LeadStatus>,
    },
    /// Change a lead's status
    Status {
        id: Uuid,
        #[arg(value_parser = parse_lead_status)]
        status: LeadStatus,
    },
}

#[derive(Subcommand)]
enum AgentCommand {
    /// Register an agent
    Add { name: String },
    /// List agents
    List {
        /// Include deactivated agents
        #[arg(long)]
        all: bool,
    },
    /// Stop an agent from taking new assignments
    Deactivate { id: Uuid },
}

#[derive(Subcommand)]
enum ScheduleCommand {
    /// Book a time slot for a confirmed lead
    Create {
        #[arg(long)]
        lead: Uuid,
        /// Calendar day, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Start time, e.g. "9:00 AM"
        #[arg(long)]
        time: String,
        #[arg(long)]
        duration: i64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit or reschedule a booking
    Update {
        id: Uuid,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        duration: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a booking that was never assigned
    Delete { id: Uuid },
    /// Show one booking
    Show { id: Uuid },
    /// List a lead's bookings, newest first
    List {
        #[arg(long)]
        lead: Uuid,
    },
}

#[derive(Subcommand)]
enum AssignmentCommand {
    /// Show one assignment
    Show { id: Uuid },
    /// List an agent's active jobs
    List {
        #[arg(long)]
        agent: Uuid,
    },
    /// Move an assignment to a new status
    Status {
        id: Uuid,
        #[arg(value_parser = parse_assignment_status)]
        status: AssignmentStatus,
    },
}

#[derive(Subcommand)]
enum AuditCommand {
    /// List audit entries for one resource, oldest first
    List { resource: String, id: Uuid },
}

/// Services sharing one open database.
struct Session<'conn> {
    repo: SqliteRepository<'conn>,
    policy: SchedulingPolicy,
    actor: &'conn str,
}

impl<'conn> Session<'conn> {
    fn leads(&self) -> LeadService<SqliteRepository<'conn>> {
        LeadService::new(self.repo)
    }

    fn agents(&self) -> AgentService<SqliteRepository<'conn>> {
        AgentService::new(self.repo)
    }

    fn schedules(&self) -> ScheduleService<SqliteRepository<'conn>> {
        ScheduleService::with_clock(self.repo, Default::default(), self.policy)
    }

    fn assignments(&self) -> AssignmentService<SqliteRepository<'conn>> {
        AssignmentService::with_clock(self.repo, Default::default(), self.policy)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).and_then(|value| Ok(serde_json::to_string_pretty(&value)?)) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error[{}]: {err:#}", error_code(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Value> {
    let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
    init_logging(level, cli.log_dir.as_deref()).map_err(|err| anyhow!(err))?;

    let policy = SchedulingPolicy::new(cli.buffer_minutes)?;
    let actor = cli.actor.as_str();
    let db = cli.db.as_path();

    match cli.command {
        Commands::Ping => Ok(json!({ "ping": ping(), "version": core_version() })),
        Commands::Slot(command) => run_slot(command),
        Commands::Lead(command) => with_session(db, policy, actor, |s| run_lead(s, command)),
        Commands::Agent(command) => with_session(db, policy, actor, |s| run_agent(s, command)),
        Commands::Schedule(command) => {
            with_session(db, policy, actor, |s| run_schedule(s, command))
        }
        Commands::Assign {
            schedule_id,
            agent_id,
        } => with_session(db, policy, actor, |s| {
            to_json(s.assignments().assign(schedule_id, agent_id, s.actor)?)
        }),
        Commands::Assignment(command) => {
            with_session(db, policy, actor, |s| run_assignment(s, command))
        }
        Commands::Audit(AuditCommand::List { resource, id }) => {
            with_session(db, policy, actor, |s| {
                to_json(s.repo.list_audit_for_resource(&resource, id)?)
            })
        }
    }
}

fn with_session<F>(db: &Path, policy: SchedulingPolicy, actor: &str, op: F) -> Result<Value>
where
    F: FnOnce(&Session<'_>) -> Result<Value>,
{
    let conn = open_db(db).with_context(|| format!("failed to open `{}`", db.display()))?;
    info!("event=cli_session module=cli status=start db={}", db.display());
    let repo = SqliteRepository::try_new(&conn)?;
    op(&Session {
        repo,
        policy,
        actor,
    })
}

fn run_slot(command: SlotCommand) -> Result<Value> {
    match command {
        SlotCommand::Parse { text } => {
            let minute_of_day = parse_time_slot(&text)?;
            Ok(json!({
                "input": text,
                "minute_of_day": minute_of_day,
                "canonical": format_time_slot(minute_of_day),
            }))
        }
        SlotCommand::Window { text, duration } => to_json(compute_window(&text, duration)?),
    }
}

fn run_lead(s: &Session<'_>, command: LeadCommand) -> Result<Value> {
    let leads = s.leads();
    match command {
        LeadCommand::Add { name, address } => to_json(leads.create_lead(&name, address, s.actor)?),
        LeadCommand::Show { id } => to_json(leads.get_lead(id)?),
        LeadCommand::List { status } => to_json(leads.list_leads(status)?),
        LeadCommand::Status { id, status } => to_json(leads.set_status(id, status, s.actor)?),
    }
}

fn run_agent(s: &Session<'_>, command: AgentCommand) -> Result<Value> {
    let agents = s.agents();
    match command {
        AgentCommand::Add { name } => to_json(agents.create_agent(&name, s.actor)?),
        AgentCommand::List { all } => to_json(agents.list_agents(all)?),
        AgentCommand::Deactivate { id } => to_json(agents.deactivate_agent(id, s.actor)?),
    }
}

fn run_schedule(s: &Session<'_>, command: ScheduleCommand) -> Result<Value> {
    let schedules = s.schedules();
    match command {
        ScheduleCommand::Create {
            lead,
            date,
            time,
            duration,
            notes,
        } => {
            schedules.validate_time_slot_format(&time)?;
            let request = NewSchedule {
                lead_id: lead,
                date,
                time_slot: time,
                duration_minutes: duration,
                notes,
            };
            to_json(schedules.create_schedule(&request, s.actor)?)
        }
        ScheduleCommand::Update {
            id,
            date,
            time,
            duration,
            notes,
        } => {
            let changes = ScheduleChanges {
                date,
                time_slot: time,
                duration_minutes: duration,
                notes,
            };
            if changes.is_empty() {
                return Err(anyhow!(
                    "nothing to update; pass --date, --time, --duration or --notes"
                ));
            }
            to_json(schedules.update_schedule(id, &changes, s.actor)?)
        }
        ScheduleCommand::Delete { id } => to_json(schedules.delete_schedule(id, s.actor)?),
        ScheduleCommand::Show { id } => to_json(schedules.get_schedule(id)?),
        ScheduleCommand::List { lead } => to_json(schedules.list_schedules_for_lead(lead)?),
    }
}

fn run_assignment(s: &Session<'_>, command: AssignmentCommand) -> Result<Value> {
    let assignments = s.assignments();
    match command {
        AssignmentCommand::Show { id } => to_json(assignments.get_assignment(id)?),
        AssignmentCommand::List { agent } => to_json(assignments.list_for_agent(agent)?),
        AssignmentCommand::Status { id, status } => {
            to_json(assignments.update_status(id, status, s.actor)?)
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn parse_lead_status(value: &str) -> Result<LeadStatus, String> {
    LeadStatus::parse(value).ok_or_else(|| format!("unknown lead status `{value}`"))
}

fn parse_assignment_status(value: &str) -> Result<AssignmentStatus, String> {
    AssignmentStatus::parse(value).ok_or_else(|| format!("unknown assignment status `{value}`"))
}

/// Maps the first recognised error in the chain to its stable code.
fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(service) = cause.downcast_ref::<ServiceError>() {
            return service.code();
        }
        if cause.downcast_ref::<TimeSlotError>().is_some() {
            return "INVALID_FORMAT";
        }
    }
    "ERROR"
}
