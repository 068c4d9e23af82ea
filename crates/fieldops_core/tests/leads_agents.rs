use chrono::NaiveDate;
use fieldops_core::db::open_db_in_memory;
use fieldops_core::{
    AgentService, AuditAction, AuditRepository, FixedClock, Lead, LeadRepository, LeadService,
    LeadStatus, RepoError, ServiceError, SqliteRepository, Transactional,
};

fn clock() -> FixedClock {
    FixedClock {
        today: NaiveDate::from_ymd_opt(2030, 3, 10).unwrap(),
        now_ms: 42,
    }
}

#[test]
fn create_lead_trims_input_and_records_audit() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::try_new(&conn).unwrap();
    let leads = LeadService::with_clock(repo, clock());

    let lead = leads
        .create_lead("  Harbor Dental  ", Some("   ".to_string()), "ops")
        .unwrap();

    assert_eq!(lead.client_name, "Harbor Dental");
    assert_eq!(lead.address, None);
    assert_eq!(lead.status, LeadStatus::Created);
    assert_eq!(lead.created_at, 42);
    assert_eq!(leads.get_lead(lead.id).unwrap(), lead);

    let audit = repo.list_audit_for_resource("lead", lead.id).unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].details["client_name"], "Harbor Dental");
}

#[test]
fn blank_lead_name_is_rejected_without_writes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::try_new(&conn).unwrap();
    let leads = LeadService::with_clock(repo, clock());

    let err = leads.create_lead("   ", None, "ops").unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
    assert!(leads.list_leads(None).unwrap().is_empty());
    assert_eq!(repo.count_audit_entries().unwrap(), 0);
}

#[test]
fn set_status_is_idempotent_and_terminal_states_are_final() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::try_new(&conn).unwrap();
    let leads = LeadService::with_clock(repo, clock());
    let lead = leads.create_lead("Harbor Dental", None, "ops").unwrap();

    leads.set_status(lead.id, LeadStatus::Confirm, "ops").unwrap();
    leads.set_status(lead.id, LeadStatus::Confirm, "ops").unwrap();
    let changes = repo.list_audit_for_resource("lead", lead.id).unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1].action, AuditAction::StatusChange);
    assert_eq!(changes[1].details["from"], "created");
    assert_eq!(changes[1].details["to"], "confirm");

    leads
        .set_status(lead.id, LeadStatus::Completed, "ops")
        .unwrap();
    let err = leads
        .set_status(lead.id, LeadStatus::InProgress, "ops")
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
    assert_eq!(
        leads.get_lead(lead.id).unwrap().status,
        LeadStatus::Completed
    );
}

#[test]
fn list_leads_filters_by_status() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::try_new(&conn).unwrap();
    let leads = LeadService::with_clock(repo, clock());
    let confirmed = leads.create_lead("Confirmed Co", None, "ops").unwrap();
    leads.create_lead("Draft Co", None, "ops").unwrap();
    leads
        .set_status(confirmed.id, LeadStatus::Confirm, "ops")
        .unwrap();

    assert_eq!(leads.list_leads(None).unwrap().len(), 2);
    let only_confirmed = leads.list_leads(Some(LeadStatus::Confirm)).unwrap();
    assert_eq!(only_confirmed.len(), 1);
    assert_eq!(only_confirmed[0].id, confirmed.id);
}

#[test]
fn unknown_lead_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::try_new(&conn).unwrap();
    let leads = LeadService::with_clock(repo, clock());

    let missing = uuid::Uuid::new_v4();
    assert_eq!(leads.get_lead(missing).unwrap_err().code(), "NOT_FOUND");
    assert_eq!(
        leads
            .set_status(missing, LeadStatus::Confirm, "ops")
            .unwrap_err()
            .code(),
        "NOT_FOUND"
    );
}

#[test]
fn agents_can_be_listed_and_deactivated() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::try_new(&conn).unwrap();
    let agents = AgentService::with_clock(repo, clock());
    let rosa = agents.create_agent(" Rosa ", "ops").unwrap();
    let sam = agents.create_agent("Sam", "ops").unwrap();
    assert_eq!(rosa.display_name, "Rosa");

    let retired = agents.deactivate_agent(sam.id, "ops").unwrap();
    assert!(!retired.is_active);
    agents.deactivate_agent(sam.id, "ops").unwrap();
    assert_eq!(
        repo.list_audit_for_resource("agent", sam.id).unwrap().len(),
        2
    );

    let active = agents.list_agents(false).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, rosa.id);
    assert_eq!(agents.list_agents(true).unwrap().len(), 2);

    assert!(agents.create_agent("  ", "ops").is_err());
}

#[test]
fn failed_transaction_rolls_back_every_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::try_new(&conn).unwrap();
    let lead = Lead::new("Rollback Inc", None, 1);

    let result: Result<(), RepoError> = repo.in_transaction(|store| {
        store.insert_lead(&lead)?;
        Err(RepoError::InvalidData("forced failure".to_string()))
    });

    assert!(result.is_err());
    assert!(repo.get_lead(lead.id).unwrap().is_none());

    repo.in_transaction(|store| store.insert_lead(&lead))
        .unwrap();
    assert!(repo.get_lead(lead.id).unwrap().is_some());
}
