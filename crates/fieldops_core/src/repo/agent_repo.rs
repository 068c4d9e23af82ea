//! Agent repository contract and SQLite implementation.

use super::{bool_to_int, ensure_changed, parse_bool, parse_uuid, RepoResult, SqliteRepository};
use crate::model::agent::{Agent, AgentId};
use rusqlite::{params, OptionalExtension, Row};

const AGENT_SELECT_SQL: &str = "SELECT id, display_name, is_active, created_at FROM agents";

/// Repository interface for field agents.
pub trait AgentRepository {
    fn insert_agent(&self, agent: &Agent) -> RepoResult<()>;
    fn get_agent(&self, id: AgentId) -> RepoResult<Option<Agent>>;
    /// Lists agents by display name.
    fn list_agents(&self, include_inactive: bool) -> RepoResult<Vec<Agent>>;
    fn set_agent_active(&self, id: AgentId, is_active: bool) -> RepoResult<()>;
}

impl AgentRepository for SqliteRepository<'_> {
    fn insert_agent(&self, agent: &Agent) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO agents (id, display_name, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                agent.id.to_string(),
                agent.display_name.as_str(),
                bool_to_int(agent.is_active),
                agent.created_at,
            ],
        )?;
        Ok(())
    }

    fn get_agent(&self, id: AgentId) -> RepoResult<Option<Agent>> {
        let row = self
            .conn()
            .query_row(
                &format!("{AGENT_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_agent_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn list_agents(&self, include_inactive: bool) -> RepoResult<Vec<Agent>> {
        let mut stmt = self.conn().prepare(&format!(
            "{AGENT_SELECT_SQL}
             WHERE (?1 = 1 OR is_active = 1)
             ORDER BY display_name ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([bool_to_int(include_inactive)])?;
        let mut agents = Vec::new();
        while let Some(row) = rows.next()? {
            agents.push(parse_agent_row(row)?);
        }
        Ok(agents)
    }

    fn set_agent_active(&self, id: AgentId, is_active: bool) -> RepoResult<()> {
        let changed = self.conn().execute(
            "UPDATE agents SET is_active = ?2 WHERE id = ?1;",
            params![id.to_string(), bool_to_int(is_active)],
        )?;
        ensure_changed(changed, "agent", id)
    }
}

fn parse_agent_row(row: &Row<'_>) -> RepoResult<Agent> {
    let id_text: String = row.get("id")?;
    Ok(Agent {
        id: parse_uuid(&id_text, "agents.id")?,
        display_name: row.get("display_name")?,
        is_active: parse_bool(row.get("is_active")?, "agents.is_active")?,
        created_at: row.get("created_at")?,
    })
}
