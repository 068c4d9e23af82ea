//! Field agent model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable agent identifier.
pub type AgentId = Uuid;

/// Field agent who performs assigned jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub display_name: String,
    /// Inactive agents keep their history but cannot take new assignments.
    pub is_active: bool,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}

impl Agent {
    pub fn new(display_name: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            is_active: true,
            created_at: now_ms,
        }
    }
}
