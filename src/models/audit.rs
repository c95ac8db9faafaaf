//! Audit domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::role::Role;

/// Kind of event recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Read,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Read => "READ",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }
}

/// Audit log entry. Append-only: nothing updates or deletes these rows.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub actor_role: Role,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    pub before_state: Option<serde_json::Value>,
    pub after_state: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
    /// SHA-256 over the entry content, see [`AuditLogEntry::compute_checksum`]
    pub checksum: String,
    pub occurred_at: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn compute_checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.id.as_bytes());
        hasher.update(self.actor_id.as_bytes());
        hasher.update(self.actor_role.as_str().as_bytes());
        hasher.update(self.action.as_str().as_bytes());
        hasher.update(self.resource_type.as_bytes());
        if let Some(id) = self.resource_id {
            hasher.update(id.as_bytes());
        }
        for state in [&self.before_state, &self.after_state] {
            match state {
                Some(value) => hasher.update(value.to_string().as_bytes()),
                None => hasher.update(b"null"),
            }
        }
        hasher.update(self.occurred_at.timestamp_micros().to_be_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// False when stored content no longer matches its checksum.
    pub fn verify(&self) -> bool {
        self.checksum == self.compute_checksum()
    }
}

/// Per-request metadata captured alongside the entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
}

/// Audit log filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogFilters {
    pub resource_type: Option<String>,
    pub actor_id: Option<Uuid>,
    pub action: Option<AuditAction>,
    pub resource_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl AuditLogFilters {
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.resource_type
            .as_deref()
            .map_or(true, |t| t == entry.resource_type)
            && self.actor_id.map_or(true, |id| id == entry.actor_id)
            && self.action.map_or(true, |a| a == entry.action)
            && self
                .resource_id
                .map_or(true, |id| Some(id) == entry.resource_id)
            && self.from.map_or(true, |from| entry.occurred_at >= from)
            && self.to.map_or(true, |to| entry.occurred_at <= to)
    }
}
