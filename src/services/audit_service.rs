//! 审计日志服务
//!
//! Entries are written after the primary operation has returned successfully.
//! A failed write is reported to the log and the `audit_write_failures_total`
//! counter, and never reaches the caller.

use crate::{
    error::{AppError, Result},
    models::{
        audit::*,
        pagination::{Page, PageRequest},
        Principal,
    },
    repository::AuditRepository,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// 一次审计事件的内容
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub resource_type: &'static str,
    pub resource_id: Option<Uuid>,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn create<T: Serialize>(resource_type: &'static str, id: Uuid, after: &T) -> Self {
        Self {
            action: AuditAction::Create,
            resource_type,
            resource_id: Some(id),
            before: None,
            after: snapshot(after),
        }
    }

    pub fn read<T: Serialize>(resource_type: &'static str, id: Uuid, state: &T) -> Self {
        Self {
            action: AuditAction::Read,
            resource_type,
            resource_id: Some(id),
            before: None,
            after: snapshot(state),
        }
    }

    pub fn update<B: Serialize, A: Serialize>(
        resource_type: &'static str,
        id: Uuid,
        before: &B,
        after: &A,
    ) -> Self {
        Self {
            action: AuditAction::Update,
            resource_type,
            resource_id: Some(id),
            before: snapshot(before),
            after: snapshot(after),
        }
    }

    /// `after` is `None` for hard deletes.
    pub fn delete<B: Serialize, A: Serialize>(
        resource_type: &'static str,
        id: Uuid,
        before: &B,
        after: Option<&A>,
    ) -> Self {
        Self {
            action: AuditAction::Delete,
            resource_type,
            resource_id: Some(id),
            before: snapshot(before),
            after: after.and_then(snapshot),
        }
    }
}

fn snapshot<T: Serialize + ?Sized>(value: &T) -> Option<serde_json::Value> {
    match serde_json::to_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            error!(error = %e, "Failed to serialize audit snapshot");
            None
        }
    }
}

pub struct AuditService {
    repo: Arc<dyn AuditRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    /// 记录审计日志条目（失败只记录日志，不向调用方返回错误）
    pub async fn record(&self, actor: &Principal, event: AuditEvent, meta: &RequestMeta) {
        let mut entry = AuditLogEntry {
            id: Uuid::new_v4(),
            actor_id: actor.user_id,
            actor_role: actor.role,
            action: event.action,
            resource_type: event.resource_type.to_string(),
            resource_id: event.resource_id,
            before_state: event.before,
            after_state: event.after,
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
            request_id: meta.request_id.clone(),
            checksum: String::new(),
            occurred_at: Utc::now(),
        };
        entry.checksum = entry.compute_checksum();

        match self.repo.append(&entry).await {
            Ok(()) => debug!(
                audit_id = %entry.id,
                action = entry.action.as_str(),
                resource_type = %entry.resource_type,
                "Audit entry recorded"
            ),
            Err(e) => {
                error!(
                    error = %e,
                    actor_id = %entry.actor_id,
                    action = entry.action.as_str(),
                    resource_type = %entry.resource_type,
                    resource_id = ?entry.resource_id,
                    "Failed to write audit entry"
                );
                metrics::counter!(
                    "audit_write_failures_total",
                    "resource_type" => entry.resource_type.clone()
                )
                .increment(1);
            }
        }
    }

    /// 查询审计日志
    pub async fn list(&self, filters: &AuditLogFilters, page: PageRequest) -> Result<Page<AuditLogEntry>> {
        if let (Some(from), Some(to)) = (filters.from, filters.to) {
            if from > to {
                return Err(AppError::validation("'from' must not be after 'to'"));
            }
        }
        self.repo.list(filters, page).await
    }

    pub async fn get(&self, id: Uuid) -> Result<AuditLogEntry> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("audit log entry"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{audit::AuditAction, Role};
    use crate::repository::MemoryStore;
    use serde_json::json;

    fn actor() -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            username: "hr.lead".to_string(),
            role: Role::Hr,
            employee_id: None,
        }
    }

    #[tokio::test]
    async fn test_record_writes_checksummed_entry() {
        let store = Arc::new(MemoryStore::new());
        let service = AuditService::new(store.clone());
        let id = Uuid::new_v4();
        let meta = RequestMeta {
            ip_address: Some("10.1.2.3".to_string()),
            user_agent: Some("curl/8.0".to_string()),
            request_id: Some("req-1".to_string()),
        };

        service
            .record(
                &actor(),
                AuditEvent::create("departments", id, &json!({"name": "Finance"})),
                &meta,
            )
            .await;

        let entries = store.audit_entries().await;
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.action, AuditAction::Create);
        assert_eq!(entry.resource_id, Some(id));
        assert_eq!(entry.ip_address.as_deref(), Some("10.1.2.3"));
        assert_eq!(entry.after_state.as_ref().unwrap()["name"], "Finance");
        assert!(entry.verify());
    }

    #[tokio::test]
    async fn test_list_rejects_inverted_range() {
        let service = AuditService::new(Arc::new(MemoryStore::new()));
        let now = Utc::now();
        let filters = AuditLogFilters {
            from: Some(now),
            to: Some(now - chrono::Duration::hours(1)),
            ..Default::default()
        };

        let err = service
            .list(&filters, PageRequest { page: 1, limit: 10 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_delete_event_without_after_state() {
        let event = AuditEvent::delete::<_, serde_json::Value>(
            "leave_policies",
            Uuid::new_v4(),
            &json!({"name": "Sick"}),
            None,
        );
        assert_eq!(event.action, AuditAction::Delete);
        assert!(event.before.is_some());
        assert!(event.after.is_none());
    }
}
