//! Audit repository (审计数据访问)

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::AuditRepository;
use crate::{
    error::Result,
    models::{
        audit::*,
        pagination::{Page, PageRequest},
    },
};

pub struct PgAuditRepository {
    db: PgPool,
}

impl PgAuditRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &AuditLogFilters) {
    if let Some(resource_type) = &filters.resource_type {
        query
            .push(" AND resource_type = ")
            .push_bind(resource_type.clone());
    }
    if let Some(actor_id) = filters.actor_id {
        query.push(" AND actor_id = ").push_bind(actor_id);
    }
    if let Some(action) = filters.action {
        query.push(" AND action = ").push_bind(action);
    }
    if let Some(resource_id) = filters.resource_id {
        query.push(" AND resource_id = ").push_bind(resource_id);
    }
    if let Some(from) = filters.from {
        query.push(" AND occurred_at >= ").push_bind(from);
    }
    if let Some(to) = filters.to {
        query.push(" AND occurred_at <= ").push_bind(to);
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    /// 插入审计日志
    async fn append(&self, entry: &AuditLogEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id, actor_id, actor_role, action, resource_type, resource_id,
                before_state, after_state, ip_address, user_agent, request_id,
                checksum, occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(entry.id)
        .bind(entry.actor_id)
        .bind(entry.actor_role)
        .bind(entry.action)
        .bind(&entry.resource_type)
        .bind(entry.resource_id)
        .bind(&entry.before_state)
        .bind(&entry.after_state)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(&entry.request_id)
        .bind(&entry.checksum)
        .bind(entry.occurred_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditLogEntry>> {
        let entry = sqlx::query_as::<_, AuditLogEntry>("SELECT * FROM audit_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(entry)
    }

    /// 查询审计日志
    async fn list(&self, filters: &AuditLogFilters, page: PageRequest) -> Result<Page<AuditLogEntry>> {
        let mut query = QueryBuilder::new("SELECT * FROM audit_logs WHERE 1=1");
        push_filters(&mut query, filters);
        query
            .push(" ORDER BY occurred_at DESC, id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = query
            .build_query_as::<AuditLogEntry>()
            .fetch_all(&self.db)
            .await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM audit_logs WHERE 1=1");
        push_filters(&mut count, filters);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.db).await?;

        Ok(Page { items, total })
    }
}
