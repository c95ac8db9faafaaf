//! Leave repository (数据库访问层)

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{conflict_on_unique, LeaveRepository};
use crate::{
    error::Result,
    models::{
        leave::*,
        pagination::{Page, PageRequest},
        ScopeFilter,
    },
};

pub struct PgLeaveRepository {
    db: PgPool,
}

impl PgLeaveRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn push_request_filters(
    query: &mut QueryBuilder<'_, Postgres>,
    filters: &LeaveRequestFilters,
    scope: &ScopeFilter,
) {
    if let Some(status) = filters.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(employee_id) = filters.employee_id {
        query.push(" AND employee_id = ").push_bind(employee_id);
    }
    if let Some(policy_id) = filters.leave_policy_id {
        query.push(" AND leave_policy_id = ").push_bind(policy_id);
    }
    if let Some(ids) = scope.visible_ids() {
        query.push(" AND employee_id = ANY(").push_bind(ids).push(")");
    }
}

#[async_trait]
impl LeaveRepository for PgLeaveRepository {
    // ==================== Policies ====================

    async fn find_policy(&self, id: Uuid) -> Result<Option<LeavePolicy>> {
        let policy = sqlx::query_as::<_, LeavePolicy>("SELECT * FROM leave_policies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(policy)
    }

    async fn find_policy_by_name(&self, name: &str) -> Result<Option<LeavePolicy>> {
        let policy = sqlx::query_as::<_, LeavePolicy>(
            "SELECT * FROM leave_policies WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(policy)
    }

    async fn list_policies(&self, page: PageRequest) -> Result<Page<LeavePolicy>> {
        let items = sqlx::query_as::<_, LeavePolicy>(
            "SELECT * FROM leave_policies ORDER BY name LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.db)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leave_policies")
            .fetch_one(&self.db)
            .await?;

        Ok(Page { items, total })
    }

    async fn create_policy(&self, req: &CreateLeavePolicyRequest) -> Result<LeavePolicy> {
        sqlx::query_as::<_, LeavePolicy>(
            r#"
            INSERT INTO leave_policies (id, name, description, days_per_year, max_consecutive_days, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.days_per_year)
        .bind(req.max_consecutive_days)
        .fetch_one(&self.db)
        .await
        .map_err(|e| conflict_on_unique(e, "leave policy name already exists"))
    }

    async fn update_policy(
        &self,
        id: Uuid,
        req: &UpdateLeavePolicyRequest,
    ) -> Result<Option<LeavePolicy>> {
        sqlx::query_as::<_, LeavePolicy>(
            r#"
            UPDATE leave_policies
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                days_per_year = COALESCE($4, days_per_year),
                max_consecutive_days = COALESCE($5, max_consecutive_days),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.days_per_year)
        .bind(req.max_consecutive_days)
        .bind(req.is_active)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| conflict_on_unique(e, "leave policy name already exists"))
    }

    async fn deactivate_policy(&self, id: Uuid) -> Result<Option<LeavePolicy>> {
        let policy = sqlx::query_as::<_, LeavePolicy>(
            r#"
            UPDATE leave_policies
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(policy)
    }

    async fn count_active_requests_for_policy(&self, policy_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM leave_requests
            WHERE leave_policy_id = $1 AND status IN ('PENDING', 'APPROVED')
            "#,
        )
        .bind(policy_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    // ==================== Requests ====================

    async fn find_request_owner(&self, id: Uuid) -> Result<Option<Uuid>> {
        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT employee_id FROM leave_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(owner)
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
        let request =
            sqlx::query_as::<_, LeaveRequest>("SELECT * FROM leave_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(request)
    }

    async fn has_overlapping_request(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM leave_requests
                WHERE employee_id = $1
                  AND status IN ('PENDING', 'APPROVED')
                  AND start_date <= $3
                  AND $2 <= end_date
            )
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn list_requests(
        &self,
        filters: &LeaveRequestFilters,
        scope: &ScopeFilter,
        page: PageRequest,
    ) -> Result<Page<LeaveRequest>> {
        let mut query = QueryBuilder::new("SELECT * FROM leave_requests WHERE 1=1");
        push_request_filters(&mut query, filters, scope);
        query
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = query
            .build_query_as::<LeaveRequest>()
            .fetch_all(&self.db)
            .await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM leave_requests WHERE 1=1");
        push_request_filters(&mut count, filters, scope);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.db).await?;

        Ok(Page { items, total })
    }

    async fn create_request(&self, req: &NewLeaveRequest) -> Result<LeaveRequest> {
        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            INSERT INTO leave_requests (
                id, employee_id, leave_policy_id, start_date, end_date, days, reason, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'PENDING')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.employee_id)
        .bind(req.leave_policy_id)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.days)
        .bind(&req.reason)
        .fetch_one(&self.db)
        .await?;

        Ok(request)
    }

    async fn transition_pending(
        &self,
        id: Uuid,
        transition: &LeaveTransition,
    ) -> Result<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            UPDATE leave_requests
            SET
                status = $2,
                reviewed_by = COALESCE($3, reviewed_by),
                reviewed_at = CASE WHEN $3::uuid IS NULL THEN reviewed_at ELSE NOW() END,
                review_note = COALESCE($4, review_note),
                updated_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(transition.status)
        .bind(transition.reviewed_by)
        .bind(&transition.note)
        .fetch_optional(&self.db)
        .await?;

        Ok(request)
    }
}
