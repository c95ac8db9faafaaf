//! Employee repository (数据库访问层)

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{conflict_on_unique, EmployeeRepository};
use crate::{
    error::Result,
    models::{
        employee::*,
        pagination::{Page, PageRequest},
        ScopeFilter,
    },
};

pub struct PgEmployeeRepository {
    db: PgPool,
}

impl PgEmployeeRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Append the caller filters and the scope predicate to a `WHERE 1=1` query.
fn push_filters(
    query: &mut QueryBuilder<'_, Postgres>,
    filters: &EmployeeFilters,
    scope: &ScopeFilter,
) {
    if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        query
            .push(" AND (first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR last_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR employee_id ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(status) = filters.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(department_id) = filters.department_id {
        query.push(" AND department_id = ").push_bind(department_id);
    }
    if let Some(manager_id) = filters.manager_id {
        query.push(" AND manager_id = ").push_bind(manager_id);
    }
    if let Some(id) = filters.id {
        query.push(" AND id = ").push_bind(id);
    }
    if let Some(ids) = scope.visible_ids() {
        query.push(" AND id = ANY(").push_bind(ids).push(")");
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(employee)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM employees WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }

    async fn find_by_employee_id(&self, employee_id: &str) -> Result<Option<Employee>> {
        let employee =
            sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE employee_id = $1")
                .bind(employee_id)
                .fetch_optional(&self.db)
                .await?;

        Ok(employee)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>> {
        let employee =
            sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.db)
                .await?;

        Ok(employee)
    }

    async fn direct_report_ids(&self, manager_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM employees WHERE manager_id = $1")
            .bind(manager_id)
            .fetch_all(&self.db)
            .await?;

        Ok(ids)
    }

    async fn count_active_direct_reports(&self, manager_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM employees WHERE manager_id = $1 AND status <> 'TERMINATED'",
        )
        .bind(manager_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    async fn count_active_in_department(&self, department_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM employees WHERE department_id = $1 AND status <> 'TERMINATED'",
        )
        .bind(department_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    async fn list(
        &self,
        filters: &EmployeeFilters,
        scope: &ScopeFilter,
        page: PageRequest,
    ) -> Result<Page<Employee>> {
        let mut query = QueryBuilder::new("SELECT * FROM employees WHERE 1=1");
        push_filters(&mut query, filters, scope);
        query
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = query
            .build_query_as::<Employee>()
            .fetch_all(&self.db)
            .await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM employees WHERE 1=1");
        push_filters(&mut count, filters, scope);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.db).await?;

        Ok(Page { items, total })
    }

    async fn create(&self, req: &CreateEmployeeRequest) -> Result<Employee> {
        sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (
                id, employee_id, first_name, last_name, email, phone, job_title,
                department_id, manager_id, status, hire_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'ACTIVE', $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.employee_id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.job_title)
        .bind(req.department_id)
        .bind(req.manager_id)
        .bind(req.hire_date)
        .fetch_one(&self.db)
        .await
        .map_err(|e| conflict_on_unique(e, "employee_id or email already exists"))
    }

    async fn update(&self, id: Uuid, req: &UpdateEmployeeRequest) -> Result<Option<Employee>> {
        sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                job_title = COALESCE($6, job_title),
                department_id = CASE WHEN $10 THEN $7 ELSE department_id END,
                manager_id = CASE WHEN $11 THEN $8 ELSE manager_id END,
                status = COALESCE($9, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.job_title)
        .bind(req.department_id.flatten())
        .bind(req.manager_id.flatten())
        .bind(req.status)
        .bind(req.department_id.is_some())
        .bind(req.manager_id.is_some())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| conflict_on_unique(e, "email already exists"))
    }

    async fn terminate(&self, id: Uuid, date: NaiveDate) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET status = 'TERMINATED', termination_date = $2, updated_at = NOW()
            WHERE id = $1 AND status <> 'TERMINATED'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;

        Ok(employee)
    }
}
