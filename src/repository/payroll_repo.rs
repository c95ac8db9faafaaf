//! Payroll repository (数据库访问层)

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{conflict_on_unique, PayrollRepository};
use crate::{
    error::Result,
    models::{
        pagination::{Page, PageRequest},
        payroll::*,
        ScopeFilter,
    },
};

pub struct PgPayrollRepository {
    db: PgPool,
}

impl PgPayrollRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn push_filters(
    query: &mut QueryBuilder<'_, Postgres>,
    filters: &PayrollFilters,
    scope: &ScopeFilter,
) {
    if let Some(employee_id) = filters.employee_id {
        query.push(" AND employee_id = ").push_bind(employee_id);
    }
    if let Some(period) = &filters.period {
        query.push(" AND period = ").push_bind(period.clone());
    }
    if let Some(status) = filters.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(ids) = scope.visible_ids() {
        query.push(" AND employee_id = ANY(").push_bind(ids).push(")");
    }
}

#[async_trait]
impl PayrollRepository for PgPayrollRepository {
    async fn find_owner(&self, id: Uuid) -> Result<Option<Uuid>> {
        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT employee_id FROM payroll_records WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(owner)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PayrollRecord>> {
        let record =
            sqlx::query_as::<_, PayrollRecord>("SELECT * FROM payroll_records WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(record)
    }

    async fn find_for_period(
        &self,
        employee_id: Uuid,
        period: &str,
    ) -> Result<Option<PayrollRecord>> {
        let record = sqlx::query_as::<_, PayrollRecord>(
            "SELECT * FROM payroll_records WHERE employee_id = $1 AND period = $2",
        )
        .bind(employee_id)
        .bind(period)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }

    async fn list(
        &self,
        filters: &PayrollFilters,
        scope: &ScopeFilter,
        page: PageRequest,
    ) -> Result<Page<PayrollRecord>> {
        let mut query = QueryBuilder::new("SELECT * FROM payroll_records WHERE 1=1");
        push_filters(&mut query, filters, scope);
        query
            .push(" ORDER BY period DESC, created_at DESC, id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = query
            .build_query_as::<PayrollRecord>()
            .fetch_all(&self.db)
            .await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM payroll_records WHERE 1=1");
        push_filters(&mut count, filters, scope);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.db).await?;

        Ok(Page { items, total })
    }

    async fn create(&self, req: &CreatePayrollRequest) -> Result<PayrollRecord> {
        sqlx::query_as::<_, PayrollRecord>(
            r#"
            INSERT INTO payroll_records (id, employee_id, period, gross_pay, deductions, net_pay, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'DRAFT')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.employee_id)
        .bind(&req.period)
        .bind(req.gross_pay)
        .bind(req.deductions)
        .bind(req.net_pay())
        .fetch_one(&self.db)
        .await
        .map_err(|e| conflict_on_unique(e, "payroll record already exists for this period"))
    }

    async fn mark_paid(&self, id: Uuid) -> Result<Option<PayrollRecord>> {
        let record = sqlx::query_as::<_, PayrollRecord>(
            r#"
            UPDATE payroll_records
            SET status = 'PAID', paid_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'DRAFT'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }
}
