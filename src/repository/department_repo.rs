//! Department repository (数据库访问层)

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{conflict_on_unique, DepartmentRepository};
use crate::{
    error::Result,
    models::{
        department::*,
        pagination::{Page, PageRequest},
    },
};

pub struct PgDepartmentRepository {
    db: PgPool,
}

impl PgDepartmentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &DepartmentFilters) {
    if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
        query
            .push(" AND name ILIKE ")
            .push_bind(format!("%{}%", search));
    }
    if let Some(is_active) = filters.is_active {
        query.push(" AND is_active = ").push_bind(is_active);
    }
}

#[async_trait]
impl DepartmentRepository for PgDepartmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Department>> {
        let department =
            sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(department)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Department>> {
        let department = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(department)
    }

    async fn list(&self, filters: &DepartmentFilters, page: PageRequest) -> Result<Page<Department>> {
        let mut query = QueryBuilder::new("SELECT * FROM departments WHERE 1=1");
        push_filters(&mut query, filters);
        query
            .push(" ORDER BY name LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = query
            .build_query_as::<Department>()
            .fetch_all(&self.db)
            .await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM departments WHERE 1=1");
        push_filters(&mut count, filters);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.db).await?;

        Ok(Page { items, total })
    }

    async fn create(&self, req: &CreateDepartmentRequest) -> Result<Department> {
        sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (id, name, description, head_id, parent_id, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.head_id)
        .bind(req.parent_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| conflict_on_unique(e, "department name already exists"))
    }

    async fn update(&self, id: Uuid, req: &UpdateDepartmentRequest) -> Result<Option<Department>> {
        sqlx::query_as::<_, Department>(
            r#"
            UPDATE departments
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                head_id = COALESCE($4, head_id),
                parent_id = COALESCE($5, parent_id),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.head_id)
        .bind(req.parent_id)
        .bind(req.is_active)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| conflict_on_unique(e, "department name already exists"))
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<Department>> {
        let department = sqlx::query_as::<_, Department>(
            r#"
            UPDATE departments
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(department)
    }
}
