//! Department domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Department
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub head_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create department request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub head_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
}

/// Update department request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDepartmentRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub head_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Department list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartmentFilters {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

impl DepartmentFilters {
    pub fn matches(&self, department: &Department) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            if !department
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        self.is_active.map_or(true, |active| active == department.is_active)
    }
}
