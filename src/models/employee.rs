//! Employee domain models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Employment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "employment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentStatus {
    Active,
    OnLeave,
    Terminated,
}

impl EmploymentStatus {
    pub fn is_active(&self) -> bool {
        !matches!(self, EmploymentStatus::Terminated)
    }
}

/// Employee record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: Uuid,
    /// Human-facing staff number, e.g. "EMP100"
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub status: EmploymentStatus,
    pub hire_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create employee request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, max = 32))]
    pub employee_id: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub job_title: Option<String>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub hire_date: NaiveDate,
}

/// Update employee request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub job_title: Option<String>,
    /// `Some(None)` (JSON `null`) clears the department
    #[serde(default, deserialize_with = "double_option")]
    pub department_id: Option<Option<Uuid>>,
    /// `Some(None)` (JSON `null`) clears the manager
    #[serde(default, deserialize_with = "double_option")]
    pub manager_id: Option<Option<Uuid>>,
    /// Termination goes through DELETE, not here
    pub status: Option<EmploymentStatus>,
}

/// Absent field stays `None`, explicit `null` becomes `Some(None)`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Employee list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFilters {
    /// Matches name, email or staff number
    pub search: Option<String>,
    pub status: Option<EmploymentStatus>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    /// Explicit target record
    pub id: Option<Uuid>,
}

impl EmployeeFilters {
    /// Conjunction of the caller-supplied filters, scope excluded.
    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = [
                &employee.first_name,
                &employee.last_name,
                &employee.email,
                &employee.employee_id,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != employee.status) {
            return false;
        }
        if self.department_id.is_some() && self.department_id != employee.department_id {
            return false;
        }
        if self.manager_id.is_some() && self.manager_id != employee.manager_id {
            return false;
        }
        if self.id.is_some_and(|id| id != employee.id) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let req: UpdateEmployeeRequest =
            serde_json::from_value(serde_json::json!({ "manager_id": null })).unwrap();
        assert_eq!(req.manager_id, Some(None));
        assert_eq!(req.department_id, None);

        let id = Uuid::new_v4();
        let req: UpdateEmployeeRequest =
            serde_json::from_value(serde_json::json!({ "department_id": id })).unwrap();
        assert_eq!(req.department_id, Some(Some(id)));
    }

    fn employee(first: &str, email: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            employee_id: "EMP001".to_string(),
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            phone: None,
            job_title: None,
            department_id: None,
            manager_id: None,
            status: EmploymentStatus::Active,
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            termination_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let e = employee("Alice", "alice@example.com");
        let filters = EmployeeFilters {
            search: Some("ALI".to_string()),
            ..Default::default()
        };
        assert!(filters.matches(&e));

        let filters = EmployeeFilters {
            search: Some("bob".to_string()),
            ..Default::default()
        };
        assert!(!filters.matches(&e));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let mut e = employee("Alice", "alice@example.com");
        let dept = Uuid::new_v4();
        e.department_id = Some(dept);

        let filters = EmployeeFilters {
            department_id: Some(dept),
            status: Some(EmploymentStatus::Terminated),
            ..Default::default()
        };
        assert!(!filters.matches(&e));

        let filters = EmployeeFilters {
            department_id: Some(dept),
            status: Some(EmploymentStatus::Active),
            ..Default::default()
        };
        assert!(filters.matches(&e));
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreateEmployeeRequest {
            employee_id: "EMP100".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "not-an-email".to_string(),
            phone: None,
            job_title: None,
            department_id: None,
            manager_id: None,
            hire_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert!(req.validate().is_err());

        let req = CreateEmployeeRequest {
            email: "a@x.com".to_string(),
            ..req
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&EmploymentStatus::OnLeave).unwrap();
        assert_eq!(json, "\"ON_LEAVE\"");
        assert!(!EmploymentStatus::Terminated.is_active());
    }
}
