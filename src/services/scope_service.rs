//! 数据范围服务：按角色计算调用者可见的员工集合

use crate::{
    error::{AppError, Result},
    models::{Principal, Role, ScopeFilter},
    repository::EmployeeRepository,
};
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

pub struct ScopeService {
    employees: Arc<dyn EmployeeRepository>,
}

impl ScopeService {
    pub fn new(employees: Arc<dyn EmployeeRepository>) -> Self {
        Self { employees }
    }

    /// Employees the caller may see.
    ///
    /// ADMIN and HR see everything. A MANAGER sees itself plus its direct
    /// reports (one hop), an EMPLOYEE only itself. An account without a
    /// linked employee record sees nothing.
    #[instrument(skip(self, principal), fields(user_id = %principal.user_id, role = %principal.role))]
    pub async fn resolve_scope(&self, principal: &Principal) -> Result<ScopeFilter> {
        match principal.role {
            Role::Admin | Role::Hr => Ok(ScopeFilter::All),
            Role::Manager => {
                let Some(own) = principal.employee_id else {
                    return Ok(ScopeFilter::Only(Default::default()));
                };
                let reports = self.employees.direct_report_ids(own).await?;
                Ok(ScopeFilter::only(std::iter::once(own).chain(reports)))
            }
            Role::Employee => Ok(ScopeFilter::only(principal.employee_id)),
        }
    }

    /// Scope predicate for a list query.
    ///
    /// An explicitly requested target outside the caller's scope is refused
    /// instead of silently producing an empty page.
    pub async fn build_scope_filter(
        &self,
        principal: &Principal,
        requested_target: Option<Uuid>,
    ) -> Result<ScopeFilter> {
        let scope = self.resolve_scope(principal).await?;
        if let Some(target) = requested_target {
            ensure_permitted(principal, &scope, target)?;
        }
        Ok(scope)
    }

    /// Per-record check: the owning employee must be inside the caller's scope.
    pub async fn authorize_employee(&self, principal: &Principal, employee_id: Uuid) -> Result<()> {
        let scope = self.resolve_scope(principal).await?;
        ensure_permitted(principal, &scope, employee_id)
    }

    /// Non-privileged callers may only act on their own record.
    pub fn require_self_unless_privileged(&self, principal: &Principal, employee_id: Uuid) -> Result<()> {
        if principal.role.sees_all_records() || principal.is_self(employee_id) {
            return Ok(());
        }
        deny(principal, employee_id)
    }
}

fn ensure_permitted(principal: &Principal, scope: &ScopeFilter, target: Uuid) -> Result<()> {
    if scope.permits(target) {
        Ok(())
    } else {
        deny(principal, target)
    }
}

fn deny(principal: &Principal, target: Uuid) -> Result<()> {
    warn!(
        user_id = %principal.user_id,
        role = %principal.role,
        target = %target,
        "Access denied: record outside caller scope"
    );
    metrics::counter!("access_denied_total", "reason" => "scope").increment(1);
    Err(AppError::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::CreateEmployeeRequest;
    use crate::repository::MemoryStore;
    use chrono::NaiveDate;

    fn principal(role: Role, employee_id: Option<Uuid>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            username: "scope".to_string(),
            role,
            employee_id,
        }
    }

    async fn hire(store: &MemoryStore, code: &str, manager_id: Option<Uuid>) -> Uuid {
        EmployeeRepository::create(
            store,
            &CreateEmployeeRequest {
                employee_id: code.to_string(),
                first_name: code.to_string(),
                last_name: "Staff".to_string(),
                email: format!("{}@corp.example", code.to_lowercase()),
                phone: None,
                job_title: None,
                department_id: None,
                manager_id,
                hire_date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_manager_scope_is_one_hop() {
        let store = Arc::new(MemoryStore::new());
        let m1 = hire(&store, "M1", None).await;
        let e1 = hire(&store, "E1", Some(m1)).await;
        let e2 = hire(&store, "E2", Some(m1)).await;
        let grand = hire(&store, "G1", Some(e1)).await;
        let e3 = hire(&store, "E3", None).await;

        let service = ScopeService::new(store);
        let scope = service
            .resolve_scope(&principal(Role::Manager, Some(m1)))
            .await
            .unwrap();

        assert_eq!(scope, ScopeFilter::only([m1, e1, e2]));
        assert!(!scope.permits(grand));
        assert!(!scope.permits(e3));
    }

    #[tokio::test]
    async fn test_privileged_roles_see_all() {
        let service = ScopeService::new(Arc::new(MemoryStore::new()));
        for role in [Role::Admin, Role::Hr] {
            let scope = service.resolve_scope(&principal(role, None)).await.unwrap();
            assert_eq!(scope, ScopeFilter::All);
        }
    }

    #[tokio::test]
    async fn test_explicit_target_outside_scope_is_forbidden() {
        let store = Arc::new(MemoryStore::new());
        let me = hire(&store, "E10", None).await;
        let other = hire(&store, "E11", None).await;
        let service = ScopeService::new(store);
        let caller = principal(Role::Employee, Some(me));

        let err = service
            .build_scope_filter(&caller, Some(other))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let scope = service.build_scope_filter(&caller, Some(me)).await.unwrap();
        assert_eq!(scope, ScopeFilter::only([me]));
    }

    #[tokio::test]
    async fn test_unlinked_account_sees_nothing() {
        let service = ScopeService::new(Arc::new(MemoryStore::new()));
        let scope = service
            .resolve_scope(&principal(Role::Manager, None))
            .await
            .unwrap();
        assert_eq!(scope.visible_ids(), Some(vec![]));
    }
}
