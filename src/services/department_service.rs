//! 部门服务

use crate::{
    error::{AppError, Result},
    models::{
        audit::RequestMeta,
        department::*,
        pagination::{Page, PageRequest},
        Principal,
    },
    repository::{DepartmentRepository, EmployeeRepository},
    services::audit_service::{AuditEvent, AuditService},
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

const RESOURCE: &str = "departments";

pub struct DepartmentService {
    departments: Arc<dyn DepartmentRepository>,
    employees: Arc<dyn EmployeeRepository>,
    audit: Arc<AuditService>,
}

impl DepartmentService {
    pub fn new(
        departments: Arc<dyn DepartmentRepository>,
        employees: Arc<dyn EmployeeRepository>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            departments,
            employees,
            audit,
        }
    }

    pub async fn list(&self, filters: &DepartmentFilters, page: PageRequest) -> Result<Page<Department>> {
        self.departments.list(filters, page).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Department> {
        self.departments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("department"))
    }

    #[instrument(skip(self, principal, req, meta), fields(name = %req.name))]
    pub async fn create(
        &self,
        principal: &Principal,
        req: CreateDepartmentRequest,
        meta: &RequestMeta,
    ) -> Result<Department> {
        req.validate()?;

        if self.departments.find_by_name(&req.name).await?.is_some() {
            return Err(AppError::conflict("department name already exists"));
        }
        if let Some(head_id) = req.head_id {
            self.ensure_active_head(head_id).await?;
        }
        if let Some(parent_id) = req.parent_id {
            self.ensure_active_parent(parent_id).await?;
        }

        let department = self.departments.create(&req).await?;
        info!(id = %department.id, "Department created");

        self.audit
            .record(
                principal,
                AuditEvent::create(RESOURCE, department.id, &department),
                meta,
            )
            .await;

        Ok(department)
    }

    #[instrument(skip(self, principal, req, meta))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        req: UpdateDepartmentRequest,
        meta: &RequestMeta,
    ) -> Result<Department> {
        req.validate()?;

        let before = self.get(id).await?;

        if let Some(name) = &req.name {
            if let Some(other) = self.departments.find_by_name(name).await? {
                if other.id != id {
                    return Err(AppError::conflict("department name already exists"));
                }
            }
        }
        if req.parent_id == Some(id) {
            return Err(AppError::validation("department cannot be its own parent"));
        }
        if let Some(head_id) = req.head_id {
            self.ensure_active_head(head_id).await?;
        }
        if let Some(parent_id) = req.parent_id {
            self.ensure_active_parent(parent_id).await?;
        }

        let after = self
            .departments
            .update(id, &req)
            .await?
            .ok_or_else(|| AppError::not_found("department"))?;
        info!(id = %id, "Department updated");

        self.audit
            .record(principal, AuditEvent::update(RESOURCE, id, &before, &after), meta)
            .await;

        Ok(after)
    }

    /// Soft delete; refused while active employees remain.
    #[instrument(skip(self, principal, meta))]
    pub async fn deactivate(
        &self,
        principal: &Principal,
        id: Uuid,
        meta: &RequestMeta,
    ) -> Result<Department> {
        let before = self.get(id).await?;

        if self.employees.count_active_in_department(id).await? > 0 {
            return Err(AppError::validation("has active employees"));
        }

        let after = self
            .departments
            .deactivate(id)
            .await?
            .ok_or_else(|| AppError::not_found("department"))?;
        info!(id = %id, "Department deactivated");

        self.audit
            .record(
                principal,
                AuditEvent::delete(RESOURCE, id, &before, Some(&after)),
                meta,
            )
            .await;

        Ok(after)
    }

    async fn ensure_active_head(&self, head_id: Uuid) -> Result<()> {
        match self.employees.find_by_id(head_id).await? {
            Some(e) if e.status.is_active() => Ok(()),
            Some(_) => Err(AppError::validation("department head is terminated")),
            None => Err(AppError::validation("department head does not exist")),
        }
    }

    async fn ensure_active_parent(&self, parent_id: Uuid) -> Result<()> {
        match self.departments.find_by_id(parent_id).await? {
            Some(d) if d.is_active => Ok(()),
            Some(_) => Err(AppError::validation("parent department is inactive")),
            None => Err(AppError::validation("parent department does not exist")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{audit::AuditAction, employee::CreateEmployeeRequest, Role};
    use crate::repository::MemoryStore;
    use chrono::NaiveDate;

    fn admin() -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            username: "admin".to_string(),
            role: Role::Admin,
            employee_id: None,
        }
    }

    fn service(store: &Arc<MemoryStore>) -> DepartmentService {
        DepartmentService::new(
            store.clone(),
            store.clone(),
            Arc::new(AuditService::new(store.clone())),
        )
    }

    fn dept(name: &str) -> CreateDepartmentRequest {
        CreateDepartmentRequest {
            name: name.to_string(),
            description: None,
            head_id: None,
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let meta = RequestMeta::default();

        svc.create(&admin(), dept("Finance"), &meta).await.unwrap();
        let err = svc.create(&admin(), dept("finance"), &meta).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.audit_entries().await.len(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_refused_with_active_employees() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let meta = RequestMeta::default();
        let finance = svc.create(&admin(), dept("Finance"), &meta).await.unwrap();

        EmployeeRepository::create(
            &*store,
            &CreateEmployeeRequest {
                employee_id: "EMP7".to_string(),
                first_name: "Ana".to_string(),
                last_name: "Ruiz".to_string(),
                email: "ana@corp.example".to_string(),
                phone: None,
                job_title: None,
                department_id: Some(finance.id),
                manager_id: None,
                hire_date: NaiveDate::from_ymd_opt(2022, 9, 1).unwrap(),
            },
        )
        .await
        .unwrap();

        let err = svc.deactivate(&admin(), finance.id, &meta).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "has active employees"));

        let entries = store.audit_entries().await;
        assert!(entries.iter().all(|e| e.action != AuditAction::Delete));
    }

    #[tokio::test]
    async fn test_parent_cannot_be_self() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let meta = RequestMeta::default();
        let ops = svc.create(&admin(), dept("Operations"), &meta).await.unwrap();

        let req = UpdateDepartmentRequest {
            parent_id: Some(ops.id),
            ..Default::default()
        };
        let err = svc.update(&admin(), ops.id, req, &meta).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
