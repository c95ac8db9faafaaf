//! 员工服务

use crate::{
    error::{AppError, Result},
    models::{
        audit::RequestMeta,
        employee::*,
        pagination::{Page, PageRequest},
        Principal,
    },
    repository::{DepartmentRepository, EmployeeRepository},
    services::{
        audit_service::{AuditEvent, AuditService},
        scope_service::ScopeService,
    },
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

const RESOURCE: &str = "employees";

pub struct EmployeeService {
    employees: Arc<dyn EmployeeRepository>,
    departments: Arc<dyn DepartmentRepository>,
    scope: Arc<ScopeService>,
    audit: Arc<AuditService>,
}

impl EmployeeService {
    pub fn new(
        employees: Arc<dyn EmployeeRepository>,
        departments: Arc<dyn DepartmentRepository>,
        scope: Arc<ScopeService>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            employees,
            departments,
            scope,
            audit,
        }
    }

    /// Scoped list. An explicit `id` filter outside scope is refused.
    pub async fn list(
        &self,
        principal: &Principal,
        filters: &EmployeeFilters,
        page: PageRequest,
    ) -> Result<Page<Employee>> {
        let scope = self.scope.build_scope_filter(principal, filters.id).await?;
        self.employees.list(filters, &scope, page).await
    }

    /// Scope check on the id first, then the fetch.
    #[instrument(skip(self, principal, meta), fields(user_id = %principal.user_id))]
    pub async fn get(&self, principal: &Principal, id: Uuid, meta: &RequestMeta) -> Result<Employee> {
        self.scope.authorize_employee(principal, id).await?;

        let employee = self
            .employees
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("employee"))?;

        if principal.role.sees_all_records() && !principal.is_self(id) {
            self.audit
                .record(principal, AuditEvent::read(RESOURCE, id, &employee), meta)
                .await;
        }

        Ok(employee)
    }

    pub async fn direct_reports(
        &self,
        principal: &Principal,
        id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Employee>> {
        self.scope.authorize_employee(principal, id).await?;
        if !self.employees.exists(id).await? {
            return Err(AppError::not_found("employee"));
        }

        let scope = self.scope.resolve_scope(principal).await?;
        let filters = EmployeeFilters {
            manager_id: Some(id),
            ..Default::default()
        };
        self.employees.list(&filters, &scope, page).await
    }

    #[instrument(skip(self, principal, req, meta), fields(employee_id = %req.employee_id))]
    pub async fn create(
        &self,
        principal: &Principal,
        req: CreateEmployeeRequest,
        meta: &RequestMeta,
    ) -> Result<Employee> {
        req.validate()?;

        if self.employees.find_by_employee_id(&req.employee_id).await?.is_some() {
            return Err(AppError::conflict("employee_id already exists"));
        }
        if self.employees.find_by_email(&req.email).await?.is_some() {
            return Err(AppError::conflict("email already exists"));
        }
        if let Some(department_id) = req.department_id {
            self.ensure_active_department(department_id).await?;
        }
        if let Some(manager_id) = req.manager_id {
            self.ensure_active_manager(manager_id).await?;
        }

        let employee = self.employees.create(&req).await?;
        info!(id = %employee.id, "Employee created");

        self.audit
            .record(principal, AuditEvent::create(RESOURCE, employee.id, &employee), meta)
            .await;

        Ok(employee)
    }

    #[instrument(skip(self, principal, req, meta))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        req: UpdateEmployeeRequest,
        meta: &RequestMeta,
    ) -> Result<Employee> {
        req.validate()?;

        let before = self
            .employees
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("employee"))?;

        if before.status == EmploymentStatus::Terminated {
            return Err(AppError::validation("employee is terminated"));
        }
        if req.status == Some(EmploymentStatus::Terminated) {
            return Err(AppError::validation(
                "status TERMINATED is set by deleting the employee",
            ));
        }
        if req.manager_id == Some(Some(id)) {
            return Err(AppError::validation("employee cannot be their own manager"));
        }
        if let Some(email) = &req.email {
            if let Some(other) = self.employees.find_by_email(email).await? {
                if other.id != id {
                    return Err(AppError::conflict("email already exists"));
                }
            }
        }
        if let Some(Some(department_id)) = req.department_id {
            self.ensure_active_department(department_id).await?;
        }
        if let Some(Some(manager_id)) = req.manager_id {
            self.ensure_active_manager(manager_id).await?;
        }

        let after = self
            .employees
            .update(id, &req)
            .await?
            .ok_or_else(|| AppError::not_found("employee"))?;
        info!(id = %id, "Employee updated");

        self.audit
            .record(principal, AuditEvent::update(RESOURCE, id, &before, &after), meta)
            .await;

        Ok(after)
    }

    /// Termination: status TERMINATED with today's date, never a hard delete.
    #[instrument(skip(self, principal, meta))]
    pub async fn terminate(
        &self,
        principal: &Principal,
        id: Uuid,
        meta: &RequestMeta,
    ) -> Result<Employee> {
        let before = self
            .employees
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("employee"))?;

        if !before.status.is_active() {
            return Err(AppError::validation("employee is already terminated"));
        }
        if self.employees.count_active_direct_reports(id).await? > 0 {
            return Err(AppError::validation("has active subordinates"));
        }

        let after = self
            .employees
            .terminate(id, Utc::now().date_naive())
            .await?
            .ok_or_else(|| AppError::validation("employee is already terminated"))?;
        info!(id = %id, "Employee terminated");

        self.audit
            .record(
                principal,
                AuditEvent::delete(RESOURCE, id, &before, Some(&after)),
                meta,
            )
            .await;

        Ok(after)
    }

    async fn ensure_active_department(&self, department_id: Uuid) -> Result<()> {
        match self.departments.find_by_id(department_id).await? {
            Some(d) if d.is_active => Ok(()),
            Some(_) => Err(AppError::validation("department is inactive")),
            None => Err(AppError::validation("department does not exist")),
        }
    }

    async fn ensure_active_manager(&self, manager_id: Uuid) -> Result<()> {
        match self.employees.find_by_id(manager_id).await? {
            Some(m) if m.status.is_active() => Ok(()),
            Some(_) => Err(AppError::validation("manager is terminated")),
            None => Err(AppError::validation("manager does not exist")),
        }
    }
}
