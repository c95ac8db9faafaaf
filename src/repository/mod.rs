//! Database repository layer
//!
//! Handlers and services only see the traits below; `AppState` carries them
//! as `Arc<dyn …>` so tests can swap the Postgres implementations for
//! [`memory::MemoryStore`].

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    audit::{AuditLogEntry, AuditLogFilters},
    department::{CreateDepartmentRequest, Department, DepartmentFilters, UpdateDepartmentRequest},
    employee::{CreateEmployeeRequest, Employee, EmployeeFilters, UpdateEmployeeRequest},
    leave::{
        CreateLeavePolicyRequest, LeavePolicy, LeaveRequest, LeaveRequestFilters, LeaveTransition,
        NewLeaveRequest, UpdateLeavePolicyRequest,
    },
    pagination::{Page, PageRequest},
    payroll::{CreatePayrollRequest, PayrollFilters, PayrollRecord},
    user::{NewUser, User},
    ScopeFilter,
};

pub mod audit_repo;
pub mod department_repo;
pub mod employee_repo;
pub mod leave_repo;
pub mod memory;
pub mod payroll_repo;
pub mod user_repo;

pub use audit_repo::PgAuditRepository;
pub use department_repo::PgDepartmentRepository;
pub use employee_repo::PgEmployeeRepository;
pub use leave_repo::PgLeaveRepository;
pub use memory::MemoryStore;
pub use payroll_repo::PgPayrollRepository;
pub use user_repo::PgUserRepository;

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>>;
    async fn exists(&self, id: Uuid) -> Result<bool>;
    async fn find_by_employee_id(&self, employee_id: &str) -> Result<Option<Employee>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>>;
    /// One hop only: employees whose `manager_id` is `manager_id`.
    async fn direct_report_ids(&self, manager_id: Uuid) -> Result<Vec<Uuid>>;
    async fn count_active_direct_reports(&self, manager_id: Uuid) -> Result<i64>;
    async fn count_active_in_department(&self, department_id: Uuid) -> Result<i64>;
    async fn list(
        &self,
        filters: &EmployeeFilters,
        scope: &ScopeFilter,
        page: PageRequest,
    ) -> Result<Page<Employee>>;
    async fn create(&self, req: &CreateEmployeeRequest) -> Result<Employee>;
    async fn update(&self, id: Uuid, req: &UpdateEmployeeRequest) -> Result<Option<Employee>>;
    async fn terminate(&self, id: Uuid, date: NaiveDate) -> Result<Option<Employee>>;
}

#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Department>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Department>>;
    async fn list(&self, filters: &DepartmentFilters, page: PageRequest) -> Result<Page<Department>>;
    async fn create(&self, req: &CreateDepartmentRequest) -> Result<Department>;
    async fn update(&self, id: Uuid, req: &UpdateDepartmentRequest) -> Result<Option<Department>>;
    async fn deactivate(&self, id: Uuid) -> Result<Option<Department>>;
}

#[async_trait]
pub trait LeaveRepository: Send + Sync {
    async fn find_policy(&self, id: Uuid) -> Result<Option<LeavePolicy>>;
    async fn find_policy_by_name(&self, name: &str) -> Result<Option<LeavePolicy>>;
    async fn list_policies(&self, page: PageRequest) -> Result<Page<LeavePolicy>>;
    async fn create_policy(&self, req: &CreateLeavePolicyRequest) -> Result<LeavePolicy>;
    async fn update_policy(
        &self,
        id: Uuid,
        req: &UpdateLeavePolicyRequest,
    ) -> Result<Option<LeavePolicy>>;
    async fn deactivate_policy(&self, id: Uuid) -> Result<Option<LeavePolicy>>;
    async fn count_active_requests_for_policy(&self, policy_id: Uuid) -> Result<i64>;

    /// Owning employee of a request, without loading the row.
    async fn find_request_owner(&self, id: Uuid) -> Result<Option<Uuid>>;
    async fn find_request(&self, id: Uuid) -> Result<Option<LeaveRequest>>;
    async fn has_overlapping_request(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool>;
    async fn list_requests(
        &self,
        filters: &LeaveRequestFilters,
        scope: &ScopeFilter,
        page: PageRequest,
    ) -> Result<Page<LeaveRequest>>;
    async fn create_request(&self, req: &NewLeaveRequest) -> Result<LeaveRequest>;
    /// Applies the transition only while the request is still PENDING.
    async fn transition_pending(
        &self,
        id: Uuid,
        transition: &LeaveTransition,
    ) -> Result<Option<LeaveRequest>>;
}

#[async_trait]
pub trait PayrollRepository: Send + Sync {
    async fn find_owner(&self, id: Uuid) -> Result<Option<Uuid>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PayrollRecord>>;
    async fn find_for_period(&self, employee_id: Uuid, period: &str)
        -> Result<Option<PayrollRecord>>;
    async fn list(
        &self,
        filters: &PayrollFilters,
        scope: &ScopeFilter,
        page: PageRequest,
    ) -> Result<Page<PayrollRecord>>;
    async fn create(&self, req: &CreatePayrollRequest) -> Result<PayrollRecord>;
    /// DRAFT -> PAID; `None` if the record is missing or already paid.
    async fn mark_paid(&self, id: Uuid) -> Result<Option<PayrollRecord>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn list(&self, page: PageRequest) -> Result<Page<User>>;
    async fn create(&self, user: &NewUser) -> Result<User>;
    async fn touch_last_login(&self, id: Uuid) -> Result<()>;
}

/// Append-only store: no update, no delete.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, entry: &AuditLogEntry) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditLogEntry>>;
    async fn list(&self, filters: &AuditLogFilters, page: PageRequest) -> Result<Page<AuditLogEntry>>;
}

/// Map a unique-constraint violation to `Conflict`, pass everything else through.
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> crate::error::AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            crate::error::AppError::conflict(message)
        }
        _ => crate::error::AppError::Database(e),
    }
}

/// Data-access collaborators injected into the services
#[derive(Clone)]
pub struct Repositories {
    pub employees: Arc<dyn EmployeeRepository>,
    pub departments: Arc<dyn DepartmentRepository>,
    pub leave: Arc<dyn LeaveRepository>,
    pub payroll: Arc<dyn PayrollRepository>,
    pub users: Arc<dyn UserRepository>,
    pub audit: Arc<dyn AuditRepository>,
}

impl Repositories {
    pub fn postgres(db: PgPool) -> Self {
        Self {
            employees: Arc::new(PgEmployeeRepository::new(db.clone())),
            departments: Arc::new(PgDepartmentRepository::new(db.clone())),
            leave: Arc::new(PgLeaveRepository::new(db.clone())),
            payroll: Arc::new(PgPayrollRepository::new(db.clone())),
            users: Arc::new(PgUserRepository::new(db.clone())),
            audit: Arc::new(PgAuditRepository::new(db)),
        }
    }

    /// Every collaborator backed by the same in-memory store.
    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            employees: store.clone(),
            departments: store.clone(),
            leave: store.clone(),
            payroll: store.clone(),
            users: store.clone(),
            audit: store,
        }
    }
}
