//! In-memory repositories
//!
//! A single store implementing every repository trait with the same filter,
//! scope and uniqueness rules as the Postgres implementations. Used by the
//! integration tests and for running the router without a database.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::{cmp::Ordering, collections::HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AuditRepository, DepartmentRepository, EmployeeRepository, LeaveRepository,
    PayrollRepository, UserRepository,
};
use crate::{
    error::{AppError, Result},
    models::{
        audit::{AuditLogEntry, AuditLogFilters},
        department::*,
        employee::*,
        leave::*,
        pagination::{Page, PageRequest},
        payroll::*,
        user::{NewUser, User},
        ScopeFilter,
    },
};

#[derive(Default)]
struct Tables {
    employees: HashMap<Uuid, Employee>,
    departments: HashMap<Uuid, Department>,
    policies: HashMap<Uuid, LeavePolicy>,
    leave_requests: HashMap<Uuid, LeaveRequest>,
    payroll: HashMap<Uuid, PayrollRecord>,
    users: HashMap<Uuid, User>,
    audit: Vec<AuditLogEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the audit trail in insertion order.
    pub async fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.tables.read().await.audit.clone()
    }

    pub async fn employee(&self, id: Uuid) -> Option<Employee> {
        self.tables.read().await.employees.get(&id).cloned()
    }
}

/// Sort, then slice out the requested page.
fn paginate<T>(
    mut items: Vec<T>,
    page: PageRequest,
    compare: impl FnMut(&T, &T) -> Ordering,
) -> Page<T> {
    items.sort_by(compare);
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Page { items, total }
}

#[async_trait]
impl EmployeeRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>> {
        Ok(self.tables.read().await.employees.get(&id).cloned())
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.read().await.employees.contains_key(&id))
    }

    async fn find_by_employee_id(&self, employee_id: &str) -> Result<Option<Employee>> {
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .values()
            .find(|e| e.employee_id == employee_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>> {
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .values()
            .find(|e| e.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn direct_report_ids(&self, manager_id: Uuid) -> Result<Vec<Uuid>> {
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .values()
            .filter(|e| e.manager_id == Some(manager_id))
            .map(|e| e.id)
            .collect())
    }

    async fn count_active_direct_reports(&self, manager_id: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .values()
            .filter(|e| e.manager_id == Some(manager_id) && e.status.is_active())
            .count() as i64)
    }

    async fn count_active_in_department(&self, department_id: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .values()
            .filter(|e| e.department_id == Some(department_id) && e.status.is_active())
            .count() as i64)
    }

    async fn list(
        &self,
        filters: &EmployeeFilters,
        scope: &ScopeFilter,
        page: PageRequest,
    ) -> Result<Page<Employee>> {
        let tables = self.tables.read().await;
        let items = tables
            .employees
            .values()
            .filter(|e| filters.matches(e) && scope.permits(e.id))
            .cloned()
            .collect();
        Ok(paginate(items, page, |a: &Employee, b: &Employee| {
            b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
        }))
    }

    async fn create(&self, req: &CreateEmployeeRequest) -> Result<Employee> {
        let mut tables = self.tables.write().await;
        if tables.employees.values().any(|e| {
            e.employee_id == req.employee_id || e.email.eq_ignore_ascii_case(&req.email)
        }) {
            return Err(AppError::conflict("employee_id or email already exists"));
        }

        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4(),
            employee_id: req.employee_id.clone(),
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
            email: req.email.clone(),
            phone: req.phone.clone(),
            job_title: req.job_title.clone(),
            department_id: req.department_id,
            manager_id: req.manager_id,
            status: EmploymentStatus::Active,
            hire_date: req.hire_date,
            termination_date: None,
            created_at: now,
            updated_at: now,
        };
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn update(&self, id: Uuid, req: &UpdateEmployeeRequest) -> Result<Option<Employee>> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &req.email {
            if tables
                .employees
                .values()
                .any(|e| e.id != id && e.email.eq_ignore_ascii_case(email))
            {
                return Err(AppError::conflict("email already exists"));
            }
        }

        let Some(employee) = tables.employees.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = &req.first_name {
            employee.first_name = v.clone();
        }
        if let Some(v) = &req.last_name {
            employee.last_name = v.clone();
        }
        if let Some(v) = &req.email {
            employee.email = v.clone();
        }
        if req.phone.is_some() {
            employee.phone = req.phone.clone();
        }
        if req.job_title.is_some() {
            employee.job_title = req.job_title.clone();
        }
        if let Some(v) = req.department_id {
            employee.department_id = v;
        }
        if let Some(v) = req.manager_id {
            employee.manager_id = v;
        }
        if let Some(status) = req.status {
            employee.status = status;
        }
        employee.updated_at = Utc::now();
        Ok(Some(employee.clone()))
    }

    async fn terminate(&self, id: Uuid, date: NaiveDate) -> Result<Option<Employee>> {
        let mut tables = self.tables.write().await;
        match tables.employees.get_mut(&id) {
            Some(employee) if employee.status.is_active() => {
                employee.status = EmploymentStatus::Terminated;
                employee.termination_date = Some(date);
                employee.updated_at = Utc::now();
                Ok(Some(employee.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl DepartmentRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Department>> {
        Ok(self.tables.read().await.departments.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Department>> {
        let tables = self.tables.read().await;
        Ok(tables
            .departments
            .values()
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn list(&self, filters: &DepartmentFilters, page: PageRequest) -> Result<Page<Department>> {
        let tables = self.tables.read().await;
        let items = tables
            .departments
            .values()
            .filter(|d| filters.matches(d))
            .cloned()
            .collect();
        Ok(paginate(items, page, |a: &Department, b: &Department| {
            a.name.cmp(&b.name)
        }))
    }

    async fn create(&self, req: &CreateDepartmentRequest) -> Result<Department> {
        let mut tables = self.tables.write().await;
        if tables
            .departments
            .values()
            .any(|d| d.name.eq_ignore_ascii_case(&req.name))
        {
            return Err(AppError::conflict("department name already exists"));
        }

        let now = Utc::now();
        let department = Department {
            id: Uuid::new_v4(),
            name: req.name.clone(),
            description: req.description.clone(),
            head_id: req.head_id,
            parent_id: req.parent_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.departments.insert(department.id, department.clone());
        Ok(department)
    }

    async fn update(&self, id: Uuid, req: &UpdateDepartmentRequest) -> Result<Option<Department>> {
        let mut tables = self.tables.write().await;
        if let Some(name) = &req.name {
            if tables
                .departments
                .values()
                .any(|d| d.id != id && d.name.eq_ignore_ascii_case(name))
            {
                return Err(AppError::conflict("department name already exists"));
            }
        }

        let Some(department) = tables.departments.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = &req.name {
            department.name = v.clone();
        }
        if req.description.is_some() {
            department.description = req.description.clone();
        }
        if req.head_id.is_some() {
            department.head_id = req.head_id;
        }
        if req.parent_id.is_some() {
            department.parent_id = req.parent_id;
        }
        if let Some(active) = req.is_active {
            department.is_active = active;
        }
        department.updated_at = Utc::now();
        Ok(Some(department.clone()))
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<Department>> {
        let mut tables = self.tables.write().await;
        Ok(tables.departments.get_mut(&id).map(|department| {
            department.is_active = false;
            department.updated_at = Utc::now();
            department.clone()
        }))
    }
}

#[async_trait]
impl LeaveRepository for MemoryStore {
    async fn find_policy(&self, id: Uuid) -> Result<Option<LeavePolicy>> {
        Ok(self.tables.read().await.policies.get(&id).cloned())
    }

    async fn find_policy_by_name(&self, name: &str) -> Result<Option<LeavePolicy>> {
        let tables = self.tables.read().await;
        Ok(tables
            .policies
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn list_policies(&self, page: PageRequest) -> Result<Page<LeavePolicy>> {
        let tables = self.tables.read().await;
        let items = tables.policies.values().cloned().collect();
        Ok(paginate(items, page, |a: &LeavePolicy, b: &LeavePolicy| {
            a.name.cmp(&b.name)
        }))
    }

    async fn create_policy(&self, req: &CreateLeavePolicyRequest) -> Result<LeavePolicy> {
        let mut tables = self.tables.write().await;
        if tables
            .policies
            .values()
            .any(|p| p.name.eq_ignore_ascii_case(&req.name))
        {
            return Err(AppError::conflict("leave policy name already exists"));
        }

        let now = Utc::now();
        let policy = LeavePolicy {
            id: Uuid::new_v4(),
            name: req.name.clone(),
            description: req.description.clone(),
            days_per_year: req.days_per_year,
            max_consecutive_days: req.max_consecutive_days,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.policies.insert(policy.id, policy.clone());
        Ok(policy)
    }

    async fn update_policy(
        &self,
        id: Uuid,
        req: &UpdateLeavePolicyRequest,
    ) -> Result<Option<LeavePolicy>> {
        let mut tables = self.tables.write().await;
        if let Some(name) = &req.name {
            if tables
                .policies
                .values()
                .any(|p| p.id != id && p.name.eq_ignore_ascii_case(name))
            {
                return Err(AppError::conflict("leave policy name already exists"));
            }
        }

        let Some(policy) = tables.policies.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = &req.name {
            policy.name = v.clone();
        }
        if req.description.is_some() {
            policy.description = req.description.clone();
        }
        if let Some(v) = req.days_per_year {
            policy.days_per_year = v;
        }
        if let Some(v) = req.max_consecutive_days {
            policy.max_consecutive_days = v;
        }
        if let Some(v) = req.is_active {
            policy.is_active = v;
        }
        policy.updated_at = Utc::now();
        Ok(Some(policy.clone()))
    }

    async fn deactivate_policy(&self, id: Uuid) -> Result<Option<LeavePolicy>> {
        let mut tables = self.tables.write().await;
        Ok(tables.policies.get_mut(&id).map(|policy| {
            policy.is_active = false;
            policy.updated_at = Utc::now();
            policy.clone()
        }))
    }

    async fn count_active_requests_for_policy(&self, policy_id: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .leave_requests
            .values()
            .filter(|r| r.leave_policy_id == policy_id && r.status.is_active())
            .count() as i64)
    }

    async fn find_request_owner(&self, id: Uuid) -> Result<Option<Uuid>> {
        let tables = self.tables.read().await;
        Ok(tables.leave_requests.get(&id).map(|r| r.employee_id))
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
        Ok(self.tables.read().await.leave_requests.get(&id).cloned())
    }

    async fn has_overlapping_request(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.leave_requests.values().any(|r| {
            r.employee_id == employee_id && r.status.is_active() && r.overlaps(start, end)
        }))
    }

    async fn list_requests(
        &self,
        filters: &LeaveRequestFilters,
        scope: &ScopeFilter,
        page: PageRequest,
    ) -> Result<Page<LeaveRequest>> {
        let tables = self.tables.read().await;
        let items = tables
            .leave_requests
            .values()
            .filter(|r| filters.matches(r) && scope.permits(r.employee_id))
            .cloned()
            .collect();
        Ok(paginate(items, page, |a: &LeaveRequest, b: &LeaveRequest| {
            b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
        }))
    }

    async fn create_request(&self, req: &NewLeaveRequest) -> Result<LeaveRequest> {
        let now = Utc::now();
        let request = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: req.employee_id,
            leave_policy_id: req.leave_policy_id,
            start_date: req.start_date,
            end_date: req.end_date,
            days: req.days,
            reason: req.reason.clone(),
            status: LeaveStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_note: None,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .leave_requests
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn transition_pending(
        &self,
        id: Uuid,
        transition: &LeaveTransition,
    ) -> Result<Option<LeaveRequest>> {
        let mut tables = self.tables.write().await;
        match tables.leave_requests.get_mut(&id) {
            Some(request) if request.status == LeaveStatus::Pending => {
                let now = Utc::now();
                request.status = transition.status;
                if transition.reviewed_by.is_some() {
                    request.reviewed_by = transition.reviewed_by;
                    request.reviewed_at = Some(now);
                }
                if transition.note.is_some() {
                    request.review_note = transition.note.clone();
                }
                request.updated_at = now;
                Ok(Some(request.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl PayrollRepository for MemoryStore {
    async fn find_owner(&self, id: Uuid) -> Result<Option<Uuid>> {
        Ok(self.tables.read().await.payroll.get(&id).map(|r| r.employee_id))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PayrollRecord>> {
        Ok(self.tables.read().await.payroll.get(&id).cloned())
    }

    async fn find_for_period(
        &self,
        employee_id: Uuid,
        period: &str,
    ) -> Result<Option<PayrollRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .payroll
            .values()
            .find(|r| r.employee_id == employee_id && r.period == period)
            .cloned())
    }

    async fn list(
        &self,
        filters: &PayrollFilters,
        scope: &ScopeFilter,
        page: PageRequest,
    ) -> Result<Page<PayrollRecord>> {
        let tables = self.tables.read().await;
        let items = tables
            .payroll
            .values()
            .filter(|r| filters.matches(r) && scope.permits(r.employee_id))
            .cloned()
            .collect();
        Ok(paginate(items, page, |a: &PayrollRecord, b: &PayrollRecord| {
            (&b.period, b.created_at)
                .cmp(&(&a.period, a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        }))
    }

    async fn create(&self, req: &CreatePayrollRequest) -> Result<PayrollRecord> {
        let mut tables = self.tables.write().await;
        if tables
            .payroll
            .values()
            .any(|r| r.employee_id == req.employee_id && r.period == req.period)
        {
            return Err(AppError::conflict(
                "payroll record already exists for this period",
            ));
        }

        let now = Utc::now();
        let record = PayrollRecord {
            id: Uuid::new_v4(),
            employee_id: req.employee_id,
            period: req.period.clone(),
            gross_pay: req.gross_pay,
            deductions: req.deductions,
            net_pay: req.net_pay(),
            status: PayrollStatus::Draft,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.payroll.insert(record.id, record.clone());
        Ok(record)
    }

    async fn mark_paid(&self, id: Uuid) -> Result<Option<PayrollRecord>> {
        let mut tables = self.tables.write().await;
        match tables.payroll.get_mut(&id) {
            Some(record) if record.status == PayrollStatus::Draft => {
                let now = Utc::now();
                record.status = PayrollStatus::Paid;
                record.paid_at = Some(now);
                record.updated_at = now;
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>> {
        let tables = self.tables.read().await;
        let items = tables.users.values().cloned().collect();
        Ok(paginate(items, page, |a: &User, b: &User| {
            b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
        }))
    }

    async fn create(&self, user: &NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(AppError::conflict("username already exists"));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            employee_id: user.employee_id,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<()> {
        if let Some(user) = self.tables.write().await.users.get_mut(&id) {
            let now = Utc::now();
            user.last_login_at = Some(now);
            user.updated_at = now;
        }
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for MemoryStore {
    async fn append(&self, entry: &AuditLogEntry) -> Result<()> {
        self.tables.write().await.audit.push(entry.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditLogEntry>> {
        let tables = self.tables.read().await;
        Ok(tables.audit.iter().find(|e| e.id == id).cloned())
    }

    async fn list(&self, filters: &AuditLogFilters, page: PageRequest) -> Result<Page<AuditLogEntry>> {
        let tables = self.tables.read().await;
        let items = tables
            .audit
            .iter()
            .filter(|e| filters.matches(e))
            .cloned()
            .collect();
        Ok(paginate(items, page, |a: &AuditLogEntry, b: &AuditLogEntry| {
            b.occurred_at.cmp(&a.occurred_at).then_with(|| a.id.cmp(&b.id))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::leave::leave_days;

    fn employee_req(code: &str, manager_id: Option<Uuid>) -> CreateEmployeeRequest {
        CreateEmployeeRequest {
            employee_id: code.to_string(),
            first_name: "Test".to_string(),
            last_name: code.to_string(),
            email: format!("{}@example.com", code.to_lowercase()),
            phone: None,
            job_title: None,
            department_id: None,
            manager_id,
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    fn page() -> PageRequest {
        PageRequest { page: 1, limit: 50 }
    }

    #[tokio::test]
    async fn test_employee_uniqueness() {
        let store = MemoryStore::new();
        EmployeeRepository::create(&store, &employee_req("EMP1", None))
            .await
            .unwrap();

        let err = EmployeeRepository::create(&store, &employee_req("EMP1", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_respects_scope() {
        let store = MemoryStore::new();
        let manager = EmployeeRepository::create(&store, &employee_req("M1", None))
            .await
            .unwrap();
        let report = EmployeeRepository::create(&store, &employee_req("E1", Some(manager.id)))
            .await
            .unwrap();
        EmployeeRepository::create(&store, &employee_req("E3", None))
            .await
            .unwrap();

        let scope = ScopeFilter::only([manager.id, report.id]);
        let listed = EmployeeRepository::list(&store, &EmployeeFilters::default(), &scope, page())
            .await
            .unwrap();
        assert_eq!(listed.total, 2);
        assert!(listed.items.iter().all(|e| scope.permits(e.id)));

        let reports = store.direct_report_ids(manager.id).await.unwrap();
        assert_eq!(reports, vec![report.id]);
    }

    #[tokio::test]
    async fn test_terminate_only_once() {
        let store = MemoryStore::new();
        let e = EmployeeRepository::create(&store, &employee_req("EMP2", None))
            .await
            .unwrap();
        let today = Utc::now().date_naive();

        assert!(store.terminate(e.id, today).await.unwrap().is_some());
        assert!(store.terminate(e.id, today).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transition_requires_pending() {
        let store = MemoryStore::new();
        let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let request = store
            .create_request(&NewLeaveRequest {
                employee_id: Uuid::new_v4(),
                leave_policy_id: Uuid::new_v4(),
                start_date: start,
                end_date: end,
                days: leave_days(start, end).unwrap(),
                reason: None,
            })
            .await
            .unwrap();

        let approve = LeaveTransition {
            status: LeaveStatus::Approved,
            reviewed_by: Some(Uuid::new_v4()),
            note: None,
        };
        let approved = store.transition_pending(request.id, &approve).await.unwrap();
        assert_eq!(approved.map(|r| r.status), Some(LeaveStatus::Approved));
        assert!(store
            .transition_pending(request.id, &approve)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_pagination_window() {
        let store = MemoryStore::new();
        for i in 0..5 {
            EmployeeRepository::create(&store, &employee_req(&format!("P{}", i), None))
                .await
                .unwrap();
        }

        let second = EmployeeRepository::list(
            &store,
            &EmployeeFilters::default(),
            &ScopeFilter::All,
            PageRequest { page: 2, limit: 2 },
        )
        .await
        .unwrap();
        assert_eq!(second.total, 5);
        assert_eq!(second.items.len(), 2);
    }

    #[tokio::test]
    async fn test_equal_timestamps_order_by_id() {
        let store = MemoryStore::new();
        for code in ["T1", "T2", "T3"] {
            EmployeeRepository::create(&store, &employee_req(code, None))
                .await
                .unwrap();
        }
        let stamp = Utc::now();
        for employee in store.tables.write().await.employees.values_mut() {
            employee.created_at = stamp;
        }

        let listed = EmployeeRepository::list(
            &store,
            &EmployeeFilters::default(),
            &ScopeFilter::All,
            page(),
        )
        .await
        .unwrap();
        let ids: Vec<Uuid> = listed.items.iter().map(|e| e.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn test_update_clears_manager() {
        let store = MemoryStore::new();
        let manager = EmployeeRepository::create(&store, &employee_req("M2", None))
            .await
            .unwrap();
        let report = EmployeeRepository::create(&store, &employee_req("E4", Some(manager.id)))
            .await
            .unwrap();

        let untouched = EmployeeRepository::update(&store, report.id, &UpdateEmployeeRequest::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.manager_id, Some(manager.id));

        let cleared = EmployeeRepository::update(
            &store,
            report.id,
            &UpdateEmployeeRequest {
                manager_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(cleared.manager_id, None);
    }

    #[tokio::test]
    async fn test_deactivated_policy_is_kept() {
        let store = MemoryStore::new();
        let policy = store
            .create_policy(&CreateLeavePolicyRequest {
                name: "Annual".to_string(),
                description: None,
                days_per_year: 20,
                max_consecutive_days: 10,
            })
            .await
            .unwrap();

        let deactivated = store.deactivate_policy(policy.id).await.unwrap().unwrap();
        assert!(!deactivated.is_active);
        assert!(store.find_policy(policy.id).await.unwrap().is_some());
        assert!(store.deactivate_policy(Uuid::new_v4()).await.unwrap().is_none());
    }
}
