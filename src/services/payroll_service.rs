//! 薪资服务

use crate::{
    error::{AppError, Result},
    models::{
        audit::RequestMeta,
        pagination::{Page, PageRequest},
        payroll::*,
        Principal,
    },
    repository::{EmployeeRepository, PayrollRepository},
    services::{
        audit_service::{AuditEvent, AuditService},
        scope_service::ScopeService,
    },
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

const RESOURCE: &str = "payroll";

pub struct PayrollService {
    payroll: Arc<dyn PayrollRepository>,
    employees: Arc<dyn EmployeeRepository>,
    scope: Arc<ScopeService>,
    audit: Arc<AuditService>,
}

impl PayrollService {
    pub fn new(
        payroll: Arc<dyn PayrollRepository>,
        employees: Arc<dyn EmployeeRepository>,
        scope: Arc<ScopeService>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            payroll,
            employees,
            scope,
            audit,
        }
    }

    pub async fn list(
        &self,
        principal: &Principal,
        filters: &PayrollFilters,
        page: PageRequest,
    ) -> Result<Page<PayrollRecord>> {
        if let Some(period) = &filters.period {
            validate_period(period)
                .map_err(|_| AppError::validation("period must be formatted as YYYY-MM"))?;
        }
        let scope = self
            .scope
            .build_scope_filter(principal, filters.employee_id)
            .await?;
        self.payroll.list(filters, &scope, page).await
    }

    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<PayrollRecord> {
        let owner = self
            .payroll
            .find_owner(id)
            .await?
            .ok_or_else(|| AppError::not_found("payroll record"))?;
        self.scope.authorize_employee(principal, owner).await?;

        self.find(id).await
    }

    #[instrument(skip(self, principal, req, meta), fields(employee_id = %req.employee_id, period = %req.period))]
    pub async fn create(
        &self,
        principal: &Principal,
        req: CreatePayrollRequest,
        meta: &RequestMeta,
    ) -> Result<PayrollRecord> {
        req.validate()?;

        let employee = self
            .employees
            .find_by_id(req.employee_id)
            .await?
            .ok_or_else(|| AppError::not_found("employee"))?;
        if !employee.status.is_active() {
            return Err(AppError::validation("employee is terminated"));
        }
        if self
            .payroll
            .find_for_period(req.employee_id, &req.period)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "payroll record already exists for this period",
            ));
        }

        let record = self.payroll.create(&req).await?;
        info!(id = %record.id, net_pay = record.net_pay, "Payroll record created");

        self.audit
            .record(principal, AuditEvent::create(RESOURCE, record.id, &record), meta)
            .await;

        Ok(record)
    }

    #[instrument(skip(self, principal, meta))]
    pub async fn mark_paid(&self, principal: &Principal, id: Uuid, meta: &RequestMeta) -> Result<PayrollRecord> {
        let before = self.find(id).await?;
        if before.status != PayrollStatus::Draft {
            return Err(AppError::validation("payroll record is already paid"));
        }

        let after = self
            .payroll
            .mark_paid(id)
            .await?
            .ok_or_else(|| AppError::validation("payroll record is already paid"))?;
        info!(id = %id, "Payroll record marked paid");

        self.audit
            .record(principal, AuditEvent::update(RESOURCE, id, &before, &after), meta)
            .await;

        Ok(after)
    }

    async fn find(&self, id: Uuid) -> Result<PayrollRecord> {
        self.payroll
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("payroll record"))
    }
}
