//! 请假服务：假期策略与请假申请

use crate::{
    error::{AppError, Result},
    models::{
        audit::RequestMeta,
        leave::*,
        pagination::{Page, PageRequest},
        Principal,
    },
    repository::{EmployeeRepository, LeaveRepository},
    services::{
        audit_service::{AuditEvent, AuditService},
        scope_service::ScopeService,
    },
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

const POLICY_RESOURCE: &str = "leave_policies";
const REQUEST_RESOURCE: &str = "leave_requests";

pub struct LeaveService {
    leave: Arc<dyn LeaveRepository>,
    employees: Arc<dyn EmployeeRepository>,
    scope: Arc<ScopeService>,
    audit: Arc<AuditService>,
}

impl LeaveService {
    pub fn new(
        leave: Arc<dyn LeaveRepository>,
        employees: Arc<dyn EmployeeRepository>,
        scope: Arc<ScopeService>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            leave,
            employees,
            scope,
            audit,
        }
    }

    // ==================== Policies ====================

    pub async fn list_policies(&self, page: PageRequest) -> Result<Page<LeavePolicy>> {
        self.leave.list_policies(page).await
    }

    #[instrument(skip(self, principal, req, meta), fields(name = %req.name))]
    pub async fn create_policy(
        &self,
        principal: &Principal,
        req: CreateLeavePolicyRequest,
        meta: &RequestMeta,
    ) -> Result<LeavePolicy> {
        req.validate()?;

        if self.leave.find_policy_by_name(&req.name).await?.is_some() {
            return Err(AppError::conflict("leave policy name already exists"));
        }

        let policy = self.leave.create_policy(&req).await?;
        info!(id = %policy.id, "Leave policy created");

        self.audit
            .record(
                principal,
                AuditEvent::create(POLICY_RESOURCE, policy.id, &policy),
                meta,
            )
            .await;

        Ok(policy)
    }

    #[instrument(skip(self, principal, req, meta))]
    pub async fn update_policy(
        &self,
        principal: &Principal,
        id: Uuid,
        req: UpdateLeavePolicyRequest,
        meta: &RequestMeta,
    ) -> Result<LeavePolicy> {
        req.validate()?;

        let before = self.find_policy(id).await?;
        if let Some(name) = &req.name {
            if let Some(other) = self.leave.find_policy_by_name(name).await? {
                if other.id != id {
                    return Err(AppError::conflict("leave policy name already exists"));
                }
            }
        }

        let after = self
            .leave
            .update_policy(id, &req)
            .await?
            .ok_or_else(|| AppError::not_found("leave policy"))?;
        info!(id = %id, "Leave policy updated");

        self.audit
            .record(
                principal,
                AuditEvent::update(POLICY_RESOURCE, id, &before, &after),
                meta,
            )
            .await;

        Ok(after)
    }

    /// Soft delete. Past requests keep pointing at the policy.
    #[instrument(skip(self, principal, meta))]
    pub async fn delete_policy(
        &self,
        principal: &Principal,
        id: Uuid,
        meta: &RequestMeta,
    ) -> Result<LeavePolicy> {
        let before = self.find_policy(id).await?;

        if self.leave.count_active_requests_for_policy(id).await? > 0 {
            return Err(AppError::validation("has active leave requests"));
        }
        let after = self
            .leave
            .deactivate_policy(id)
            .await?
            .ok_or_else(|| AppError::not_found("leave policy"))?;
        info!(id = %id, "Leave policy deactivated");

        self.audit
            .record(
                principal,
                AuditEvent::delete(POLICY_RESOURCE, id, &before, Some(&after)),
                meta,
            )
            .await;

        Ok(after)
    }

    async fn find_policy(&self, id: Uuid) -> Result<LeavePolicy> {
        self.leave
            .find_policy(id)
            .await?
            .ok_or_else(|| AppError::not_found("leave policy"))
    }

    // ==================== Requests ====================

    pub async fn list_requests(
        &self,
        principal: &Principal,
        filters: &LeaveRequestFilters,
        page: PageRequest,
    ) -> Result<Page<LeaveRequest>> {
        let scope = self
            .scope
            .build_scope_filter(principal, filters.employee_id)
            .await?;
        self.leave.list_requests(filters, &scope, page).await
    }

    /// Owner lookup and scope check, then the full fetch.
    pub async fn get_request(&self, principal: &Principal, id: Uuid) -> Result<LeaveRequest> {
        let owner = self.request_owner(id).await?;
        self.scope.authorize_employee(principal, owner).await?;
        self.find_request(id).await
    }

    #[instrument(skip(self, principal, req, meta), fields(user_id = %principal.user_id))]
    pub async fn create_request(
        &self,
        principal: &Principal,
        req: CreateLeaveRequest,
        meta: &RequestMeta,
    ) -> Result<LeaveRequest> {
        req.validate()?;

        let employee_id = req
            .employee_id
            .or(principal.employee_id)
            .ok_or_else(|| AppError::validation("employee_id is required"))?;
        self.scope
            .require_self_unless_privileged(principal, employee_id)?;

        match self.employees.find_by_id(employee_id).await? {
            Some(e) if e.status.is_active() => {}
            Some(_) => return Err(AppError::validation("employee is terminated")),
            None => return Err(AppError::not_found("employee")),
        }

        let policy = match self.leave.find_policy(req.leave_policy_id).await? {
            Some(p) if p.is_active => p,
            Some(_) => return Err(AppError::validation("leave policy is inactive")),
            None => return Err(AppError::validation("leave policy does not exist")),
        };

        let days = leave_days(req.start_date, req.end_date)
            .ok_or_else(|| AppError::validation("end_date must not be before start_date"))?;
        if days > policy.max_consecutive_days {
            return Err(AppError::Validation(format!(
                "request spans {} days, policy allows at most {}",
                days, policy.max_consecutive_days
            )));
        }
        if self
            .leave
            .has_overlapping_request(employee_id, req.start_date, req.end_date)
            .await?
        {
            return Err(AppError::validation(
                "overlaps an existing pending or approved leave request",
            ));
        }

        let request = self
            .leave
            .create_request(&NewLeaveRequest {
                employee_id,
                leave_policy_id: policy.id,
                start_date: req.start_date,
                end_date: req.end_date,
                days,
                reason: req.reason,
            })
            .await?;
        info!(id = %request.id, days, "Leave request filed");

        self.audit
            .record(
                principal,
                AuditEvent::create(REQUEST_RESOURCE, request.id, &request),
                meta,
            )
            .await;

        Ok(request)
    }

    /// Approve or reject. Reviewers act within their scope and never on
    /// their own request.
    #[instrument(skip(self, principal, review, meta))]
    pub async fn review(
        &self,
        principal: &Principal,
        id: Uuid,
        decision: LeaveStatus,
        review: ReviewLeaveRequest,
        meta: &RequestMeta,
    ) -> Result<LeaveRequest> {
        review.validate()?;
        if !matches!(decision, LeaveStatus::Approved | LeaveStatus::Rejected) {
            return Err(AppError::internal_error("review decision must be APPROVED or REJECTED"));
        }

        let owner = self.request_owner(id).await?;
        self.scope.authorize_employee(principal, owner).await?;
        if principal.is_self(owner) {
            warn!(user_id = %principal.user_id, request_id = %id, "Attempt to review own leave request");
            return Err(AppError::Forbidden);
        }

        self.transition(
            principal,
            id,
            LeaveTransition {
                status: decision,
                reviewed_by: Some(principal.user_id),
                note: review.note,
            },
            meta,
        )
        .await
    }

    /// Withdraw a pending request: the owner, or ADMIN/HR.
    #[instrument(skip(self, principal, meta))]
    pub async fn cancel(&self, principal: &Principal, id: Uuid, meta: &RequestMeta) -> Result<LeaveRequest> {
        let owner = self.request_owner(id).await?;
        self.scope.require_self_unless_privileged(principal, owner)?;

        self.transition(
            principal,
            id,
            LeaveTransition {
                status: LeaveStatus::Cancelled,
                reviewed_by: None,
                note: None,
            },
            meta,
        )
        .await
    }

    async fn transition(
        &self,
        principal: &Principal,
        id: Uuid,
        transition: LeaveTransition,
        meta: &RequestMeta,
    ) -> Result<LeaveRequest> {
        let before = self.find_request(id).await?;
        if before.status != LeaveStatus::Pending {
            return Err(AppError::validation("only PENDING leave requests can change status"));
        }

        let after = self
            .leave
            .transition_pending(id, &transition)
            .await?
            .ok_or_else(|| AppError::validation("only PENDING leave requests can change status"))?;
        info!(id = %id, status = ?after.status, "Leave request transitioned");

        self.audit
            .record(
                principal,
                AuditEvent::update(REQUEST_RESOURCE, id, &before, &after),
                meta,
            )
            .await;

        Ok(after)
    }

    async fn request_owner(&self, id: Uuid) -> Result<Uuid> {
        self.leave
            .find_request_owner(id)
            .await?
            .ok_or_else(|| AppError::not_found("leave request"))
    }

    async fn find_request(&self, id: Uuid) -> Result<LeaveRequest> {
        self.leave
            .find_request(id)
            .await?
            .ok_or_else(|| AppError::not_found("leave request"))
    }
}
