//! 请假管理的 HTTP 处理器

use crate::{
    auth::check_access,
    error::AppError,
    handlers::{created, data, updated, IdPath, JsonBody, QueryParams},
    middleware::AppState,
    models::{
        audit::RequestMeta,
        leave::*,
        pagination::{PageRequest, PagedResponse},
        Principal, RoleSet,
    },
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PolicyListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LeaveRequestListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<LeaveStatus>,
    pub employee_id: Option<Uuid>,
    pub leave_policy_id: Option<Uuid>,
}

// ==================== Policies ====================

pub async fn list_policies(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    query: QueryParams<PolicyListQuery>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ANY)?;
    let Query(query) = query?;

    let page = PageRequest::new(query.page, query.limit, &state.config.pagination);
    let policies = state.leave_service.list_policies(page).await?;

    Ok(Json(PagedResponse::new(policies, page)))
}

pub async fn create_policy(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    body: JsonBody<CreateLeavePolicyRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR)?;
    let Json(req) = body?;

    let policy = state
        .leave_service
        .create_policy(&principal, req, &meta)
        .await?;

    Ok(created(policy, "Leave policy created"))
}

pub async fn update_policy(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    id: IdPath,
    body: JsonBody<UpdateLeavePolicyRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR)?;
    let Path(id) = id?;
    let Json(req) = body?;

    let policy = state
        .leave_service
        .update_policy(&principal, id, req, &meta)
        .await?;

    Ok(updated(policy, "Leave policy updated"))
}

pub async fn delete_policy(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    id: IdPath,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR)?;
    let Path(id) = id?;

    state
        .leave_service
        .delete_policy(&principal, id, &meta)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ==================== Requests ====================

/// 列出请假申请（按申请人数据范围过滤）
pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    query: QueryParams<LeaveRequestListQuery>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ANY)?;
    let Query(query) = query?;

    let page = PageRequest::new(query.page, query.limit, &state.config.pagination);
    let filters = LeaveRequestFilters {
        status: query.status,
        employee_id: query.employee_id,
        leave_policy_id: query.leave_policy_id,
    };
    let requests = state
        .leave_service
        .list_requests(&principal, &filters, page)
        .await?;

    Ok(Json(PagedResponse::new(requests, page)))
}

pub async fn get_request(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    id: IdPath,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ANY)?;
    let Path(id) = id?;

    let request = state.leave_service.get_request(&principal, id).await?;

    Ok(data(request))
}

/// 提交请假申请
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    body: JsonBody<CreateLeaveRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ANY)?;
    let Json(req) = body?;

    let request = state
        .leave_service
        .create_request(&principal, req, &meta)
        .await?;

    Ok(created(request, "Leave request submitted"))
}

/// 批准
pub async fn approve_request(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    id: IdPath,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    review(state, principal, meta, id, body, LeaveStatus::Approved).await
}

/// 驳回
pub async fn reject_request(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    id: IdPath,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    review(state, principal, meta, id, body, LeaveStatus::Rejected).await
}

async fn review(
    state: Arc<AppState>,
    principal: Principal,
    meta: RequestMeta,
    id: IdPath,
    body: Bytes,
    decision: LeaveStatus,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR_MANAGER)?;
    let Path(id) = id?;
    // 审批意见可选，空请求体视为无意见
    let review = if body.is_empty() {
        ReviewLeaveRequest::default()
    } else {
        serde_json::from_slice::<ReviewLeaveRequest>(&body)
            .map_err(|e| AppError::BadRequest(format!("invalid review body: {}", e)))?
    };

    let request = state
        .leave_service
        .review(&principal, id, decision, review, &meta)
        .await?;

    let message = match decision {
        LeaveStatus::Approved => "Leave request approved",
        _ => "Leave request rejected",
    };
    Ok(updated(request, message))
}

/// 撤销
pub async fn cancel_request(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    id: IdPath,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ANY)?;
    let Path(id) = id?;

    let request = state.leave_service.cancel(&principal, id, &meta).await?;

    Ok(updated(request, "Leave request cancelled"))
}
