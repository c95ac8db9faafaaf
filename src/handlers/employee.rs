//! 员工管理的 HTTP 处理器

use crate::{
    auth::check_access,
    error::AppError,
    handlers::{created, data, updated, IdPath, JsonBody, QueryParams},
    middleware::AppState,
    models::{
        audit::RequestMeta,
        employee::*,
        pagination::{PageRequest, PagedResponse},
        Principal, RoleSet,
    },
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct EmployeeListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<EmploymentStatus>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// 列出员工（按调用者数据范围过滤）
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    query: QueryParams<EmployeeListQuery>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ANY)?;
    let Query(query) = query?;

    let page = PageRequest::new(query.page, query.limit, &state.config.pagination);
    let filters = EmployeeFilters {
        search: query.search,
        status: query.status,
        department_id: query.department_id,
        manager_id: query.manager_id,
        id: query.id,
    };
    let employees = state
        .employee_service
        .list(&principal, &filters, page)
        .await?;

    Ok(Json(PagedResponse::new(employees, page)))
}

/// 获取员工详情
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    id: IdPath,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ANY)?;
    let Path(id) = id?;

    let employee = state.employee_service.get(&principal, id, &meta).await?;

    Ok(data(employee))
}

/// 直接下属
pub async fn list_direct_reports(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    id: IdPath,
    query: QueryParams<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR_MANAGER)?;
    let Path(id) = id?;
    let Query(query) = query?;

    let page = PageRequest::new(query.page, query.limit, &state.config.pagination);
    let reports = state
        .employee_service
        .direct_reports(&principal, id, page)
        .await?;

    Ok(Json(PagedResponse::new(reports, page)))
}

/// 创建员工
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    body: JsonBody<CreateEmployeeRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR)?;
    let Json(req) = body?;

    let employee = state.employee_service.create(&principal, req, &meta).await?;

    Ok(created(employee, "Employee created"))
}

/// 更新员工
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    id: IdPath,
    body: JsonBody<UpdateEmployeeRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR)?;
    let Path(id) = id?;
    let Json(req) = body?;

    let employee = state
        .employee_service
        .update(&principal, id, req, &meta)
        .await?;

    Ok(updated(employee, "Employee updated"))
}

/// 离职（软删除）
pub async fn terminate_employee(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    id: IdPath,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR)?;
    let Path(id) = id?;

    let employee = state
        .employee_service
        .terminate(&principal, id, &meta)
        .await?;

    Ok(updated(employee, "Employee terminated"))
}
