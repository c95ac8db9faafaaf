//! 部门管理的 HTTP 处理器

use crate::{
    auth::check_access,
    error::AppError,
    handlers::{created, data, updated, IdPath, JsonBody, QueryParams},
    middleware::AppState,
    models::{
        audit::RequestMeta,
        department::*,
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

#[derive(Debug, Deserialize)]
pub struct DepartmentListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

/// 列出部门
pub async fn list_departments(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    query: QueryParams<DepartmentListQuery>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ANY)?;
    let Query(query) = query?;

    let page = PageRequest::new(query.page, query.limit, &state.config.pagination);
    let filters = DepartmentFilters {
        search: query.search,
        is_active: query.is_active,
    };
    let departments = state.department_service.list(&filters, page).await?;

    Ok(Json(PagedResponse::new(departments, page)))
}

/// 获取部门详情
pub async fn get_department(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    id: IdPath,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ANY)?;
    let Path(id) = id?;

    let department = state.department_service.get(id).await?;

    Ok(data(department))
}

/// 创建部门
pub async fn create_department(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    body: JsonBody<CreateDepartmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR)?;
    let Json(req) = body?;

    let department = state
        .department_service
        .create(&principal, req, &meta)
        .await?;

    Ok(created(department, "Department created"))
}

/// 更新部门
pub async fn update_department(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    id: IdPath,
    body: JsonBody<UpdateDepartmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR)?;
    let Path(id) = id?;
    let Json(req) = body?;

    let department = state
        .department_service
        .update(&principal, id, req, &meta)
        .await?;

    Ok(updated(department, "Department updated"))
}

/// 停用部门
pub async fn delete_department(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    id: IdPath,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN)?;
    let Path(id) = id?;

    let department = state
        .department_service
        .deactivate(&principal, id, &meta)
        .await?;

    Ok(updated(department, "Department deactivated"))
}
