//! 薪资管理的 HTTP 处理器

use crate::{
    auth::check_access,
    error::AppError,
    handlers::{created, data, updated, IdPath, JsonBody, QueryParams},
    middleware::AppState,
    models::{
        audit::RequestMeta,
        pagination::{PageRequest, PagedResponse},
        payroll::*,
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
pub struct PayrollListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub employee_id: Option<Uuid>,
    pub period: Option<String>,
    pub status: Option<PayrollStatus>,
}

pub async fn list_payroll(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    query: QueryParams<PayrollListQuery>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ANY)?;
    let Query(query) = query?;

    let page = PageRequest::new(query.page, query.limit, &state.config.pagination);
    let filters = PayrollFilters {
        employee_id: query.employee_id,
        period: query.period,
        status: query.status,
    };
    let records = state
        .payroll_service
        .list(&principal, &filters, page)
        .await?;

    Ok(Json(PagedResponse::new(records, page)))
}

pub async fn get_payroll(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    id: IdPath,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ANY)?;
    let Path(id) = id?;

    let record = state.payroll_service.get(&principal, id).await?;

    Ok(data(record))
}

pub async fn create_payroll(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    body: JsonBody<CreatePayrollRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR)?;
    let Json(req) = body?;

    let record = state.payroll_service.create(&principal, req, &meta).await?;

    Ok(created(record, "Payroll record created"))
}

pub async fn mark_paid(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    id: IdPath,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR)?;
    let Path(id) = id?;

    let record = state
        .payroll_service
        .mark_paid(&principal, id, &meta)
        .await?;

    Ok(updated(record, "Payroll record marked as paid"))
}
