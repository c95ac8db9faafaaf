//! 审计日志查询处理器（只读）

use crate::{
    auth::check_access,
    error::AppError,
    handlers::{data, IdPath, QueryParams},
    middleware::AppState,
    models::{
        audit::*,
        pagination::{PageRequest, PagedResponse},
        Principal, RoleSet,
    },
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub resource_type: Option<String>,
    pub actor_id: Option<Uuid>,
    pub action: Option<AuditAction>,
    pub resource_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// 查询审计日志
pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    query: QueryParams<AuditLogQuery>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR)?;
    let Query(query) = query?;

    let page = PageRequest::new(query.page, query.limit, &state.config.pagination);
    let filters = AuditLogFilters {
        resource_type: query.resource_type,
        actor_id: query.actor_id,
        action: query.action,
        resource_id: query.resource_id,
        from: query.from,
        to: query.to,
    };
    let entries = state.audit_service.list(&filters, page).await?;

    Ok(Json(PagedResponse::new(entries, page)))
}

pub async fn get_audit_log(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    id: IdPath,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN_HR)?;
    let Path(id) = id?;

    let entry = state.audit_service.get(id).await?;

    Ok(data(entry))
}
