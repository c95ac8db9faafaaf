//! 用户管理的 HTTP 处理器

use crate::{
    auth::check_access,
    error::AppError,
    handlers::{created, JsonBody, QueryParams},
    middleware::AppState,
    models::{
        audit::RequestMeta,
        pagination::{Page, PageRequest, PagedResponse},
        user::*,
        Principal, RoleSet,
    },
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// 列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    query: QueryParams<UserListQuery>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN)?;
    let Query(query) = query?;

    let page = PageRequest::new(query.page, query.limit, &state.config.pagination);
    let users = state.auth_service.list_users(page).await?;
    let users = Page {
        items: users.items.into_iter().map(UserResponse::from).collect(),
        total: users.total,
    };

    Ok(Json(PagedResponse::new(users, page)))
}

/// 创建用户
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    meta: RequestMeta,
    body: JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_access(&principal, RoleSet::ADMIN)?;
    let Json(req) = body?;

    let user = state.auth_service.create_user(&principal, req, &meta).await?;

    Ok(created(user, "User created"))
}
