//! 认证相关的 HTTP 处理器

use crate::{
    error::AppError,
    handlers::{data, JsonBody},
    middleware::AppState,
    models::{auth::*, Principal},
};
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body?;
    let response = state.auth_service.login(req).await?;

    Ok(Json(response))
}

/// 当前调用者
pub async fn get_current_user(principal: Principal) -> impl IntoResponse {
    data(principal)
}
