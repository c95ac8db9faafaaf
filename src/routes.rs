//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{auth::jwt_auth_middleware, config::SecurityConfig, handlers, middleware::AppState};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需令牌）
    let auth_routes = Router::new().route("/api/v1/auth/login", post(handlers::auth::login));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        // 当前调用者
        .route("/api/v1/auth/me", get(handlers::auth::get_current_user))

        // 账号管理（仅 ADMIN）
        .route(
            "/api/v1/users",
            get(handlers::user::list_users)
                .post(handlers::user::create_user)
        )

        // 部门
        .route(
            "/api/v1/departments",
            get(handlers::department::list_departments)
                .post(handlers::department::create_department)
        )
        .route(
            "/api/v1/departments/{id}",
            get(handlers::department::get_department)
                .put(handlers::department::update_department)
                .delete(handlers::department::delete_department)
        )

        // 员工
        .route(
            "/api/v1/employees",
            get(handlers::employee::list_employees)
                .post(handlers::employee::create_employee)
        )
        .route(
            "/api/v1/employees/{id}",
            get(handlers::employee::get_employee)
                .put(handlers::employee::update_employee)
                .delete(handlers::employee::terminate_employee)
        )
        .route(
            "/api/v1/employees/{id}/direct-reports",
            get(handlers::employee::list_direct_reports)
        )

        // 请假策略
        .route(
            "/api/v1/leave-policies",
            get(handlers::leave::list_policies)
                .post(handlers::leave::create_policy)
        )
        .route(
            "/api/v1/leave-policies/{id}",
            put(handlers::leave::update_policy)
                .delete(handlers::leave::delete_policy)
        )

        // 请假申请
        .route(
            "/api/v1/leave-requests",
            get(handlers::leave::list_requests)
                .post(handlers::leave::create_request)
        )
        .route(
            "/api/v1/leave-requests/{id}",
            get(handlers::leave::get_request)
        )
        .route(
            "/api/v1/leave-requests/{id}/approve",
            post(handlers::leave::approve_request)
        )
        .route(
            "/api/v1/leave-requests/{id}/reject",
            post(handlers::leave::reject_request)
        )
        .route(
            "/api/v1/leave-requests/{id}/cancel",
            post(handlers::leave::cancel_request)
        )

        // 薪资
        .route(
            "/api/v1/payroll",
            get(handlers::payroll::list_payroll)
                .post(handlers::payroll::create_payroll)
        )
        .route(
            "/api/v1/payroll/{id}",
            get(handlers::payroll::get_payroll)
        )
        .route(
            "/api/v1/payroll/{id}/mark-paid",
            post(handlers::payroll::mark_paid)
        )

        // 审计日志（只读）
        .route("/api/v1/audit-logs", get(handlers::audit::list_audit_logs))
        .route("/api/v1/audit-logs/{id}", get(handlers::audit::get_audit_log))
        .layer(axum::middleware::from_fn_with_state(
            state.jwt_service.clone(),
            jwt_auth_middleware,
        ));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::ip_whitelist_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(state.config.security.body_limit_bytes))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

/// 未配置来源时允许任意来源
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if security.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
