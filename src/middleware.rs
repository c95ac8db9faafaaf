//! HTTP 中间件
//! 应用状态、请求追踪、IP 白名单、请求元数据提取

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::JwtService,
    config::AppConfig,
    error::{AppError, Result},
    models::audit::RequestMeta,
    repository::Repositories,
    services::{
        AuditService, AuthService, DepartmentService, EmployeeService, LeaveService,
        PayrollService, ScopeService,
    },
};

/// 应用状态
///
/// 服务之间共享同一组数据访问实现（`Repositories`）。
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: sqlx::PgPool,
    pub jwt_service: Arc<JwtService>,
    pub audit_service: Arc<AuditService>,
    pub scope_service: Arc<ScopeService>,
    pub auth_service: Arc<AuthService>,
    pub employee_service: Arc<EmployeeService>,
    pub department_service: Arc<DepartmentService>,
    pub leave_service: Arc<LeaveService>,
    pub payroll_service: Arc<PayrollService>,
}

impl AppState {
    pub fn new(config: AppConfig, db: sqlx::PgPool, repos: Repositories) -> Result<Self> {
        let config = Arc::new(config);
        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let audit_service = Arc::new(AuditService::new(repos.audit.clone()));
        let scope_service = Arc::new(ScopeService::new(repos.employees.clone()));

        let auth_service = Arc::new(AuthService::new(
            repos.users.clone(),
            repos.employees.clone(),
            jwt_service.clone(),
            audit_service.clone(),
            config.clone(),
        )?);
        let employee_service = Arc::new(EmployeeService::new(
            repos.employees.clone(),
            repos.departments.clone(),
            scope_service.clone(),
            audit_service.clone(),
        ));
        let department_service = Arc::new(DepartmentService::new(
            repos.departments.clone(),
            repos.employees.clone(),
            audit_service.clone(),
        ));
        let leave_service = Arc::new(LeaveService::new(
            repos.leave.clone(),
            repos.employees.clone(),
            scope_service.clone(),
            audit_service.clone(),
        ));
        let payroll_service = Arc::new(PayrollService::new(
            repos.payroll.clone(),
            repos.employees.clone(),
            scope_service.clone(),
            audit_service.clone(),
        ));

        Ok(Self {
            config,
            db,
            jwt_service,
            audit_service,
            scope_service,
            auth_service,
            employee_service,
            department_service,
            leave_service,
            payroll_service,
        })
    }
}

/// 当前请求的 request_id（由追踪中间件写入扩展）
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(mut req: Request, next: Next) -> Response {
    let trace_id = header_or_generate(req.headers(), "x-trace-id");
    let request_id = header_or_generate(req.headers(), "x-request-id");
    req.extensions_mut().insert(RequestId(request_id.clone()));

    let method = req.method().clone();
    let uri = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
        user_id = tracing::field::Empty,
    );

    async move {
        let start = Instant::now();
        let mut response = next.run(req).await;
        let elapsed = start.elapsed();

        let status = response.status().as_u16();
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        metrics::counter!(
            "http_requests_total",
            "method" => method_name,
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        for (name, value) in [("x-trace-id", &trace_id), ("x-request-id", &request_id)] {
            if let Ok(value) = HeaderValue::from_str(value) {
                response.headers_mut().insert(name, value);
            }
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 id
fn header_or_generate(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// IP 白名单中间件
pub async fn ip_whitelist_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> std::result::Result<Response, AppError> {
    if let Some(allowed_ips) = &state.config.security.allowed_ips {
        let client_ip = client_ip(req.headers(), state.config.security.trust_proxy)
            .unwrap_or_else(|| "unknown".to_string());

        if !allowed_ips.contains(&client_ip) {
            tracing::warn!(client_ip = %client_ip, "IP not in whitelist");
            metrics::counter!("access_denied_total", "reason" => "ip").increment(1);
            return Err(AppError::Forbidden);
        }

        tracing::debug!(client_ip = %client_ip, "IP allowed by whitelist");
    }

    Ok(next.run(req).await)
}

/// 获取客户端 IP 地址（仅在信任代理时读取转发头）
fn client_ip(headers: &HeaderMap, trust_proxy: bool) -> Option<String> {
    if !trust_proxy {
        return None;
    }

    // X-Forwarded-For 可能包含多个 IP，取第一个
    if let Some(first) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return Some(first.to_string());
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
}

// 审计用的请求元数据
impl FromRequestParts<Arc<AppState>> for RequestMeta {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(RequestMeta {
            ip_address: client_ip(&parts.headers, state.config.security.trust_proxy),
            user_agent: parts
                .headers
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()),
            request_id: parts
                .extensions
                .get::<RequestId>()
                .map(|id| id.0.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_or_generate() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace-id", "test-trace-123".parse().unwrap());

        assert_eq!(header_or_generate(&headers, "x-trace-id"), "test-trace-123");

        let generated = header_or_generate(&HeaderMap::new(), "x-trace-id");
        assert!(Uuid::parse_str(&generated).is_ok());
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());

        assert_eq!(client_ip(&headers, true).as_deref(), Some("203.0.113.7"));
        assert_eq!(client_ip(&headers, false), None);
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.4".parse().unwrap());

        assert_eq!(client_ip(&headers, true).as_deref(), Some("198.51.100.4"));
    }
}
