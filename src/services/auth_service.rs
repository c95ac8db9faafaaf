//! 认证服务：登录与账户管理

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    config::AppConfig,
    error::{AppError, Result},
    models::{
        audit::RequestMeta,
        auth::*,
        pagination::{Page, PageRequest},
        user::*,
        Principal,
    },
    repository::{EmployeeRepository, UserRepository},
    services::audit_service::{AuditEvent, AuditService},
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    employees: Arc<dyn EmployeeRepository>,
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
    audit: Arc<AuditService>,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        employees: Arc<dyn EmployeeRepository>,
        jwt_service: Arc<JwtService>,
        audit: Arc<AuditService>,
        config: Arc<AppConfig>,
    ) -> Result<Self> {
        Ok(Self {
            users,
            employees,
            jwt_service,
            hasher: PasswordHasher::new()?,
            audit,
            config,
        })
    }

    /// 用户登录
    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse> {
        req.validate()?;

        let user = self
            .users
            .find_by_username(&req.username)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        // 检查账户状态
        if !user.is_active {
            warn!(user_id = %user.id, "Login attempt on disabled account");
            return Err(AppError::Unauthenticated);
        }

        self.hasher.verify(&req.password, &user.password_hash)?;

        let access_token = self.jwt_service.generate_access_token(&user)?;
        self.users.touch_last_login(user.id).await?;
        info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer",
            expires_in: self.jwt_service.access_token_exp_secs(),
            user: UserResponse::from(user),
        })
    }

    pub async fn list_users(&self, page: PageRequest) -> Result<Page<User>> {
        self.users.list(page).await
    }

    /// 创建登录账户
    #[instrument(skip(self, principal, req, meta), fields(username = %req.username, role = %req.role))]
    pub async fn create_user(
        &self,
        principal: &Principal,
        req: CreateUserRequest,
        meta: &RequestMeta,
    ) -> Result<UserResponse> {
        req.validate()?;
        PasswordHasher::validate_password_policy(&req.password, &self.config.security)?;

        if self.users.find_by_username(&req.username).await?.is_some() {
            return Err(AppError::conflict("username already exists"));
        }
        if let Some(employee_id) = req.employee_id {
            if !self.employees.exists(employee_id).await? {
                return Err(AppError::validation("linked employee does not exist"));
            }
        }

        let password_hash = self.hasher.hash(&req.password)?;
        let user = self
            .users
            .create(&NewUser {
                username: req.username,
                password_hash,
                role: req.role,
                employee_id: req.employee_id,
            })
            .await?;
        info!(user_id = %user.id, "User created");

        let response = UserResponse::from(user);
        self.audit
            .record(principal, AuditEvent::create("users", response.id, &response), meta)
            .await;

        Ok(response)
    }
}
