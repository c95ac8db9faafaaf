//! 访问控制门：按角色集合放行请求

use crate::{
    error::{AppError, Result},
    models::{Principal, RoleSet},
};

/// Admit the caller if its role is in `allowed`, otherwise `Forbidden`.
///
/// Authentication has already happened by the time a handler calls this:
/// a missing or invalid token never reaches the gate.
pub fn check_access(principal: &Principal, allowed: RoleSet) -> Result<()> {
    if allowed.contains(principal.role) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %principal.user_id,
        role = %principal.role,
        required = %allowed,
        "Access denied by role gate"
    );
    metrics::counter!("access_denied_total", "reason" => "role").increment(1);

    Err(AppError::Forbidden)
}
