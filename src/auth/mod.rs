//! Authentication and authorization module

pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use gate::check_access;
pub use jwt::{Claims, JwtService};
pub use middleware::{extract_token, jwt_auth_middleware};
pub use password::PasswordHasher;
