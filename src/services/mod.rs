//! Business logic services layer

pub mod audit_service;
pub mod auth_service;
pub mod department_service;
pub mod employee_service;
pub mod leave_service;
pub mod payroll_service;
pub mod scope_service;

pub use audit_service::{AuditEvent, AuditService};
pub use auth_service::AuthService;
pub use department_service::DepartmentService;
pub use employee_service::EmployeeService;
pub use leave_service::LeaveService;
pub use payroll_service::PayrollService;
pub use scope_service::ScopeService;
