//! 数据模型模块
//! 员工、部门、请假、薪资、账号与审计

pub mod audit;
pub mod auth;
pub mod department;
pub mod employee;
pub mod leave;
pub mod pagination;
pub mod payroll;
pub mod principal;
pub mod role;
pub mod user;

pub use principal::{Principal, ScopeFilter};
pub use role::{Role, RoleSet};
