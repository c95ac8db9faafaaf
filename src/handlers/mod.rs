//! HTTP 处理器模块
//!
//! Every protected handler runs the role gate before touching its body,
//! query or path, so a caller outside the allowed roles gets `403` whatever
//! payload it sent. Extraction failures are therefore taken as `Result`s and
//! converted only after `check_access`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

pub mod audit;
pub mod auth;
pub mod department;
pub mod employee;
pub mod health;
pub mod leave;
pub mod payroll;
pub mod user;

pub(crate) type JsonBody<T> = Result<Json<T>, JsonRejection>;
pub(crate) type QueryParams<T> = Result<Query<T>, QueryRejection>;
pub(crate) type IdPath = Result<Path<Uuid>, PathRejection>;

/// `{ "data": ... }`
pub(crate) fn data<T: Serialize>(value: T) -> Json<Value> {
    Json(json!({ "data": value }))
}

/// `201` with `{ "data": ..., "message": ... }`
pub(crate) fn created<T: Serialize>(value: T, message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::CREATED,
        Json(json!({ "data": value, "message": message })),
    )
}

/// `{ "data": ..., "message": ... }`
pub(crate) fn updated<T: Serialize>(value: T, message: &str) -> Json<Value> {
    Json(json!({ "data": value, "message": message }))
}
