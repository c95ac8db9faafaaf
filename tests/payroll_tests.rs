//! 薪资流程集成测试

use axum::http::StatusCode;
use hrms_service::models::Role;
use serde_json::json;

mod common;
use common::{seed_org, TestApp};

#[tokio::test]
async fn test_one_record_per_period() {
    let app = TestApp::new();
    let org = seed_org(&app).await;
    let hr = app.token_for(Role::Hr, None);
    let body = json!({
        "employee_id": org.e1.id,
        "period": "2025-01",
        "gross_pay": 800_000,
        "deductions": 150_000
    });

    let (status, created) = app.post("/api/v1/payroll", &hr, body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["status"], "DRAFT");
    assert_eq!(created["data"]["net_pay"], 650_000);

    let (status, _) = app.post("/api/v1/payroll", &hr, body).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_amounts_and_period() {
    let app = TestApp::new();
    let org = seed_org(&app).await;
    let hr = app.token_for(Role::Hr, None);

    let (status, _) = app
        .post(
            "/api/v1/payroll",
            &hr,
            json!({
                "employee_id": org.e1.id,
                "period": "2025-01",
                "gross_pay": 100,
                "deductions": 200
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .post(
            "/api/v1/payroll",
            &hr,
            json!({
                "employee_id": org.e1.id,
                "period": "2025-13",
                "gross_pay": 100,
                "deductions": 0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.get("/api/v1/payroll?period=March", &hr).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(app.audit_entries().await.is_empty());
}

#[tokio::test]
async fn test_mark_paid_once() {
    let app = TestApp::new();
    let org = seed_org(&app).await;
    let hr = app.token_for(Role::Hr, None);

    let (_, created) = app
        .post(
            "/api/v1/payroll",
            &hr,
            json!({
                "employee_id": org.e2.id,
                "period": "2025-02",
                "gross_pay": 500_000,
                "deductions": 0
            }),
        )
        .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let manager = app.token_for(Role::Manager, Some(org.m1.id));
    let (status, _) = app
        .post(&format!("/api/v1/payroll/{}/mark-paid", id), &manager, json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(&format!("/api/v1/payroll/{}/mark-paid", id), &hr, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "PAID");
    assert!(body["data"]["paid_at"].is_string());

    let (status, body) = app
        .post(&format!("/api/v1/payroll/{}/mark-paid", id), &hr, json!({}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["message"], "payroll record is already paid");
}

#[tokio::test]
async fn test_terminated_employee_gets_no_new_payroll() {
    let app = TestApp::new();
    let org = seed_org(&app).await;
    let hr = app.token_for(Role::Hr, None);

    let (status, _) = app
        .delete(&format!("/api/v1/employees/{}", org.outsider.id), &hr)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/api/v1/payroll",
            &hr,
            json!({
                "employee_id": org.outsider.id,
                "period": "2025-04",
                "gross_pay": 1000,
                "deductions": 0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["message"], "employee is terminated");
}
