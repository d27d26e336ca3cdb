//! Loan ledger routes.

mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

use common::TestApp;
use payroll_db::entities::sea_orm_active_enums::UserRole;

const NID: &str = "29801011234567";

#[tokio::test]
async fn test_loan_collect_and_inquiry() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.account("admin", UserRole::Admin, None, false).await;

    let (status, body) = app
        .json(
            "POST",
            "/api/v1/loans",
            &admin_token,
            json!({
                "national_id": NID,
                "full_name": "Hany Samir",
                "phone": "01001234567",
                "amount": "1000",
                "repayment_type": "monthly",
                "monthly_installment": "100"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let loan_number = body["loan"]["loan_number"].as_str().unwrap().to_string();
    assert!(loan_number.starts_with("LOAN-"));
    assert_eq!(common::decimal(&body["loan"]["total_remaining"]), dec!(1000));

    let (status, body) = app
        .json(
            "POST",
            &format!("/api/v1/loans/{loan_number}/collections"),
            &admin_token,
            json!({ "amount": "400", "note": "first" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(common::decimal(&body["loan"]["total_remaining"]), dec!(600));

    let (status, body) = app
        .json(
            "POST",
            &format!("/api/v1/loans/{loan_number}/collections"),
            &admin_token,
            json!({ "amount": "700" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "COLLECTION_EXCEEDS_REMAINING");

    let (status, detail) = app
        .get(&format!("/api/v1/loans/{loan_number}"), &admin_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["borrower"]["full_name"], "Hany Samir");
    assert_eq!(detail["collections"].as_array().unwrap().len(), 1);
    let collection_id = detail["collections"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .get(&format!("/api/v1/loans/inquiry?nid={NID}"), &admin_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inquiry"]["summary"]["count"], 1);
    assert_eq!(common::decimal(&body["inquiry"]["summary"]["paid"]), dec!(400));

    let (status, body) = app
        .call("DELETE", &format!("/api/v1/collections/{collection_id}"), &admin_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::decimal(&body["loan"]["total_remaining"]), dec!(1000));

    let (status, page) = app.get("/api/v1/loans/activity", &admin_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 3);
}

#[tokio::test]
async fn test_list_filters_and_status() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.account("admin", UserRole::Admin, None, false).await;

    let (_, body) = app
        .json(
            "POST",
            "/api/v1/loans",
            &admin_token,
            json!({
                "national_id": NID,
                "full_name": "Hany Samir",
                "amount": "500",
                "repayment_type": "oneoff",
                "maturity_date": "2025-12-31"
            }),
        )
        .await;
    let loan_number = body["loan"]["loan_number"].as_str().unwrap().to_string();

    let (status, body) = app
        .json(
            "PATCH",
            &format!("/api/v1/loans/{loan_number}/status"),
            &admin_token,
            json!({ "status": "bad_debt" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loan"]["status"], "bad_debt");

    let (_, page) = app.get("/api/v1/loans", &admin_token).await;
    assert_eq!(page["meta"]["total"], 0);

    let (_, page) = app.get("/api/v1/loans?status=all", &admin_token).await;
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(page["data"][0]["national_id"], NID);

    let (_, page) = app
        .get("/api/v1/loans?status=bad_debt&national_id=2980101", &admin_token)
        .await;
    assert_eq!(page["meta"]["total"], 1);

    let (status, body) = app.get("/api/v1/loans?status=paid", &admin_token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn test_prefill_and_validation() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.account("admin", UserRole::Admin, None, false).await;
    let (_, hr_token) = app.account("hr", UserRole::Hr, None, false).await;

    let (status, body) = app.get("/api/v1/loans/prefill?nid=123", &admin_token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_NATIONAL_ID");

    let (status, body) = app
        .get(&format!("/api/v1/loans/prefill?nid={NID}"), &admin_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["borrower"].is_null());

    let (status, body) = app
        .json(
            "POST",
            "/api/v1/loans",
            &admin_token,
            json!({ "national_id": NID, "amount": "500", "monthly_installment": "50" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "FULL_NAME_REQUIRED");

    let (status, _) = app.get("/api/v1/loans", &hr_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
