// =========================
// tests/unit/error_tests.rs
// =========================
//! Unit tests for the error module
use axum::http::StatusCode;
use axum::response::IntoResponse;
use calbook_backend_lib::error::AppError;

#[test]
fn test_app_error_status_codes() {
    assert_eq!(
        AppError::Validation("bad input".to_string()).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::Conflict { field: "email" }.status_code(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        AppError::NotFound("code".to_string()).status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        AppError::InvalidCredentials.status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::Storage("down".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Hashing("oom".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::CorruptData("truncated".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_app_error_error_codes() {
    assert_eq!(AppError::Validation("x".to_string()).error_code(), "VAL_001");
    assert_eq!(AppError::Conflict { field: "email" }.error_code(), "CONFLICT_001");
    assert_eq!(AppError::NotFound("x".to_string()).error_code(), "NF_001");
    assert_eq!(AppError::InvalidCredentials.error_code(), "AUTH_001");
    assert_eq!(AppError::Storage("x".to_string()).error_code(), "STORE_001");
    assert_eq!(AppError::Signing("x".to_string()).error_code(), "SIGN_001");

    let json_err: serde_json::Error =
        serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
    assert_eq!(AppError::Json(json_err).error_code(), "JSON_001");
}

#[test]
fn test_error_from_impls() {
    let json_err: serde_json::Error =
        serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
    let app_err: AppError = json_err.into();
    assert!(matches!(app_err, AppError::Json(_)));

    let string_err = "String error".to_string();
    let app_err: AppError = string_err.into();
    assert!(matches!(app_err, AppError::Internal(_)));
}

#[tokio::test]
async fn test_error_serialization() {
    let response = AppError::Conflict { field: "username" }.into_response();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response_headers = response.headers();
    assert!(response_headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("application/json"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "CONFLICT_001");
}
