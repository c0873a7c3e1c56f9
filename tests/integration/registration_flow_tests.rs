// ==========================================
// tests/integration/registration_flow_tests.rs
// ==========================================
//! End-to-end workflow tests over the in-memory collaborators.
use std::sync::Arc;
use std::time::Duration;

use calbook_backend_lib::auth::verify_password;
use calbook_backend_lib::error::AppError;
use calbook_backend_lib::registration::pending::PendingStore;
use calbook_backend_lib::registration::RegistrationService;
use calbook_backend_lib::store::UserStore;

use crate::test_utils::{
    register_request, test_backend, test_backend_with, test_settings, FailingMailer,
};

fn service(backend: &crate::test_utils::TestBackend) -> &RegistrationService {
    &backend.state.registration
}

#[tokio::test]
async fn test_register_then_verify_finalizes_user() {
    let backend = test_backend();

    let message = service(&backend)
        .register(register_request("a@x.com", "alice", "Sup3rSecret"))
        .await
        .unwrap();
    assert!(message.message.contains("One time password"));

    // nothing durable yet
    assert!(backend.users.find_by_email("a@x.com").await.unwrap().is_none());

    let email = backend.mailer.last_email().unwrap();
    assert_eq!(email.to, "a@x.com");
    assert_eq!(email.subject, "Email verification");
    let code = backend.mailer.last_code().unwrap();

    let verified = service(&backend).verify("a@x.com", &code).await.unwrap();
    assert_eq!(verified.email, "a@x.com");
    assert_eq!(verified.username, "alice");
    assert!(!verified.access_token.is_empty());

    // the durable hash validates against the original plaintext and is not the plaintext
    let stored = backend
        .users
        .find_by_email("a@x.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash, "Sup3rSecret");
    assert!(verify_password(&stored.password_hash, "Sup3rSecret"));
    assert!(!verify_password(&stored.password_hash, "Sup3rSecret2"));
}

#[tokio::test]
async fn test_duplicate_email_is_a_conflict() {
    let backend = test_backend();

    service(&backend)
        .register(register_request("a@x.com", "alice", "Sup3rSecret"))
        .await
        .unwrap();
    let code = backend.mailer.last_code().unwrap();
    service(&backend).verify("a@x.com", &code).await.unwrap();

    let err = service(&backend)
        .register(register_request("a@x.com", "other", "Sup3rSecret"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { field: "email" }));
}

#[tokio::test]
async fn test_duplicate_username_is_a_conflict() {
    let backend = test_backend();

    service(&backend)
        .register(register_request("a@x.com", "alice", "Sup3rSecret"))
        .await
        .unwrap();
    let code = backend.mailer.last_code().unwrap();
    service(&backend).verify("a@x.com", &code).await.unwrap();

    let err = service(&backend)
        .register(register_request("b@x.com", "alice", "Sup3rSecret"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { field: "username" }));
}

#[tokio::test]
async fn test_weak_passwords_are_rejected_before_any_side_effect() {
    let backend = test_backend();

    // 6 characters
    let err = service(&backend)
        .register(register_request("a@x.com", "alice", "short1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // no uppercase
    let err = service(&backend)
        .register(register_request("a@x.com", "alice", "alllowercase1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(backend.mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_verify_with_wrong_email_leaves_record_intact() {
    let backend = test_backend();

    service(&backend)
        .register(register_request("a@x.com", "alice", "Sup3rSecret"))
        .await
        .unwrap();
    let code = backend.mailer.last_code().unwrap();

    let err = service(&backend).verify("b@x.com", &code).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // the record was not consumed; the right email still confirms
    let verified = service(&backend).verify("a@x.com", &code).await.unwrap();
    assert_eq!(verified.username, "alice");
}

#[tokio::test]
async fn test_email_is_normalized_before_matching() {
    let backend = test_backend();

    service(&backend)
        .register(register_request("  A@X.com ", "alice", "Sup3rSecret"))
        .await
        .unwrap();
    assert_eq!(backend.mailer.last_email().unwrap().to, "a@x.com");

    let code = backend.mailer.last_code().unwrap();
    let verified = service(&backend).verify(" A@X.COM ", &code).await.unwrap();
    assert_eq!(verified.email, "a@x.com");
}

#[tokio::test]
async fn test_verify_after_ttl_expiry_is_not_found() {
    let mut settings = test_settings();
    settings.registration.code_ttl_secs = 1;
    let backend = test_backend_with(settings);

    service(&backend)
        .register(register_request("a@x.com", "alice", "Sup3rSecret"))
        .await
        .unwrap();
    let code = backend.mailer.last_code().unwrap();

    tokio::time::sleep(Duration::from_millis(1200)).await;

    let err = service(&backend).verify("a@x.com", &code).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let backend = test_backend();
    let err = service(&backend).verify("a@x.com", "000000").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_code_is_consumed_after_confirm() {
    let backend = test_backend();

    service(&backend)
        .register(register_request("a@x.com", "alice", "Sup3rSecret"))
        .await
        .unwrap();
    let code = backend.mailer.last_code().unwrap();

    service(&backend).verify("a@x.com", &code).await.unwrap();

    let err = service(&backend).verify("a@x.com", &code).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_code_survives_confirm_when_reuse_is_configured() {
    let mut settings = test_settings();
    settings.registration.allow_code_reuse = true;
    let backend = test_backend_with(settings);

    service(&backend)
        .register(register_request("a@x.com", "alice", "Sup3rSecret"))
        .await
        .unwrap();
    let code = backend.mailer.last_code().unwrap();

    service(&backend).verify("a@x.com", &code).await.unwrap();

    // the pending record is still readable within its TTL window
    assert!(backend.pending.get(&code).await.unwrap().is_some());
}

#[tokio::test]
async fn test_registration_survives_mail_failure() {
    let settings = test_settings();
    let users = Arc::new(calbook_backend_lib::store::InMemoryUserStore::new());
    let pending = Arc::new(
        calbook_backend_lib::registration::pending::InMemoryPendingStore::new(),
    );
    let state = calbook_backend_lib::AppState::new(
        users,
        pending,
        Arc::new(FailingMailer),
        settings,
    );

    // the caller sees the same generic confirmation
    let message = state
        .registration
        .register(register_request("a@x.com", "alice", "Sup3rSecret"))
        .await
        .unwrap();
    assert!(message.message.contains("One time password"));
}

#[tokio::test]
async fn test_login_rotates_refresh_token() {
    let backend = test_backend();

    service(&backend)
        .register(register_request("a@x.com", "alice", "Sup3rSecret"))
        .await
        .unwrap();
    let code = backend.mailer.last_code().unwrap();
    service(&backend).verify("a@x.com", &code).await.unwrap();

    let before = backend
        .users
        .find_by_email("a@x.com")
        .await
        .unwrap()
        .unwrap();

    // cross a second boundary so the rotated token's iat claim differs
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let logged_in = service(&backend).login("a@x.com", "Sup3rSecret").await.unwrap();
    assert_eq!(logged_in.email, "a@x.com");
    assert!(!logged_in.access_token.is_empty());

    let after = backend
        .users
        .find_by_email("a@x.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(before.refresh_token, after.refresh_token);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let backend = test_backend();

    service(&backend)
        .register(register_request("a@x.com", "alice", "Sup3rSecret"))
        .await
        .unwrap();
    let code = backend.mailer.last_code().unwrap();
    service(&backend).verify("a@x.com", &code).await.unwrap();

    let wrong_password = service(&backend).login("a@x.com", "WrongPass1").await;
    assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));

    let unknown_email = service(&backend).login("b@x.com", "Sup3rSecret").await;
    assert!(matches!(unknown_email, Err(AppError::InvalidCredentials)));
}
