// ============================
// crates/backend-lib/src/handlers/users.rs
// ============================
//! Account endpoints: register, verify, login.
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use calbook_common::{LoginRequest, MessageResponse, RegisterRequest, VerifyResponse};

use crate::{error::AppError, AppState};

/// Query parameters for `GET /v1/users/verify`
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub email: String,
    pub code: String,
}

/// `POST /v1/users/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.registration.register(body).await.map(Json)
}

/// `GET /v1/users/verify?email=&code=`
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Result<Json<VerifyResponse>, AppError> {
    state
        .registration
        .verify(&params.email, &params.code)
        .await
        .map(Json)
}

/// `POST /v1/users/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<VerifyResponse>, AppError> {
    state
        .registration
        .login(&body.email, &body.password)
        .await
        .map(Json)
}

/// `GET /healthz` - liveness probe
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
