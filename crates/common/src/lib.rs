// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between `CalBook` clients and the server.
//! This module defines the account API request and response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for `POST /v1/users/register`
/// # Fields
/// * `email` - Address the one-time password is sent to
/// * `username` - Desired unique username
/// * `password` - Plaintext password, hashed only after verification
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Request body for `POST /v1/users/login`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Generic confirmation message
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

/// Finalized identity returned by the verify and login endpoints.
/// The password hash is never echoed back.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VerifyResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
