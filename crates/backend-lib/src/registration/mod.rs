// ============================
// crates/backend-lib/src/registration/mod.rs
// ============================
/*! Registration, verification and login workflows.

Registration validates the request, checks durable uniqueness, parks the
pending record in the TTL store under a fresh 6-digit code and emails the
code. Verification looks the record up by code, proves email ownership,
and finalizes the account exactly once: hash the password, issue tokens,
persist the user, invalidate the code. */
pub mod pending;

use std::sync::Arc;
use std::time::Duration;

use calbook_common::{MessageResponse, RegisterRequest, VerifyResponse};
use metrics::counter;
use tracing::{info, warn};

use crate::auth::{generate_code, hash_password, verify_password, TokenSigner};
use crate::config::{PasswordRequirements, RegistrationSettings};
use crate::error::AppError;
use crate::mailer::{render_otp_email, Mailer, OTP_EMAIL_SUBJECT};
use crate::store::{NewUser, UserStore};
use crate::validation;

use pending::{PendingRegistration, PendingStore};

/// Role claim carried by every token issued here
const USER_ROLE: &str = "user";

/// How many fresh codes to draw before giving up on a reservation
const MAX_CODE_DRAWS: usize = 5;

/// Account workflows over the user store, the pending-registration
/// mailbox and the notification sender
#[derive(Clone)]
pub struct RegistrationService {
    users: Arc<dyn UserStore>,
    pending: Arc<dyn PendingStore>,
    mailer: Arc<dyn Mailer>,
    signer: TokenSigner,
    settings: RegistrationSettings,
    password_requirements: PasswordRequirements,
}

impl RegistrationService {
    pub fn new(
        users: Arc<dyn UserStore>,
        pending: Arc<dyn PendingStore>,
        mailer: Arc<dyn Mailer>,
        signer: TokenSigner,
        settings: RegistrationSettings,
        password_requirements: PasswordRequirements,
    ) -> Self {
        Self {
            users,
            pending,
            mailer,
            signer,
            settings,
            password_requirements,
        }
    }

    /** Start a registration.

    No side effect happens before validation and both uniqueness checks
    pass. On success the caller gets the same generic message whether or
    not the email could actually be delivered. */
    pub async fn register(&self, request: RegisterRequest) -> Result<MessageResponse, AppError> {
        let email = validation::normalize_email(&request.email);
        validation::validate_email(&email)?;
        validation::validate_username(&request.username)?;
        validation::validate_password(&request.password, &self.password_requirements)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict { field: "email" });
        }
        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(AppError::Conflict { field: "username" });
        }

        let record = PendingRegistration {
            email: email.clone(),
            username: request.username,
            password: request.password,
        };
        let payload = serde_json::to_vec(&record)?;
        let ttl = Duration::from_secs(self.settings.code_ttl_secs);

        let code = self.reserve_code(payload, ttl).await?;

        // Best-effort delivery: the reservation stands even if the send
        // fails, and the caller cannot distinguish the two outcomes.
        if let Err(err) = self
            .mailer
            .send(&email, OTP_EMAIL_SUBJECT, render_otp_email(&code))
            .await
        {
            warn!(%email, error = %err, "registration - failed to send verification email");
        }

        counter!("registration.started").increment(1);
        Ok(MessageResponse {
            message: "One time password sent to your email. Please verify.".to_string(),
        })
    }

    /// Draw codes until one reserves a vacant slot in the pending store
    async fn reserve_code(&self, payload: Vec<u8>, ttl: Duration) -> Result<String, AppError> {
        for _ in 0..MAX_CODE_DRAWS {
            let code = generate_code();
            if self.pending.reserve(&code, payload.clone(), ttl).await? {
                return Ok(code);
            }
        }
        Err(AppError::Storage(
            "could not reserve a verification code".to_string(),
        ))
    }

    /** Confirm a registration by one-time code.

    The supplied email must match the pending record; a mismatch leaves
    the record intact. Finalization hashes the password exactly once,
    issues the token pair and persists the user. Unless code reuse is
    configured, the code is invalidated so it cannot re-finalize. */
    pub async fn verify(&self, email: &str, code: &str) -> Result<VerifyResponse, AppError> {
        let payload = self
            .pending
            .get(code)
            .await?
            .ok_or_else(|| AppError::NotFound("unknown or expired verification code".to_string()))?;

        let record: PendingRegistration = serde_json::from_slice(&payload)
            .map_err(|e| AppError::CorruptData(format!("pending registration: {e}")))?;

        let email = validation::normalize_email(email);
        if email != record.email {
            return Err(AppError::Validation("Incorrect email".to_string()));
        }

        let password_hash = hash_password(&record.password)?;
        let tokens = self.signer.generate_pair(&record.email, USER_ROLE)?;

        let user = self
            .users
            .create(NewUser {
                email: record.email,
                username: record.username,
                password_hash,
                refresh_token: tokens.refresh,
            })
            .await?;

        if !self.settings.allow_code_reuse {
            self.pending.remove(code).await?;
        }

        counter!("registration.completed").increment(1);
        info!(user_id = %user.id, "registration - user verified");

        Ok(VerifyResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            access_token: tokens.access,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }

    /// Authenticate a finalized user and rotate their refresh token
    pub async fn login(&self, email: &str, password: &str) -> Result<VerifyResponse, AppError> {
        let email = validation::normalize_email(email);

        // Unknown email and wrong password are indistinguishable to the caller
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;
        if !verify_password(&user.password_hash, password) {
            return Err(AppError::InvalidCredentials);
        }

        let tokens = self.signer.generate_pair(&user.email, USER_ROLE)?;
        let user = self
            .users
            .update_refresh_token(user.id, &tokens.refresh)
            .await?;

        Ok(VerifyResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            access_token: tokens.access,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}
