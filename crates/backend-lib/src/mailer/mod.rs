// ============================
// crates/backend-lib/src/mailer/mod.rs
// ============================
//! Outbound email: the one-time-password notification.
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpSettings;
use crate::error::AppError;

/// Subject line of the verification email
pub const OTP_EMAIL_SUBJECT: &str = "Email verification";

const OTP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <body style="font-family: sans-serif; color: #222;">
    <h2>Verify your email</h2>
    <p>Use this one-time password to confirm your CalBook registration:</p>
    <p style="font-size: 28px; letter-spacing: 4px; font-weight: bold;">{code}</p>
    <p>The code expires in a few minutes. If you did not register, ignore this email.</p>
  </body>
</html>
"#;

/// Render the OTP notification body
pub fn render_otp_email(code: &str) -> String {
    OTP_TEMPLATE.replace("{code}", code)
}

/// Trait for notification delivery. Best-effort: callers consume no
/// delivery confirmation beyond the immediate send result.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: String) -> Result<(), AppError>;
}

/// SMTP implementation of the `Mailer` trait
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, AppError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| AppError::Internal(format!("smtp transport: {e}")))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| AppError::Internal(format!("sender address: {e}")))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: String) -> Result<(), AppError> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| AppError::Validation(format!("invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| AppError::Internal(format!("build email: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(format!("smtp send: {e}")))?;

        Ok(())
    }
}
