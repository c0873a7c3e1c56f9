// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::Path;
use serde::{Deserialize, Serialize};
use figment::{Figment, providers::{Env, Format, Serialized, Toml}};
use anyhow::Result;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level
    pub log_level: String,
    /// Outbound SMTP settings
    pub smtp: SmtpSettings,
    /// Token signing settings
    pub token: TokenSettings,
    /// Registration workflow settings
    pub registration: RegistrationSettings,
    /// Password requirements
    pub password_requirements: PasswordRequirements,
}

/// SMTP relay used to deliver one-time passwords
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address, e.g. `"CalBook <no-reply@calbook.dev>"`
    pub from: String,
}

/// Token signing settings. Injected once at construction; nothing
/// re-reads configuration at call time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSettings {
    /// Shared HS256 signing secret
    pub secret: String,
    /// `iss` claim
    pub issuer: String,
    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: u64,
}

/// Registration workflow settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationSettings {
    /// Pending-registration TTL in seconds
    pub code_ttl_secs: u64,
    /// When `false`, a code is deleted after a successful confirm and
    /// cannot re-finalize. `true` keeps the legacy resubmission window.
    pub allow_code_reuse: bool,
}

/// Password complexity requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRequirements {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Require uppercase letters
    pub require_uppercase: bool,
    /// Require lowercase letters
    pub require_lowercase: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            log_level: "info".to_string(),
            smtp: SmtpSettings::default(),
            token: TokenSettings::default(),
            registration: RegistrationSettings::default(),
            password_requirements: PasswordRequirements::default(),
        }
    }
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from: "CalBook <no-reply@localhost>".to_string(),
        }
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            secret: "insecure-dev-secret-change-me".to_string(),
            issuer: "calbook".to_string(),
            access_ttl_secs: 60 * 15,           // 15 minutes
            refresh_ttl_secs: 60 * 60 * 24 * 7, // 7 days
        }
    }
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            code_ttl_secs: 60 * 3, // 3 minutes
            allow_code_reuse: false,
        }
    }
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 30,
            require_uppercase: true,
            require_lowercase: true,
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` and `CALBOOK_`-prefixed environment
    /// variables, layered over the defaults.
    pub fn load() -> Result<Settings> {
        Self::load_from("config.toml")
    }

    /// Load settings from an explicit config file path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("CALBOOK_").split("__"))
            .extract()?;

        Ok(settings)
    }
}
