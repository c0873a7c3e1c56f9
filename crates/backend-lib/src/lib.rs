// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `CalBook` calendar backend.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod registration;
pub mod router;
pub mod store;
pub mod validation;

use std::sync::Arc;

use crate::auth::TokenSigner;
use crate::config::Settings;
use crate::mailer::Mailer;
use crate::registration::pending::{InMemoryPendingStore, PendingStore};
use crate::registration::RegistrationService;
use crate::store::{InMemoryUserStore, UserStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Account workflows
    pub registration: RegistrationService,
    /// Settings, injected once at construction
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state over explicit collaborators
    pub fn new(
        users: Arc<dyn UserStore>,
        pending: Arc<dyn PendingStore>,
        mailer: Arc<dyn Mailer>,
        settings: Settings,
    ) -> Self {
        let signer = TokenSigner::new(&settings.token);
        let registration = RegistrationService::new(
            users,
            pending,
            mailer,
            signer,
            settings.registration.clone(),
            settings.password_requirements.clone(),
        );

        Self {
            registration,
            settings: Arc::new(settings),
        }
    }

    /// Create an application state backed by the in-memory stores
    pub fn in_memory(settings: Settings, mailer: Arc<dyn Mailer>) -> Self {
        Self::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryPendingStore::new()),
            mailer,
            settings,
        )
    }
}
