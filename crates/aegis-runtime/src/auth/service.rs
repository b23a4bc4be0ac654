//! Sign-up, sign-in and sign-out.

use crate::config::LatencyConfig;
use crate::ghost::GhostMode;
use crate::registry::UserRegistry;
use crate::session::SessionStore;
use crate::telemetry::{TelemetryKind, TelemetryLog};
use aegis_auth::{AuthError, SessionRecord};
use std::time::Duration;
use tracing::{info, warn};

/// The tab's authentication flow.
///
/// Sign-up and sign-in wait a fixed simulated latency before touching
/// storage. The wait is not cancellable from inside; dropping the
/// returned future (the view unmounted) abandons the call before any
/// state is written.
#[derive(Debug, Clone)]
pub struct AuthService {
    registry: UserRegistry,
    sessions: SessionStore,
    telemetry: TelemetryLog,
    ghost_mode: GhostMode,
    latency: LatencyConfig,
}

impl AuthService {
    /// Creates the service over a tab's stores.
    #[must_use]
    pub fn new(
        registry: UserRegistry,
        sessions: SessionStore,
        telemetry: TelemetryLog,
        ghost_mode: GhostMode,
        latency: LatencyConfig,
    ) -> Self {
        Self {
            registry,
            sessions,
            telemetry,
            ghost_mode,
            latency,
        }
    }

    /// Registers a new account after the sign-up delay.
    ///
    /// Does not sign in.
    ///
    /// # Errors
    ///
    /// - [`AuthError::DuplicateEmail`] if the email is taken
    /// - [`AuthError::StorageUnavailable`] if the registry cannot be written
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        delay(self.latency.sign_up()).await;
        self.registry.register(name, email, password)
    }

    /// Checks credentials after the sign-in delay and starts a session.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] for any unknown email or wrong
    ///   password, without saying which
    /// - [`AuthError::StorageUnavailable`] if storage cannot be used
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionRecord, AuthError> {
        delay(self.latency.sign_in()).await;

        let user = self
            .registry
            .try_authenticate(email, password)?
            .ok_or_else(|| {
                warn!("Sign-in rejected");
                AuthError::InvalidCredentials
            })?;

        let session = self.sessions.start_session(&user)?;
        self.telemetry
            .push(format!("Signed in as {}", session.name), TelemetryKind::Success);
        Ok(session)
    }

    /// Ends the session and resets per-tab state.
    ///
    /// Idempotent. Tiers and the registry are untouched.
    pub fn sign_out(&self) {
        self.sessions.end_session();
        self.telemetry.clear();
        self.ghost_mode.reset();
        info!("Signed out");
    }
}

async fn delay(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
