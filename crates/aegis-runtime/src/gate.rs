//! Route and feature gate.
//!
//! A [`RouteGate`] is mounted once per protected view. Each time the view
//! renders it hands the gate the latest [`AccessSnapshot`]; the gate
//! re-evaluates only when an access-relevant input changed (session
//! presence, identity, role or tier) and otherwise returns its cached
//! terminal state.

use crate::config::GateConfig;
use crate::sync::{AccessSnapshot, TierView};
use aegis_auth::{AccessDenied, AccessRequirement, RoleService, SessionRecord};
use aegis_types::{Email, Role};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// State of a [`RouteGate`].
///
/// # State Transitions
///
/// | From | To | When |
/// |------|----|------|
/// | Checking | Redirecting | no session |
/// | Checking | Verifying | session present |
/// | Verifying | Granted | every requirement met |
/// | Verifying | Redirecting | a requirement failed (notice emitted) |
///
/// `Granted` and `Redirecting` are terminal until an input changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Not yet evaluated.
    Checking,

    /// Session present; role and tier checks in progress.
    Verifying,

    /// The protected view may render.
    Granted,

    /// The visitor must be sent elsewhere.
    Redirecting {
        /// Route to navigate to.
        to: String,
        /// Why access was refused.
        reason: AccessDenied,
    },
}

impl GateState {
    /// Returns `true` for `Granted` and `Redirecting`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Granted | Self::Redirecting { .. })
    }

    /// Returns `true` if access was granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Returns the redirect target, if redirecting.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Redirecting { to, .. } => Some(to),
            _ => None,
        }
    }
}

/// "Access denied" notice for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateNotice {
    /// Name of the gate that denied.
    pub gate: String,
    /// Why.
    pub reason: AccessDenied,
}

/// Redirect targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRoutes {
    /// Target when no session exists.
    pub login: String,
    /// Target when verification fails.
    pub denied: String,
}

impl From<&GateConfig> for GateRoutes {
    fn from(config: &GateConfig) -> Self {
        Self {
            login: config.login_route.clone(),
            denied: config.denied_route.clone(),
        }
    }
}

impl Default for GateRoutes {
    fn default() -> Self {
        Self::from(&GateConfig::default())
    }
}

/// Inputs that can change a gate's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AccessKey {
    identity: Option<(Email, Role)>,
    tier: TierView,
}

impl AccessKey {
    fn of(snapshot: &AccessSnapshot) -> Self {
        Self {
            identity: snapshot
                .session
                .as_ref()
                .map(|s| (s.email.clone(), s.role)),
            tier: snapshot.tier.clone(),
        }
    }
}

/// Per-mount access state machine.
///
/// # Example
///
/// ```
/// use aegis_auth::{AccessRequirement, Entitlement};
/// use aegis_runtime::gate::{GateRoutes, RouteGate};
/// use aegis_runtime::sync::AccessSnapshot;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let mut gate = RouteGate::new(
///     "neural-lab",
///     AccessRequirement::feature(Entitlement::NEURAL_LAB),
///     GateRoutes::default(),
/// );
///
/// let state = gate.evaluate(&AccessSnapshot::signed_out()).await;
/// assert_eq!(state.redirect_target(), Some("/login"));
/// # });
/// ```
pub struct RouteGate {
    name: String,
    requirement: AccessRequirement,
    routes: GateRoutes,
    role_service: Option<Arc<dyn RoleService>>,
    notices: Option<mpsc::UnboundedSender<GateNotice>>,
    state: GateState,
    key: Option<AccessKey>,
    evaluations: u64,
}

impl RouteGate {
    /// Creates a gate in [`GateState::Checking`].
    #[must_use]
    pub fn new(name: impl Into<String>, requirement: AccessRequirement, routes: GateRoutes) -> Self {
        Self {
            name: name.into(),
            requirement,
            routes,
            role_service: None,
            notices: None,
            state: GateState::Checking,
            key: None,
            evaluations: 0,
        }
    }

    /// Verifies roles against a remote service instead of the session
    /// record.
    #[must_use]
    pub fn with_role_service(mut self, service: Arc<dyn RoleService>) -> Self {
        self.role_service = Some(service);
        self
    }

    /// Sends a [`GateNotice`] on every denial after verification.
    #[must_use]
    pub fn with_notices(mut self, notices: mpsc::UnboundedSender<GateNotice>) -> Self {
        self.notices = Some(notices);
        self
    }

    /// Gate name used in logs and notices.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The requirement being enforced.
    #[must_use]
    pub fn requirement(&self) -> &AccessRequirement {
        &self.requirement
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Number of full evaluations performed since mount.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Evaluates `snapshot`, or returns the cached state if nothing
    /// access-relevant changed since the last completed evaluation.
    ///
    /// If the returned future is dropped mid-verification the gate is left
    /// in `Verifying` and the next call evaluates again.
    pub async fn evaluate(&mut self, snapshot: &AccessSnapshot) -> &GateState {
        let key = AccessKey::of(snapshot);
        if self.state.is_terminal() && self.key.as_ref() == Some(&key) {
            return &self.state;
        }

        self.key = Some(key);
        self.evaluations += 1;
        self.state = GateState::Checking;

        let Some(session) = snapshot.session.as_ref() else {
            debug!(gate = %self.name, "No session, redirecting to login");
            self.state = GateState::Redirecting {
                to: self.routes.login.clone(),
                reason: AccessDenied::NotAuthenticated,
            };
            return &self.state;
        };

        self.state = GateState::Verifying;
        self.state = match self.verify(session, &snapshot.tier).await {
            Ok(()) => {
                debug!(gate = %self.name, email = %session.email, "Access granted");
                GateState::Granted
            }
            Err(reason) => {
                warn!(
                    gate = %self.name,
                    email = %session.email,
                    layer = reason.layer(),
                    %reason,
                    "Access denied"
                );
                self.notify(&reason);
                GateState::Redirecting {
                    to: self.routes.denied.clone(),
                    reason,
                }
            }
        };
        &self.state
    }

    async fn verify(&self, session: &SessionRecord, tier: &TierView) -> Result<(), AccessDenied> {
        if let Some(required) = self.requirement.min_role {
            let actual = match &self.role_service {
                Some(service) => remote_role(service.as_ref(), required).await?,
                None => session.role,
            };
            self.requirement.check_role(actual)?;
        }

        if self.requirement.needs_tier() {
            match tier {
                TierView::Active(tier) => self.requirement.check_tier(*tier)?,
                TierView::Unreadable(reason) => {
                    return Err(AccessDenied::VerificationFailed(reason.clone()))
                }
                TierView::SignedOut => return Err(AccessDenied::NotAuthenticated),
            }
        }

        Ok(())
    }

    fn notify(&self, reason: &AccessDenied) {
        if let Some(notices) = &self.notices {
            // A closed receiver means nobody is showing notices.
            let _ = notices.send(GateNotice {
                gate: self.name.clone(),
                reason: reason.clone(),
            });
        }
    }
}

impl std::fmt::Debug for RouteGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGate")
            .field("name", &self.name)
            .field("requirement", &self.requirement)
            .field("state", &self.state)
            .field("remote_roles", &self.role_service.is_some())
            .field("evaluations", &self.evaluations)
            .finish_non_exhaustive()
    }
}

/// Asks the remote service for the caller's role. Errors count as a
/// failed check and are not retried.
async fn remote_role(service: &dyn RoleService, required: Role) -> Result<Role, AccessDenied> {
    let answer = if required.is_admin() {
        service
            .is_admin()
            .await
            .map(|admin| if admin { Role::Admin } else { Role::User })
    } else {
        service.get_caller_role().await
    };
    answer.map_err(|e| AccessDenied::VerificationFailed(e.to_string()))
}
