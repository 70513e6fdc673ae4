//! Authentication guard run before every navigation.

use std::sync::Arc;

use tracing::debug;

use super::routes::{Location, RouteTarget};
use crate::auth::SessionStore;

/// Name of the login route
pub const LOGIN_ROUTE: &str = "Login";

/// Path of the login route
pub const LOGIN_PATH: &str = "/login";

/// Query parameter carrying the path the user was denied
pub const REDIRECT_PARAM: &str = "redirect";

/// Progress of a single navigation attempt through the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unchecked,
    Checking,
    Allowed,
    Redirected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Location),
}

/// What the guard needs to know about the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionView {
    pub has_token: bool,
}

impl SessionView {
    pub fn of(session: &SessionStore) -> Self {
        Self {
            has_token: session.is_authenticated(),
        }
    }
}

/// Login location that returns to `target` afterwards.
pub fn login_redirect(target: &RouteTarget) -> Location {
    Location {
        name: LOGIN_ROUTE.to_string(),
        path: LOGIN_PATH.to_string(),
        query: vec![(REDIRECT_PARAM.to_string(), target.full_path.clone())],
    }
}

/// Decide a navigation from the target and the session as it is now.
///
/// A protected target with a token is allowed here; the guard confirms the
/// token with the backend before trusting that answer.
pub fn decide(target: &RouteTarget, session: SessionView) -> GuardDecision {
    if !target.requires_auth() || session.has_token {
        GuardDecision::Allow
    } else {
        GuardDecision::Redirect(login_redirect(target))
    }
}

pub struct NavigationGuard {
    session: Arc<SessionStore>,
}

impl NavigationGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Run the guard for one navigation attempt.
    ///
    /// Public targets are allowed without contacting the backend. Protected
    /// targets need a token that `/auth/me` still accepts; otherwise the
    /// user is sent to the login route with the requested path attached.
    pub async fn check(&self, target: &RouteTarget) -> GuardDecision {
        let mut state = GuardState::Unchecked;
        debug!(path = %target.full_path, ?state, "Navigation started");

        if !target.requires_auth() {
            state = GuardState::Allowed;
            debug!(path = %target.full_path, ?state, "Public route");
            return GuardDecision::Allow;
        }

        if let redirect @ GuardDecision::Redirect(_) = decide(target, SessionView::of(&self.session)) {
            state = GuardState::Redirected;
            debug!(path = %target.full_path, ?state, "No token for protected route");
            return redirect;
        }

        state = GuardState::Checking;
        debug!(path = %target.full_path, ?state, "Confirming session");
        self.session.fetch_user().await;

        let decision = decide(target, SessionView::of(&self.session));
        state = match decision {
            GuardDecision::Allow => GuardState::Allowed,
            GuardDecision::Redirect(_) => GuardState::Redirected,
        };
        debug!(path = %target.full_path, ?state, "Navigation decided");
        decision
    }
}
