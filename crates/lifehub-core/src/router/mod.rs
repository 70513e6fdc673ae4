//! Client-side routing with an authentication guard.
//!
//! - `RouteTable`: the route tree and path matching
//! - `NavigationGuard`: confirms the session before protected routes
//! - `Router`: resolves a path, runs the guard and follows its redirect

pub mod guard;
pub mod routes;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

pub use guard::{
    decide, login_redirect, GuardDecision, GuardState, NavigationGuard, SessionView, LOGIN_PATH,
    LOGIN_ROUTE, REDIRECT_PARAM,
};
pub use routes::{Location, MatchedRecord, RouteRecord, RouteTable, RouteTarget};

use crate::auth::SessionStore;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("No route matches {0}")]
    NotFound(String),

    #[error("Redirect from {from} to {to} was redirected again")]
    RedirectLoop { from: String, to: String },
}

/// The route a navigation ended on.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub target: RouteTarget,
    /// Path originally requested when the guard redirected
    pub redirected_from: Option<String>,
}

pub struct Router {
    table: RouteTable,
    guard: NavigationGuard,
}

impl Router {
    pub fn new(table: RouteTable, session: Arc<SessionStore>) -> Self {
        Self {
            table,
            guard: NavigationGuard::new(session),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Navigate to `path`, following at most one guard redirect.
    pub async fn navigate(&self, path: &str) -> Result<Navigation, RouterError> {
        let target = self.resolve(path)?;

        let location = match self.guard.check(&target).await {
            GuardDecision::Allow => {
                info!(path = %target.full_path, "Navigated");
                return Ok(Navigation {
                    target,
                    redirected_from: None,
                });
            }
            GuardDecision::Redirect(location) => location,
        };

        let redirect = self.resolve(&location.to_url())?;
        if let GuardDecision::Redirect(_) = self.guard.check(&redirect).await {
            return Err(RouterError::RedirectLoop {
                from: target.full_path,
                to: redirect.full_path,
            });
        }

        info!(from = %target.full_path, to = %redirect.full_path, "Redirected");
        Ok(Navigation {
            target: redirect,
            redirected_from: Some(target.full_path),
        })
    }

    fn resolve(&self, path: &str) -> Result<RouteTarget, RouterError> {
        self.table
            .resolve(path)
            .ok_or_else(|| RouterError::NotFound(path.to_string()))
    }
}
