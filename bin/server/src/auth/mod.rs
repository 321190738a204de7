//! Authentication module for the frontdoor server.
//!
//! This module provides:
//! - The OIDC client adapter and its event hooks
//! - The sign-in / sign-out flow routes
//! - Session middleware and extractors for Axum routes
//! - Anti-forgery token middleware and endpoint
//!
//! Sessions live server-side in a [`SessionManager`]; the browser only holds
//! the session id, inside an encrypted private cookie. Expired, unknown and
//! tampered cookies all look the same: no session.

pub mod cookies;
pub mod csrf;
pub mod events;
pub mod middleware;
pub mod oidc;
pub mod routes;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use frontdoor_access::{CsrfIssuer, PendingAuthStore, SessionManager, SessionStore};
use std::sync::Arc;

use crate::config::ServerConfig;

pub use events::{AuthFlowEvents, OidcEvents, SignOutRequest};
pub use middleware::{CurrentSession, OptionalSession, RequireSession};
pub use oidc::{IdentityProvider, OidcClient, OidcError};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Immutable configuration.
    pub config: Arc<ServerConfig>,
    /// Identity provider adapter.
    pub provider: Arc<dyn IdentityProvider>,
    /// Flow hooks.
    pub events: Arc<dyn OidcEvents>,
    pub sessions: SessionManager,
    /// Sign-ins waiting for their provider callback.
    pub pending: Arc<PendingAuthStore>,
    pub csrf: Arc<CsrfIssuer>,
    /// Key for the private cookie jar.
    key: Key,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        config: ServerConfig,
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn SessionStore>,
        key: Key,
    ) -> Self {
        let events = Arc::new(AuthFlowEvents::new(
            provider.descriptor().post_logout_redirect_uri(),
        ));
        let sessions = SessionManager::new(
            store,
            to_chrono(config.session.duration),
            config.session.sliding,
        );
        let csrf = Arc::new(CsrfIssuer::new(to_chrono(config.csrf_token_lifetime)));

        Self {
            config: Arc::new(config),
            provider,
            events,
            sessions,
            pending: Arc::new(PendingAuthStore::new()),
            csrf,
            key,
        }
    }

    /// Replaces the flow hooks.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn OidcEvents>) -> Self {
        self.events = events;
        self
    }

    /// Returns true if cookies should carry the Secure flag.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.config.session.secure_cookies
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Longest lifetime accepted for sessions and tokens.
const MAX_LIFETIME_DAYS: i64 = 3650;

fn to_chrono(duration: std::time::Duration) -> chrono::Duration {
    let max = chrono::Duration::days(MAX_LIFETIME_DAYS);
    chrono::Duration::from_std(duration).map_or(max, |d| d.min(max))
}
