//! Pending sign-in requests.
//!
//! Between the redirect to the provider and its callback the server holds
//! the PKCE verifier, the nonce and the return URL, keyed by the OAuth
//! `state` value. A request is handed out at most once: `take` removes it,
//! so a replayed callback finds nothing.

use chrono::{DateTime, Duration, Utc};
use frontdoor_core::AuthState;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;
use tracing::debug;

/// Where users land after sign-in when they did not ask for anything else.
pub const DEFAULT_RETURN_URL: &str = "/profile";

/// How long a sign-in may sit at the provider before its state is dropped.
pub const PENDING_TTL_MINUTES: i64 = 10;

/// Returns `candidate` if it is a local absolute path, otherwise `/profile`.
///
/// Protocol-relative (`//host`) and backslash (`/\host`) forms are rejected
/// because browsers treat them as off-site.
#[must_use]
pub fn sanitize_return_url(candidate: Option<&str>) -> String {
    match candidate.map(str::trim) {
        Some(url)
            if url.starts_with('/')
                && !url.starts_with("//")
                && !url.starts_with("/\\")
                && !url.chars().any(char::is_control) =>
        {
            url.to_string()
        }
        _ => DEFAULT_RETURN_URL.to_string(),
    }
}

/// State held across the redirect to the provider and back.
#[derive(Clone)]
pub struct PendingAuthRequest {
    /// PKCE code verifier matching the challenge sent to the provider.
    pub pkce_verifier: String,
    /// Nonce expected in the returned ID token.
    pub nonce: String,
    /// Local URL to redirect to once the session exists.
    pub return_url: String,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for PendingAuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAuthRequest")
            .field("return_url", &self.return_url)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl PendingAuthRequest {
    /// Returns true if the request is older than the pending lifetime.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.created_at + Duration::minutes(PENDING_TTL_MINUTES)
    }
}

/// In-process store of pending sign-in requests.
#[derive(Debug, Default)]
pub struct PendingAuthStore {
    requests: RwLock<HashMap<AuthState, PendingAuthRequest>>,
}

impl PendingAuthStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pending request under its state value.
    pub async fn insert(&self, state: AuthState, request: PendingAuthRequest) {
        self.requests.write().await.insert(state, request);
    }

    /// Removes and returns the request for `state`, if it is still live.
    pub async fn take(&self, state: &AuthState) -> Option<PendingAuthRequest> {
        self.take_at(state, Utc::now()).await
    }

    /// Removes and returns the request for `state` if it is live at `now`.
    ///
    /// An expired request is removed as well, but not returned.
    pub async fn take_at(&self, state: &AuthState, now: DateTime<Utc>) -> Option<PendingAuthRequest> {
        let request = self.requests.write().await.remove(state)?;
        if request.is_expired_at(now) {
            debug!("pending sign-in request expired");
            return None;
        }
        Some(request)
    }

    /// Drops every expired request. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut requests = self.requests.write().await;
        let before = requests.len();
        requests.retain(|_, r| !r.is_expired_at(now));
        before - requests.len()
    }

    /// Number of outstanding requests.
    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }
}
