//! Session management for authenticated browsers.
//!
//! A session is created after a provider callback fully succeeds and is
//! addressed by an opaque random `SessionId`. The server crate carries that
//! id in an encrypted cookie; everything else stays server-side.
//!
//! Expired, revoked, unknown and unreadable sessions all look the same to
//! callers: `resolve` returns `None`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use frontdoor_core::SessionId;
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::claims::Claims;
use crate::error::SessionStoreError;

/// Provider tokens kept with a session for sign-out and API calls.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Raw ID token, sent as `id_token_hint` on sign-out.
    pub id_token: Option<String>,
    /// OAuth access token.
    pub access_token: Option<String>,
    /// OAuth refresh token (requested through `offline_access`).
    pub refresh_token: Option<String>,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("id_token", &self.id_token.as_ref().map(|_| "[redacted]"))
            .field("access_token", &self.access_token.as_ref().map(|_| "[redacted]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// An authenticated browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    claims: Claims,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    sliding: bool,
    tokens: SessionTokens,
}

impl Session {
    /// Creates a session issued at `now` that lives for `duration`.
    #[must_use]
    pub fn new(
        id: SessionId,
        claims: Claims,
        tokens: SessionTokens,
        duration: Duration,
        sliding: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            claims,
            issued_at: now,
            expires_at: now + duration,
            sliding,
            tokens,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true if activity extends this session.
    #[must_use]
    pub fn sliding(&self) -> bool {
        self.sliding
    }

    #[must_use]
    pub fn tokens(&self) -> &SessionTokens {
        &self.tokens
    }

    /// Returns true if the session is expired at the given instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns true if the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Moves the expiry to `now + duration`.
    pub fn renew(&mut self, now: DateTime<Utc>, duration: Duration) {
        self.expires_at = now + duration;
    }
}

/// Backing storage for sessions.
///
/// Implementations must tolerate concurrent calls from independent request
/// tasks; no ordering between requests is assumed.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a new session.
    async fn insert(&self, session: Session) -> Result<(), Report<SessionStoreError>>;

    /// Looks up a session, expired or not.
    async fn get(&self, id: &SessionId) -> Result<Option<Session>, Report<SessionStoreError>>;

    /// Updates a session's expiry. Returns false if the session is gone.
    async fn set_expiry(
        &self,
        id: &SessionId,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, Report<SessionStoreError>>;

    /// Removes a session, returning it if it existed.
    async fn remove(&self, id: &SessionId) -> Result<Option<Session>, Report<SessionStoreError>>;

    /// Removes every session expired at `now`. Returns how many were removed.
    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<usize, Report<SessionStoreError>>;
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store behind an `Arc`.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of stored sessions, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: Session) -> Result<(), Report<SessionStoreError>> {
        self.sessions
            .write()
            .await
            .insert(session.id().clone(), session);
        Ok(())
    }

    async fn get(&self, id: &SessionId) -> Result<Option<Session>, Report<SessionStoreError>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn set_expiry(
        &self,
        id: &SessionId,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, Report<SessionStoreError>> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) => {
                session.expires_at = expires_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: &SessionId) -> Result<Option<Session>, Report<SessionStoreError>> {
        Ok(self.sessions.write().await.remove(id))
    }

    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<usize, Report<SessionStoreError>> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        Ok(before - sessions.len())
    }
}

/// Owns the session lifecycle: creation, sliding renewal and invalidation.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    duration: Duration,
    sliding: bool,
}

impl SessionManager {
    /// Creates a manager over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, duration: Duration, sliding: bool) -> Self {
        Self {
            store,
            duration,
            sliding,
        }
    }

    /// Returns the configured session lifetime.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns true if new sessions use sliding renewal.
    #[must_use]
    pub fn sliding(&self) -> bool {
        self.sliding
    }

    /// Mints a new session for the given claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the session.
    pub async fn create(
        &self,
        claims: Claims,
        tokens: SessionTokens,
    ) -> Result<SessionId, Report<SessionStoreError>> {
        self.create_at(claims, tokens, Utc::now()).await
    }

    /// Mints a new session issued at the given instant.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the session.
    pub async fn create_at(
        &self,
        claims: Claims,
        tokens: SessionTokens,
        now: DateTime<Utc>,
    ) -> Result<SessionId, Report<SessionStoreError>> {
        let id = SessionId::generate();
        let session = Session::new(id.clone(), claims, tokens, self.duration, self.sliding, now);
        self.store.insert(session).await?;
        debug!(expires_in_secs = self.duration.num_seconds(), "session created");
        Ok(id)
    }

    /// Resolves a presented session id.
    pub async fn resolve(&self, id: &SessionId) -> Option<Session> {
        self.resolve_at(id, Utc::now()).await
    }

    /// Resolves a presented session id at the given instant.
    ///
    /// Expired sessions are removed. Live sliding sessions have their expiry
    /// moved to `now + duration` before they are returned.
    pub async fn resolve_at(&self, id: &SessionId, now: DateTime<Utc>) -> Option<Session> {
        let mut session = match self.store.get(id).await {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "session lookup failed");
                return None;
            }
        };

        if session.is_expired_at(now) {
            debug!("session expired");
            if let Err(e) = self.store.remove(id).await {
                warn!(error = %e, "failed to remove expired session");
            }
            return None;
        }

        if !session.sliding() {
            return Some(session);
        }

        session.renew(now, self.duration);
        match self.store.set_expiry(id, session.expires_at()).await {
            Ok(true) => Some(session),
            // Invalidated between lookup and renewal.
            Ok(false) => None,
            Err(e) => {
                warn!(error = %e, "session renewal failed");
                None
            }
        }
    }

    /// Destroys a session. Returns the session if it was live in the store.
    pub async fn invalidate(&self, id: &SessionId) -> Option<Session> {
        match self.store.remove(id).await {
            Ok(removed) => {
                if removed.is_some() {
                    debug!("session invalidated");
                }
                removed
            }
            Err(e) => {
                warn!(error = %e, "session invalidation failed");
                None
            }
        }
    }

    /// Removes all expired sessions. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        match self.store.remove_expired(Utc::now()).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "failed to purge expired sessions");
                0
            }
        }
    }
}
