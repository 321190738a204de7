//! Anti-forgery tokens for state-changing requests.
//!
//! Tokens are random values held server-side together with their binding:
//! the browser's anti-forgery client id and the session that was current
//! when the token was issued. A token only validates for the same binding
//! and inside its validity window. Every token call mints a new value, so
//! several tokens for one binding may be valid at once.

use chrono::{DateTime, Duration, Utc};
use frontdoor_core::{CsrfClientId, CsrfTokenValue, SessionId};
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::CsrfError;

/// What a token is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfBinding {
    /// Per-browser id from the anti-forgery cookie.
    pub client: CsrfClientId,
    /// Session resolved for the request, if any.
    pub session: Option<SessionId>,
}

impl CsrfBinding {
    /// Creates a binding for an anonymous browser.
    #[must_use]
    pub fn anonymous(client: CsrfClientId) -> Self {
        Self {
            client,
            session: None,
        }
    }

    /// Creates a binding for a browser with a session.
    #[must_use]
    pub fn for_session(client: CsrfClientId, session: SessionId) -> Self {
        Self {
            client,
            session: Some(session),
        }
    }

    fn matches(&self, other: &CsrfBinding) -> bool {
        let client_eq: bool = self
            .client
            .as_str()
            .as_bytes()
            .ct_eq(other.client.as_str().as_bytes())
            .into();
        let session_eq = match (&self.session, &other.session) {
            (Some(a), Some(b)) => a.as_str().as_bytes().ct_eq(b.as_str().as_bytes()).into(),
            (None, None) => true,
            _ => false,
        };
        client_eq && session_eq
    }
}

/// A freshly issued token.
#[derive(Debug, Clone)]
pub struct CsrfToken {
    pub value: CsrfTokenValue,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
struct TokenRecord {
    binding: CsrfBinding,
    expires_at: DateTime<Utc>,
}

/// Issues and validates anti-forgery tokens.
#[derive(Debug)]
pub struct CsrfIssuer {
    lifetime: Duration,
    tokens: RwLock<HashMap<CsrfTokenValue, TokenRecord>>,
}

impl CsrfIssuer {
    /// Creates an issuer whose tokens live for `lifetime`.
    #[must_use]
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Issues a new token for the binding.
    pub async fn issue(&self, binding: &CsrfBinding) -> CsrfToken {
        self.issue_at(binding, Utc::now()).await
    }

    /// Issues a new token for the binding at the given instant.
    pub async fn issue_at(&self, binding: &CsrfBinding, now: DateTime<Utc>) -> CsrfToken {
        let value = CsrfTokenValue::generate();
        let expires_at = now + self.lifetime;
        self.tokens.write().await.insert(
            value.clone(),
            TokenRecord {
                binding: binding.clone(),
                expires_at,
            },
        );
        debug!(bound_to_session = binding.session.is_some(), "issued anti-forgery token");
        CsrfToken { value, expires_at }
    }

    /// Validates a presented token against the request's binding.
    ///
    /// # Errors
    ///
    /// Returns the reason the token was rejected.
    pub async fn validate(
        &self,
        presented: Option<&str>,
        binding: &CsrfBinding,
    ) -> Result<(), CsrfError> {
        self.validate_at(presented, binding, Utc::now()).await
    }

    /// Validates a presented token at the given instant.
    ///
    /// # Errors
    ///
    /// Returns the reason the token was rejected.
    pub async fn validate_at(
        &self,
        presented: Option<&str>,
        binding: &CsrfBinding,
        now: DateTime<Utc>,
    ) -> Result<(), CsrfError> {
        let presented = presented
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CsrfError::Missing)?;
        let value: CsrfTokenValue = presented.parse().map_err(|_| CsrfError::Unknown)?;

        let tokens = self.tokens.read().await;
        let record = tokens.get(&value).ok_or(CsrfError::Unknown)?;

        if now >= record.expires_at {
            warn!("anti-forgery token expired");
            return Err(CsrfError::Expired);
        }

        if !record.binding.matches(binding) {
            warn!("anti-forgery token binding mismatch");
            return Err(CsrfError::BindingMismatch);
        }

        Ok(())
    }

    /// Revokes every token bound to the session. Returns how many were revoked.
    pub async fn revoke_session(&self, session: &SessionId) -> usize {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, record| record.binding.session.as_ref() != Some(session));
        before - tokens.len()
    }

    /// Drops every expired token. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, record| now < record.expires_at);
        before - tokens.len()
    }
}
