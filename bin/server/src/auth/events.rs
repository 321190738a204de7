//! Hooks the sign-in flow calls at its provider-facing decision points.
//!
//! The controller invokes these synchronously and follows whatever they
//! return, so the redirect targets for failed sign-ins and the post-logout
//! destination are decided in one place.

use frontdoor_access::messages::{ACCESS_DENIED, OAUTH_CALLBACK};
use tracing::warn;

/// Parameters of an RP-initiated sign-out at the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct SignOutRequest {
    /// ID token of the ending session, if one was kept.
    pub id_token_hint: Option<String>,
    pub client_id: String,
    /// Where the provider should send the browser afterwards.
    pub post_logout_redirect_uri: String,
}

impl std::fmt::Debug for SignOutRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignOutRequest")
            .field("id_token_hint", &self.id_token_hint.as_ref().map(|_| "[redacted]"))
            .field("client_id", &self.client_id)
            .field("post_logout_redirect_uri", &self.post_logout_redirect_uri)
            .finish()
    }
}

/// Callbacks for the provider round-trip.
pub trait OidcEvents: Send + Sync {
    /// Called when the callback cannot complete. Returns the redirect target.
    fn on_remote_failure(&self, reason: &str) -> String;

    /// Called when the provider reports that access was denied. Returns the
    /// redirect target.
    fn on_access_denied(&self) -> String;

    /// Called before the browser is sent to the provider's end-session
    /// endpoint.
    fn on_sign_out_redirect(&self, request: &mut SignOutRequest);
}

/// Routes flow failures to the error page and pins the post-logout target.
#[derive(Debug, Clone)]
pub struct AuthFlowEvents {
    post_logout_redirect_uri: String,
}

impl AuthFlowEvents {
    #[must_use]
    pub fn new(post_logout_redirect_uri: impl Into<String>) -> Self {
        Self {
            post_logout_redirect_uri: post_logout_redirect_uri.into(),
        }
    }
}

impl OidcEvents for AuthFlowEvents {
    fn on_remote_failure(&self, reason: &str) -> String {
        warn!(reason, "sign-in callback failed");
        format!("/auth/error?error={OAUTH_CALLBACK}")
    }

    fn on_access_denied(&self) -> String {
        warn!("identity provider denied access");
        format!("/auth/error?error={ACCESS_DENIED}")
    }

    fn on_sign_out_redirect(&self, request: &mut SignOutRequest) {
        request
            .post_logout_redirect_uri
            .clone_from(&self.post_logout_redirect_uri);
    }
}
