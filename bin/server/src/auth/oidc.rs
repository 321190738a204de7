//! OIDC client implementation using the openidconnect crate.
//!
//! The flow controller talks to the provider only through
//! [`IdentityProvider`], so tests can substitute a scripted provider.

use async_trait::async_trait;
use frontdoor_access::{Claims, PendingAuthRequest, ProviderDescriptor, SessionTokens};
use frontdoor_core::AuthState;
use openidconnect::core::{CoreAuthenticationFlow, CoreClient};
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointMaybeSet, EndpointNotSet,
    EndpointSet, IssuerUrl, Nonce, OAuth2TokenResponse, PkceCodeChallenge, PkceCodeVerifier,
    PostLogoutRedirectUrl, ProviderMetadataWithLogout, RedirectUrl, Scope, TokenResponse,
};
use rootcause::Report;
use std::time::Duration;
use tracing::{debug, info};

use super::events::SignOutRequest;

/// Client as configured from discovered metadata.
type DiscoveredClient = CoreClient<
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;

/// Where to send the browser to start sign-in, and what to remember.
#[derive(Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub pkce_verifier: String,
    pub nonce: String,
}

/// What a successful callback yields.
#[derive(Debug, Clone)]
pub struct ProviderIdentity {
    pub claims: Claims,
    pub tokens: SessionTokens,
}

/// The identity provider as seen by the sign-in flow.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the static provider description.
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Builds the authorize URL for a new sign-in carrying `state`.
    fn authorization_request(&self, state: &AuthState) -> AuthorizationRequest;

    /// Redeems an authorization code and fetches the user's claims.
    async fn exchange_code(
        &self,
        code: &str,
        pending: &PendingAuthRequest,
    ) -> Result<ProviderIdentity, Report<OidcError>>;

    /// Builds the provider's end-session URL, or `None` if the provider
    /// does not advertise one.
    fn end_session_url(&self, request: &SignOutRequest)
    -> Result<Option<String>, Report<OidcError>>;
}

/// OIDC client for authenticating users.
pub struct OidcClient {
    provider_metadata: ProviderMetadataWithLogout,
    client_id: ClientId,
    client_secret: ClientSecret,
    redirect_url: RedirectUrl,
    http_client: reqwest::Client,
    descriptor: ProviderDescriptor,
}

impl OidcClient {
    /// Creates a new OIDC client by discovering the provider metadata.
    ///
    /// Every request to the provider, including this one, is bounded by
    /// `timeout`.
    pub async fn discover(
        descriptor: ProviderDescriptor,
        timeout: Duration,
    ) -> Result<Self, Report<OidcError>> {
        let issuer_url = IssuerUrl::new(descriptor.authority().to_string())
            .map_err(|e| OidcError::Configuration(format!("invalid issuer URL: {e}")))?;

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| OidcError::Configuration(format!("failed to create HTTP client: {e}")))?;

        let provider_metadata = ProviderMetadataWithLogout::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| OidcError::Discovery(format!("failed to discover provider: {e}")))?;

        let redirect_url = RedirectUrl::new(descriptor.redirect_uri().to_string())
            .map_err(|e| OidcError::Configuration(format!("invalid redirect URI: {e}")))?;

        info!(
            issuer = descriptor.authority(),
            end_session = provider_metadata
                .additional_metadata()
                .end_session_endpoint
                .is_some(),
            "discovered identity provider"
        );

        Ok(Self {
            provider_metadata,
            client_id: ClientId::new(descriptor.client_id().to_string()),
            client_secret: ClientSecret::new(descriptor.client_secret().to_string()),
            redirect_url,
            http_client,
            descriptor,
        })
    }

    fn client(&self) -> DiscoveredClient {
        CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone())
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<Claims, Report<OidcError>> {
        let endpoint = self
            .provider_metadata
            .userinfo_endpoint()
            .ok_or_else(|| OidcError::UserInfo("provider has no user-info endpoint".to_string()))?;

        let object: serde_json::Map<String, serde_json::Value> = self
            .http_client
            .get(endpoint.url().as_str())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OidcError::UserInfo(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| OidcError::UserInfo(format!("provider rejected request: {e}")))?
            .json()
            .await
            .map_err(|e| OidcError::UserInfo(format!("malformed response: {e}")))?;

        Ok(Claims::from_json_object(object))
    }
}

#[async_trait]
impl IdentityProvider for OidcClient {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn authorization_request(&self, state: &AuthState) -> AuthorizationRequest {
        let client = self.client();
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let state_value = state.as_str().to_string();
        let mut auth_request = client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                move || CsrfToken::new(state_value),
                Nonce::new_random,
            )
            .set_pkce_challenge(pkce_challenge);

        // `openid` is always sent by the client itself
        for scope in self.descriptor.scopes().iter().filter(|s| *s != "openid") {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        let (auth_url, _state, nonce) = auth_request.url();

        AuthorizationRequest {
            url: auth_url.to_string(),
            pkce_verifier: pkce_verifier.secret().clone(),
            nonce: nonce.secret().clone(),
        }
    }

    async fn exchange_code(
        &self,
        code: &str,
        pending: &PendingAuthRequest,
    ) -> Result<ProviderIdentity, Report<OidcError>> {
        let client = self.client();

        let token_response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| OidcError::TokenExchange(format!("token endpoint error: {e}")))?
            .set_pkce_verifier(PkceCodeVerifier::new(pending.pkce_verifier.clone()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| OidcError::TokenExchange(format!("token exchange failed: {e}")))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| OidcError::TokenExchange("no ID token in response".to_string()))?;

        let nonce = Nonce::new(pending.nonce.clone());
        let id_claims = id_token
            .claims(&client.id_token_verifier(), &nonce)
            .map_err(|e| OidcError::TokenValidation(format!("ID token validation failed: {e}")))?;
        let subject = id_claims.subject().as_str().to_string();

        // Keep the raw JWT for `id_token_hint` on sign-out
        let raw_id_token = serde_json::to_value(&token_response)
            .ok()
            .and_then(|v| v.get("id_token").and_then(|t| t.as_str()).map(str::to_string));

        let access_token = token_response.access_token().secret().clone();
        let claims = self.fetch_user_info(&access_token).await?;

        if claims.subject() != Some(subject.as_str()) {
            return Err(OidcError::TokenValidation(
                "user-info subject does not match ID token".to_string(),
            )
            .into());
        }

        debug!(claim_count = claims.len(), "fetched user-info claims");

        Ok(ProviderIdentity {
            claims,
            tokens: SessionTokens {
                id_token: raw_id_token,
                access_token: Some(access_token),
                refresh_token: token_response.refresh_token().map(|t| t.secret().clone()),
            },
        })
    }

    fn end_session_url(
        &self,
        request: &SignOutRequest,
    ) -> Result<Option<String>, Report<OidcError>> {
        let Some(endpoint) = self
            .provider_metadata
            .additional_metadata()
            .end_session_endpoint
            .as_ref()
        else {
            return Ok(None);
        };

        let post_logout = PostLogoutRedirectUrl::new(request.post_logout_redirect_uri.clone())
            .map_err(|e| OidcError::Configuration(format!("invalid post-logout URI: {e}")))?;

        let mut url = endpoint.url().clone();
        {
            let mut query = url.query_pairs_mut();
            if let Some(hint) = &request.id_token_hint {
                query.append_pair("id_token_hint", hint);
            }
            query.append_pair("client_id", &request.client_id);
            query.append_pair("post_logout_redirect_uri", post_logout.as_str());
        }

        Ok(Some(url.to_string()))
    }
}

/// OIDC-related errors.
#[derive(Debug)]
pub enum OidcError {
    /// Configuration error (invalid URLs, etc.)
    Configuration(String),
    /// Failed to discover provider metadata.
    Discovery(String),
    /// Token exchange failed.
    TokenExchange(String),
    /// Token validation failed.
    TokenValidation(String),
    /// Fetching claims from the user-info endpoint failed.
    UserInfo(String),
}

impl std::fmt::Display for OidcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "OIDC configuration error: {msg}"),
            Self::Discovery(msg) => write!(f, "OIDC discovery error: {msg}"),
            Self::TokenExchange(msg) => write!(f, "OIDC token exchange error: {msg}"),
            Self::TokenValidation(msg) => write!(f, "OIDC token validation error: {msg}"),
            Self::UserInfo(msg) => write!(f, "OIDC user-info error: {msg}"),
        }
    }
}

impl std::error::Error for OidcError {}
