//! Test doubles for router and flow tests.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response, header},
};
use axum_extra::extract::cookie::Key;
use frontdoor_access::{
    Claims, MemorySessionStore, PendingAuthRequest, ProviderDescriptor, SessionTokens,
};
use frontdoor_core::AuthState;
use openidconnect::url::Url;
use rootcause::Report;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::oidc::{AuthorizationRequest, ProviderIdentity};
use crate::auth::{AppState, IdentityProvider, OidcError, SignOutRequest};
use crate::config::ServerConfig;

/// Authorization code the fake provider accepts.
pub const GOOD_CODE: &str = "good-code";

/// Scripted identity provider.
pub struct FakeProvider {
    descriptor: ProviderDescriptor,
    delay: Option<Duration>,
    end_session_endpoint: Option<String>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            descriptor: ServerConfig::default().provider_descriptor(),
            delay: None,
            end_session_endpoint: Some("https://id.example.test/oidc/v1/end_session".to_string()),
        }
    }

    /// Makes every code exchange take `delay`.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Removes the end-session endpoint.
    pub fn without_end_session(mut self) -> Self {
        self.end_session_endpoint = None;
        self
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn authorization_request(&self, state: &AuthState) -> AuthorizationRequest {
        AuthorizationRequest {
            url: format!("https://id.example.test/oauth/v2/authorize?client_id=client-id&state={state}"),
            pkce_verifier: "verifier".to_string(),
            nonce: "nonce".to_string(),
        }
    }

    async fn exchange_code(
        &self,
        code: &str,
        _pending: &PendingAuthRequest,
    ) -> Result<ProviderIdentity, Report<OidcError>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if code != GOOD_CODE {
            return Err(OidcError::TokenExchange("invalid_grant".to_string()).into());
        }

        let claims: Claims = [
            ("sub", "user-1"),
            ("name", "Alice Example"),
            ("email", "alice@example.com"),
        ]
        .into_iter()
        .collect();

        Ok(ProviderIdentity {
            claims,
            tokens: SessionTokens {
                id_token: Some("header.payload.signature".to_string()),
                access_token: Some("access".to_string()),
                refresh_token: None,
            },
        })
    }

    fn end_session_url(
        &self,
        request: &SignOutRequest,
    ) -> Result<Option<String>, Report<OidcError>> {
        let Some(endpoint) = &self.end_session_endpoint else {
            return Ok(None);
        };
        let mut url = Url::parse(endpoint)
            .map_err(|e| OidcError::Configuration(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(hint) = &request.id_token_hint {
                query.append_pair("id_token_hint", hint);
            }
            query.append_pair("client_id", &request.client_id);
            query.append_pair("post_logout_redirect_uri", &request.post_logout_redirect_uri);
        }
        Ok(Some(url.to_string()))
    }
}

/// Builds application state around a provider.
pub fn state_with(provider: FakeProvider, config: ServerConfig) -> AppState {
    AppState::new(
        config,
        Arc::new(provider),
        MemorySessionStore::shared(),
        Key::generate(),
    )
}

/// Builds application state with defaults.
pub fn test_state() -> AppState {
    state_with(FakeProvider::new(), ServerConfig::default())
}

/// Cookie store that behaves like a browser for one origin.
#[derive(Debug, Default, Clone)]
pub struct Browser {
    cookies: BTreeMap<String, String>,
}

impl Browser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every `Set-Cookie` header in the response.
    pub fn absorb<B>(&mut self, response: &Response<B>) {
        for value in response.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().expect("ascii set-cookie");
            let pair = value.split(';').next().unwrap_or_default();
            let (name, cookie_value) = pair.split_once('=').expect("name=value");
            let removed = cookie_value.is_empty() || value.contains("Max-Age=0");
            if removed {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), cookie_value.to_string());
            }
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Builds a request carrying this browser's cookies.
    pub fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        if self.cookies.is_empty() {
            return builder;
        }
        let cookie = self
            .cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        builder.header(header::COOKIE, cookie)
    }

    /// Builds a form POST carrying this browser's cookies.
    pub fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
        let body = serde_urlencoded::to_string(fields).expect("encodable form");
        self.request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("valid request")
    }

    pub fn get(&self, uri: &str) -> Request<Body> {
        self.request("GET", uri)
            .body(Body::empty())
            .expect("valid request")
    }
}

/// Returns the `Location` header of a redirect.
pub fn location<B>(response: &Response<B>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect has a location")
        .to_str()
        .expect("ascii location")
        .to_string()
}

/// Reads a response body as UTF-8.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
