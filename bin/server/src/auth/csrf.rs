//! Anti-forgery token endpoint and request guard.
//!
//! Each browser gets a random client id in the private `csrf` cookie. Tokens
//! are bound to that id and to the session current at issue time. Guarded
//! routes accept the token from the `X-CSRF-TOKEN` header or from the
//! `csrfToken` form field, and reject the request with 403 before the
//! handler runs if it does not validate.

use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use frontdoor_access::{CsrfBinding, CsrfError, CsrfToken, Session};
use frontdoor_core::CsrfClientId;
use serde::Serialize;
use tracing::warn;

use super::{
    AppState,
    cookies::{self, CSRF_COOKIE},
    middleware::{CurrentSession, OptionalSession},
};

/// Request header carrying the token.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Form field carrying the token.
pub const CSRF_FORM_FIELD: &str = "csrfToken";

/// Largest form body buffered while looking for the token.
const MAX_FORM_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CsrfTokenResponse {
    csrf_token: String,
}

fn client_id(jar: &PrivateCookieJar) -> Option<CsrfClientId> {
    jar.get(CSRF_COOKIE).and_then(|c| c.value().parse().ok())
}

/// Issues a token for this browser, setting its client id cookie if needed.
pub async fn issue_token(
    state: &AppState,
    jar: PrivateCookieJar,
    session: Option<&Session>,
) -> (PrivateCookieJar, CsrfToken) {
    let (jar, client) = match client_id(&jar) {
        Some(client) => (jar, client),
        None => {
            let client = CsrfClientId::generate();
            let jar = jar.add(cookies::csrf_cookie(&client, state.secure_cookies()));
            (jar, client)
        }
    };

    let binding = CsrfBinding {
        client,
        session: session.map(|s| s.id().clone()),
    };
    let token = state.csrf.issue(&binding).await;
    (jar, token)
}

/// `GET /auth/csrf`: returns a fresh token as JSON.
pub async fn csrf_token(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    OptionalSession(session): OptionalSession,
) -> impl IntoResponse {
    let (jar, token) = issue_token(&state, jar, session.as_ref()).await;

    (
        jar,
        [
            (header::CACHE_CONTROL, "no-cache, no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(CsrfTokenResponse {
            csrf_token: token.value.as_str().to_string(),
        }),
    )
}

/// Rejects the request unless it carries a valid token for this browser.
pub async fn require_csrf(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let header_token = parts
        .headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (presented, body) = match header_token {
        Some(token) => (Some(token), body),
        None if is_form(&parts.headers) => match axum::body::to_bytes(body, MAX_FORM_BYTES).await {
            Ok(bytes) => (form_token(&bytes), Body::from(bytes)),
            Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
        },
        None => (None, body),
    };

    let session = parts
        .extensions
        .get::<CurrentSession>()
        .and_then(|current| current.0.as_ref())
        .map(|s| s.id().clone());

    let result = match client_id(&jar) {
        Some(client) => {
            let binding = CsrfBinding { client, session };
            state.csrf.validate(presented.as_deref(), &binding).await
        }
        None if presented.is_none() => Err(CsrfError::Missing),
        None => Err(CsrfError::BindingMismatch),
    };

    if let Err(reason) = result {
        warn!(%reason, path = parts.uri.path(), "rejected request with invalid anti-forgery token");
        return (StatusCode::FORBIDDEN, "Invalid anti-forgery token").into_response();
    }

    next.run(Request::from_parts(parts, body)).await
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

fn form_token(body: &[u8]) -> Option<String> {
    serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
        .ok()?
        .into_iter()
        .find(|(name, _)| name == CSRF_FORM_FIELD)
        .map(|(_, value)| value)
}
