//! Cookies set by the sign-in flow.
//!
//! All of them travel through the private cookie jar, so their values are
//! encrypted and authenticated with the server key. A cookie that fails to
//! decrypt is simply absent.

use axum_extra::extract::cookie::{Cookie, SameSite};
use frontdoor_access::pending::PENDING_TTL_MINUTES;
use frontdoor_core::{AuthState, CsrfClientId, SessionId};
use time::Duration;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Auth state cookie name (binds the provider round-trip to this browser).
pub const AUTH_STATE_COOKIE: &str = "auth_state";

/// Anti-forgery client id cookie name.
pub const CSRF_COOKIE: &str = "csrf";

fn private_cookie(name: &'static str, value: String, secure: bool, max_age: Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Create session cookie.
pub fn session_cookie(id: &SessionId, max_age: std::time::Duration, secure: bool) -> Cookie<'static> {
    let max_age = Duration::try_from(max_age).unwrap_or(Duration::MAX);
    private_cookie(SESSION_COOKIE, id.as_str().to_string(), secure, max_age)
}

/// Create the cookie that ties a pending sign-in to this browser.
pub fn auth_state_cookie(state: &AuthState, secure: bool) -> Cookie<'static> {
    private_cookie(
        AUTH_STATE_COOKIE,
        state.as_str().to_string(),
        secure,
        Duration::minutes(PENDING_TTL_MINUTES),
    )
}

/// Create the anti-forgery client id cookie.
///
/// It outlives any single token so that reloading a page keeps the same
/// binding.
pub fn csrf_cookie(client: &CsrfClientId, secure: bool) -> Cookie<'static> {
    private_cookie(CSRF_COOKIE, client.as_str().to_string(), secure, Duration::days(1))
}

/// Create a cookie that removes `name` from the browser.
pub fn removal(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}
