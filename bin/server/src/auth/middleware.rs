//! Session middleware and extractors for Axum.
//!
//! [`session_layer`] resolves the session cookie once per request and
//! stores the result as a [`CurrentSession`] request extension. Handlers
//! read it through [`RequireSession`] or [`OptionalSession`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use frontdoor_access::Session;
use frontdoor_core::SessionId;
use tracing::debug;

use super::{
    AppState,
    cookies::{self, SESSION_COOKIE},
};

/// Where unauthenticated browsers are sent.
const SIGNIN_PATH: &str = "/auth/signin";

/// The session resolved for the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<Session>);

/// Resolves the session cookie and refreshes it on the way out.
///
/// A live session is renewed by the manager (when sliding renewal is on)
/// and its cookie re-issued with a fresh `Max-Age`. A cookie naming a
/// session that no longer exists is removed. If the handler already set or
/// removed the session cookie (sign-in, sign-out) that decision wins.
pub async fn session_layer(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: axum::middleware::Next,
) -> Response {
    let presented: Option<SessionId> = jar
        .get(SESSION_COOKIE)
        .and_then(|c| c.value().parse().ok());

    let session = match &presented {
        Some(id) => state.sessions.resolve(id).await,
        None => None,
    };

    request
        .extensions_mut()
        .insert(CurrentSession(session.clone()));

    let response = next.run(request).await;

    if sets_cookie(&response, SESSION_COOKIE) {
        return response;
    }

    match (session, presented) {
        (Some(session), _) if state.sessions.sliding() => {
            let cookie = cookies::session_cookie(
                session.id(),
                state.config.session.duration,
                state.secure_cookies(),
            );
            (jar.add(cookie), response).into_response()
        }
        (None, Some(_)) => {
            debug!("removing cookie for unknown session");
            (jar.remove(cookies::removal(SESSION_COOKIE)), response).into_response()
        }
        _ => response,
    }
}

fn sets_cookie(response: &Response, name: &str) -> bool {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&prefix))
}

/// Extractor for requiring an authenticated session.
///
/// If there is no session, the browser is redirected to the sign-in page.
pub struct RequireSession(pub Session);

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .and_then(|current| current.0.clone())
            .map(RequireSession)
            .ok_or(AuthRejection::NotAuthenticated)
    }
}

/// Extractor for optionally getting the current session.
pub struct OptionalSession(pub Option<Session>);

impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match RequireSession::from_request_parts(parts, state).await {
            Ok(RequireSession(session)) => Ok(OptionalSession(Some(session))),
            Err(_) => Ok(OptionalSession(None)),
        }
    }
}

/// Rejection type for session extractors.
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated => Redirect::to(SIGNIN_PATH).into_response(),
        }
    }
}
