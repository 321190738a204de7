//! Authentication routes for sign-in, callback, and sign-out.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use frontdoor_access::{
    ErrorCategory, PendingAuthRequest, error_message, logout_error_message, sanitize_return_url,
};
use frontdoor_core::AuthState;
use serde::Deserialize;
use tracing::{info, warn};

use super::{
    AppState,
    cookies::{self, AUTH_STATE_COOKIE, SESSION_COOKIE},
    csrf::issue_token,
    events::SignOutRequest,
    middleware::OptionalSession,
};
use crate::error::AppError;
use crate::pages::{
    self, ErrorPage, LogoutErrorPage, LogoutSuccessPage, SigninPage, signin::ProviderOption,
};
use leptos::prelude::*;

/// Error code the provider uses when the user or policy refuses consent.
const PROVIDER_ACCESS_DENIED: &str = "access_denied";

/// Query parameters for the sign-in page.
#[derive(Debug, Default, Deserialize)]
pub struct SigninQuery {
    error: Option<String>,
    #[serde(rename = "callbackUrl")]
    callback_url: Option<String>,
}

/// Form fields posted to start sign-in.
#[derive(Debug, Default, Deserialize)]
pub struct SigninForm {
    #[serde(rename = "callbackUrl")]
    callback_url: Option<String>,
}

/// Query parameters for the OIDC callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Query parameters for the error page.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorQuery {
    error: Option<String>,
}

/// Query parameters for the sign-out error page.
#[derive(Debug, Default, Deserialize)]
pub struct LogoutErrorQuery {
    reason: Option<String>,
}

/// Renders the provider list.
pub async fn signin_page(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    OptionalSession(session): OptionalSession,
    Query(query): Query<SigninQuery>,
) -> impl IntoResponse {
    let (jar, token) = issue_token(&state, jar, session.as_ref()).await;

    let descriptor = state.provider.descriptor();
    let providers = vec![ProviderOption {
        display_name: descriptor.display_name().to_string(),
        signin_url: descriptor.signin_url(),
    }];
    let callback_url = sanitize_return_url(query.callback_url.as_deref());
    let message = query
        .error
        .as_deref()
        .filter(|code| !code.trim().is_empty())
        .map(|code| error_message(Some(code), ErrorCategory::SignIn));
    let csrf_token = token.value.as_str().to_string();

    let page = pages::render(move || {
        view! {
            <SigninPage
                providers=providers
                callback_url=callback_url
                csrf_token=csrf_token
                message=message
            />
        }
    });

    (jar, page)
}

/// Starts the OIDC flow by redirecting to the identity provider.
pub async fn signin_provider(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path(provider_id): Path<String>,
    Form(form): Form<SigninForm>,
) -> Response {
    let descriptor = state.provider.descriptor();
    if provider_id != descriptor.id() {
        warn!(provider = %provider_id, "sign-in requested for unknown provider");
        return StatusCode::NOT_FOUND.into_response();
    }

    let auth_state = AuthState::generate();
    let request = state.provider.authorization_request(&auth_state);
    let return_url = sanitize_return_url(form.callback_url.as_deref());

    state
        .pending
        .insert(
            auth_state.clone(),
            PendingAuthRequest {
                pkce_verifier: request.pkce_verifier,
                nonce: request.nonce,
                return_url,
                created_at: chrono::Utc::now(),
            },
        )
        .await;

    info!(provider = descriptor.id(), "redirecting to identity provider");

    let jar = jar.add(cookies::auth_state_cookie(&auth_state, state.secure_cookies()));
    (jar, Redirect::to(&request.url)).into_response()
}

/// Handles the redirect back from the identity provider.
///
/// The pending request named by `state` is consumed only when this browser's
/// `auth_state` cookie carries the same value, and before anything else, so
/// a replayed callback always fails and a foreign one cannot cancel it.
pub async fn callback(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    let presented: Option<AuthState> = query.state.as_deref().and_then(|s| s.parse().ok());
    let cookie_state = jar.get(AUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let bound = matches!(
        (&presented, &cookie_state),
        (Some(p), Some(c)) if p.as_str() == c
    );
    let pending = match &presented {
        Some(auth_state) if bound => state.pending.take(auth_state).await,
        _ => None,
    };

    let jar = jar.remove(cookies::removal(AUTH_STATE_COOKIE));
    let fail = |jar: PrivateCookieJar, target: String| -> Result<Response, AppError> {
        Ok((jar, Redirect::to(&target)).into_response())
    };

    if let Some(error) = query.error.as_deref() {
        if error == PROVIDER_ACCESS_DENIED {
            return fail(jar, state.events.on_access_denied());
        }
        return fail(jar, state.events.on_remote_failure(error));
    }

    if presented.is_some() && !bound {
        return fail(
            jar,
            state.events.on_remote_failure("state does not match this browser"),
        );
    }

    let Some(pending) = pending else {
        return fail(jar, state.events.on_remote_failure("unknown or replayed state"));
    };

    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return fail(jar, state.events.on_remote_failure("missing authorization code"));
    };

    let exchange = tokio::time::timeout(
        state.config.oidc.timeout,
        state.provider.exchange_code(code, &pending),
    )
    .await;

    let identity = match exchange {
        Ok(Ok(identity)) => identity,
        Ok(Err(e)) => {
            warn!(error = %e, "code exchange failed");
            return fail(jar, state.events.on_remote_failure("code exchange failed"));
        }
        Err(_) => {
            return fail(jar, state.events.on_remote_failure("identity provider timed out"));
        }
    };

    let session_id = state
        .sessions
        .create(identity.claims, identity.tokens)
        .await?;

    info!("user signed in");

    let jar = jar.add(cookies::session_cookie(
        &session_id,
        state.config.session.duration,
        state.secure_cookies(),
    ));
    Ok((jar, Redirect::to(&pending.return_url)).into_response())
}

/// Renders the authentication error page.
pub async fn error_page(Query(query): Query<ErrorQuery>) -> impl IntoResponse {
    let message = error_message(query.error.as_deref(), ErrorCategory::Auth);
    pages::render(move || view! { <ErrorPage message=message/> })
}

/// Ends the local session and the provider session.
pub async fn logout(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    OptionalSession(session): OptionalSession,
) -> Response {
    let descriptor = state.provider.descriptor();
    let mut request = SignOutRequest {
        id_token_hint: None,
        client_id: descriptor.client_id().to_string(),
        post_logout_redirect_uri: descriptor.post_logout_redirect_uri().to_string(),
    };

    if let Some(session) = session {
        state.sessions.invalidate(session.id()).await;
        state.csrf.revoke_session(session.id()).await;
        request.id_token_hint = session.tokens().id_token.clone();
        info!("user signed out");
    }

    state.events.on_sign_out_redirect(&mut request);

    let jar = jar.remove(cookies::removal(SESSION_COOKIE));
    let target = match state.provider.end_session_url(&request) {
        Ok(Some(url)) => url,
        Ok(None) => request.post_logout_redirect_uri,
        Err(e) => {
            warn!(error = %e, "failed to build end-session request");
            "/auth/logout/error".to_string()
        }
    };

    (jar, Redirect::to(&target)).into_response()
}

/// Renders the sign-out confirmation.
pub async fn logout_callback() -> impl IntoResponse {
    pages::render(|| view! { <LogoutSuccessPage/> })
}

/// Renders the sign-out failure page.
pub async fn logout_error(Query(query): Query<LogoutErrorQuery>) -> impl IntoResponse {
    let (heading, message) = logout_error_message(query.reason.as_deref());
    pages::render(move || view! { <LogoutErrorPage heading=heading message=message/> })
}
