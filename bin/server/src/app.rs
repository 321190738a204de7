//! Router assembly, site pages, and status-code remapping.

use axum::{
    Router,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::PrivateCookieJar;
use frontdoor_access::messages::AUTH_ERROR;
use leptos::prelude::*;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};
use tracing::error;

use crate::auth::{
    AppState, OptionalSession, RequireSession,
    csrf::{self, issue_token},
    middleware::session_layer,
    routes,
};
use crate::config::AppEnvironment;
use crate::pages::{self, HomePage, NotFoundPage, ProfilePage};

/// Static files served under `/assets`.
const ASSETS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/auth/signin/provider/{id}", post(routes::signin_provider))
        .route("/auth/logout", post(routes::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            csrf::require_csrf,
        ));

    let environment = state.config.environment;

    Router::new()
        .route("/", get(home))
        .route("/profile", get(profile))
        .route("/not-found", get(not_found))
        .route("/auth/signin", get(routes::signin_page))
        .route("/auth/callback", get(routes::callback))
        .route("/auth/error", get(routes::error_page))
        .route("/auth/logout/callback", get(routes::logout_callback))
        .route("/auth/logout/error", get(routes::logout_error))
        .route("/auth/csrf", get(csrf::csrf_token))
        .merge(guarded)
        .nest_service("/assets", ServeDir::new(ASSETS_DIR))
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn_with_state(environment, status_pages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Renders 404s as the not-found page and, outside development, turns
/// server errors into a redirect to the generic error page.
///
/// Cookies set further in (a renewed or cleared session) survive the swap.
pub async fn status_pages(
    State(environment): State<AppEnvironment>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        let page = not_found().await.into_response();
        return carry_cookies(&response, page);
    }

    if status.is_server_error() && !environment.is_development() {
        error!(%status, path = %path, "request failed, redirecting to error page");
        let redirect = Redirect::to(&format!("/auth/error?error={AUTH_ERROR}")).into_response();
        return carry_cookies(&response, redirect);
    }

    response
}

fn carry_cookies(original: &Response, mut replacement: Response) -> Response {
    let headers = replacement.headers_mut();
    for value in original.headers().get_all(header::SET_COOKIE) {
        headers.append(header::SET_COOKIE, value.clone());
    }
    replacement
}

async fn home(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    OptionalSession(session): OptionalSession,
) -> impl IntoResponse {
    let (jar, token) = issue_token(&state, jar, session.as_ref()).await;

    let authenticated = session.is_some();
    let display_name = session
        .as_ref()
        .and_then(|s| s.claims().display_name())
        .map(str::to_string);
    let signin_url = state.provider.descriptor().signin_url();
    let csrf_token = token.value.as_str().to_string();

    let page = pages::render(move || {
        view! {
            <HomePage
                authenticated=authenticated
                display_name=display_name
                signin_url=signin_url
                csrf_token=csrf_token
            />
        }
    });

    (jar, page)
}

async fn profile(RequireSession(session): RequireSession) -> impl IntoResponse {
    let display_name = session.claims().display_name().map(str::to_string);
    let claims_json = session.claims().to_pretty_json();

    pages::render(move || {
        view! { <ProfilePage display_name=display_name claims_json=claims_json/> }
    })
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        pages::render(|| view! { <NotFoundPage/> }),
    )
}
