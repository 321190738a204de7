//! Page components for the application.
//!
//! Pages are Leptos components rendered to HTML on the server; nothing is
//! hydrated in the browser. Each handler builds its page and passes it to
//! [`render`].

pub mod error;
pub mod home;
pub mod logout;
pub mod not_found;
pub mod profile;
pub mod signin;

use axum::response::Html;
use leptos::prelude::*;

// Re-export all page components for convenient access
pub use error::ErrorPage;
pub use home::HomePage;
pub use logout::{LogoutErrorPage, LogoutSuccessPage};
pub use not_found::NotFoundPage;
pub use profile::ProfilePage;
pub use signin::SigninPage;

/// Application name shown in titles and the header.
pub const APP_NAME: &str = "frontdoor";

/// Shared page chrome.
#[component]
pub fn Layout(title: String, children: Children) -> impl IntoView {
    let full_title = format!("{title} | {APP_NAME}");

    view! {
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{full_title}</title>
                <link rel="stylesheet" href="/assets/site.css"/>
            </head>
            <body>
                <header class="site-header">
                    <a href="/" class="brand">{APP_NAME}</a>
                </header>
                <main class="content">{children()}</main>
            </body>
        </html>
    }
}

/// Renders a page to a complete HTML document.
pub fn render<V>(page: impl FnOnce() -> V) -> Html<String>
where
    V: IntoView,
{
    let owner = Owner::new();
    let body = owner.with(|| page().to_html());
    Html(format!("<!DOCTYPE html>{body}"))
}

/// A form with a hidden anti-forgery token.
#[component]
pub fn PostForm(action: String, csrf_token: String, children: Children) -> impl IntoView {
    view! {
        <form method="post" action=action>
            <input type="hidden" name="csrfToken" value=csrf_token/>
            {children()}
        </form>
    }
}
