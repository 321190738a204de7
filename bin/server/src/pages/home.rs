//! Home page component.

use leptos::prelude::*;

use super::{Layout, PostForm};

/// The home page component.
///
/// Signed-in users get a greeting and a sign-out button; everyone else gets
/// a sign-in button that starts the provider flow directly.
#[component]
pub fn HomePage(
    authenticated: bool,
    display_name: Option<String>,
    signin_url: String,
    csrf_token: String,
) -> impl IntoView {
    let body = if authenticated {
        let greeting = display_name
            .map(|n| format!("Welcome, {n}!"))
            .unwrap_or_else(|| "Welcome!".to_string());
        view! {
            <div>
                <h1>{greeting}</h1>
                <p>"You are signed in."</p>
                <p><a href="/profile" class="cta-button">"View profile"</a></p>
                <PostForm action="/auth/logout".to_string() csrf_token=csrf_token>
                    <button type="submit" class="secondary-button">"Sign out"</button>
                </PostForm>
            </div>
        }
        .into_any()
    } else {
        view! {
            <div>
                <h1>"Welcome"</h1>
                <p>"Sign in with your organization account to continue."</p>
                <PostForm action=signin_url csrf_token=csrf_token>
                    <button type="submit" class="cta-button">"Sign in"</button>
                </PostForm>
            </div>
        }
        .into_any()
    };

    view! {
        <Layout title="Home".to_string()>
            <div class="home-page">{body}</div>
        </Layout>
    }
}
