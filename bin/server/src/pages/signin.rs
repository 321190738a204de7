//! Sign-in page component.

use frontdoor_access::AuthMessage;
use leptos::prelude::*;

use super::{Layout, PostForm};

/// A provider offered on the sign-in page.
#[derive(Debug, Clone)]
pub struct ProviderOption {
    pub display_name: String,
    pub signin_url: String,
}

/// Sign-in page - lists the configured providers.
#[component]
pub fn SigninPage(
    providers: Vec<ProviderOption>,
    callback_url: String,
    csrf_token: String,
    message: Option<AuthMessage>,
) -> impl IntoView {
    let message = message.map(|m| {
        view! {
            <div class="alert" role="alert">
                <h2>{m.heading}</h2>
                <p>{m.message}</p>
            </div>
        }
    });

    let providers = providers
        .into_iter()
        .map(|provider| {
            let label = format!("Sign in with {}", provider.display_name);
            let callback_url = callback_url.clone();
            view! {
                <PostForm action=provider.signin_url csrf_token=csrf_token.clone()>
                    <input type="hidden" name="callbackUrl" value=callback_url/>
                    <button type="submit" class="login-button">{label}</button>
                </PostForm>
            }
        })
        .collect_view();

    view! {
        <Layout title="Sign in".to_string()>
            <div class="login-page">
                <div class="login-box">
                    <h1>"Sign in"</h1>
                    {message}
                    {providers}
                </div>
            </div>
        </Layout>
    }
}
