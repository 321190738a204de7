//! Authentication error page component.

use frontdoor_access::AuthMessage;
use leptos::prelude::*;

use super::Layout;

#[component]
pub fn ErrorPage(message: AuthMessage) -> impl IntoView {
    view! {
        <Layout title=message.heading.to_string()>
            <div class="error-page">
                <h1>{message.heading}</h1>
                <p>{message.message}</p>
                <a href="/auth/signin" class="cta-button">"Try again"</a>
            </div>
        </Layout>
    }
}
