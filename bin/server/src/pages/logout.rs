//! Sign-out result pages.

use leptos::prelude::*;

use super::Layout;

#[component]
pub fn LogoutSuccessPage() -> impl IntoView {
    view! {
        <Layout title="Signed out".to_string()>
            <div class="logout-page">
                <h1>"You have been signed out"</h1>
                <p>"Your session has ended."</p>
                <a href="/" class="cta-button">"Return home"</a>
            </div>
        </Layout>
    }
}

#[component]
pub fn LogoutErrorPage(heading: &'static str, message: String) -> impl IntoView {
    view! {
        <Layout title=heading.to_string()>
            <div class="logout-page error-page">
                <h1>{heading}</h1>
                <p>{message}</p>
                <a href="/" class="cta-button">"Return home"</a>
            </div>
        </Layout>
    }
}
