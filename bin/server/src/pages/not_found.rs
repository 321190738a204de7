//! Not-found page component.

use leptos::prelude::*;

use super::Layout;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <Layout title="Not found".to_string()>
            <div class="not-found-page">
                <h1>"Page not found"</h1>
                <p>"The page you were looking for does not exist."</p>
                <a href="/" class="cta-button">"Return home"</a>
            </div>
        </Layout>
    }
}
