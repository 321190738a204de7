//! Profile page component.

use leptos::prelude::*;

use super::Layout;

/// Shows the signed-in user's claims as indented JSON.
#[component]
pub fn ProfilePage(display_name: Option<String>, claims_json: String) -> impl IntoView {
    let heading = display_name.unwrap_or_else(|| "Profile".to_string());

    view! {
        <Layout title="Profile".to_string()>
            <div class="profile-page">
                <h1>{heading}</h1>
                <pre class="claims">{claims_json}</pre>
            </div>
        </Layout>
    }
}
