//! Identity provider descriptor.
//!
//! The descriptor is built once at startup from configuration and never
//! changes afterwards. It names the provider on the sign-in page and tells
//! the OIDC client where to send users and what to ask for.

use std::fmt;

/// Provider id used when none is configured.
pub const DEFAULT_PROVIDER_ID: &str = "zitadel";

/// Provider display name used when none is configured.
pub const DEFAULT_PROVIDER_NAME: &str = "ZITADEL";

/// Path the provider redirects back to after authentication.
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Scopes requested from the provider, in order.
///
/// The standard OIDC scopes are followed by the provider-specific scopes
/// for user metadata, the resource owner and project role claims.
pub const DEFAULT_SCOPES: &[&str] = &[
    "openid",
    "profile",
    "email",
    "offline_access",
    "urn:zitadel:iam:user:metadata",
    "urn:zitadel:iam:user:resourceowner",
    "urn:zitadel:iam:org:projects:roles",
];

/// Static description of the configured identity provider.
#[derive(Clone)]
pub struct ProviderDescriptor {
    id: String,
    display_name: String,
    authority: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    post_logout_redirect_uri: String,
}

impl ProviderDescriptor {
    /// Creates a configuration builder with the required fields.
    #[must_use]
    pub fn builder(
        authority: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        post_logout_redirect_uri: String,
    ) -> ProviderDescriptorBuilder {
        ProviderDescriptorBuilder::new(
            authority,
            client_id,
            client_secret,
            redirect_uri,
            post_logout_redirect_uri,
        )
    }

    /// Returns the provider identifier used in sign-in URLs.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable provider name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the issuer URL used for discovery.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the absolute callback URL registered with the provider.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the requested scopes, in order.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Returns where the provider sends the browser after sign-out.
    #[must_use]
    pub fn post_logout_redirect_uri(&self) -> &str {
        &self.post_logout_redirect_uri
    }

    /// Returns the local URL that starts sign-in with this provider.
    #[must_use]
    pub fn signin_url(&self) -> String {
        format!("/auth/signin/provider/{}", self.id)
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("authority", &self.authority)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("post_logout_redirect_uri", &self.post_logout_redirect_uri)
            .finish()
    }
}

/// Builder for `ProviderDescriptor`.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
    descriptor: ProviderDescriptor,
}

impl ProviderDescriptorBuilder {
    /// Creates a new builder with required fields and default scopes.
    #[must_use]
    pub fn new(
        authority: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        post_logout_redirect_uri: String,
    ) -> Self {
        Self {
            descriptor: ProviderDescriptor {
                id: DEFAULT_PROVIDER_ID.to_string(),
                display_name: DEFAULT_PROVIDER_NAME.to_string(),
                authority,
                client_id,
                client_secret,
                redirect_uri,
                scopes: DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect(),
                post_logout_redirect_uri,
            },
        }
    }

    /// Sets the provider identifier.
    #[must_use]
    pub fn id(mut self, id: String) -> Self {
        self.descriptor.id = id;
        self
    }

    /// Sets the provider display name.
    #[must_use]
    pub fn display_name(mut self, name: String) -> Self {
        self.descriptor.display_name = name;
        self
    }

    /// Replaces the requested scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.descriptor.scopes = scopes;
        self
    }

    /// Adds a scope unless it is already requested.
    #[must_use]
    pub fn add_scope(mut self, scope: String) -> Self {
        if !self.descriptor.scopes.contains(&scope) {
            self.descriptor.scopes.push(scope);
        }
        self
    }

    /// Builds the descriptor.
    #[must_use]
    pub fn build(self) -> ProviderDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ProviderDescriptor {
        ProviderDescriptor::builder(
            "https://auth.example.com".to_string(),
            "client-id".to_string(),
            "client-secret".to_string(),
            "http://localhost:3000/auth/callback".to_string(),
            "http://localhost:3000/auth/logout/callback".to_string(),
        )
        .build()
    }

    #[test]
    fn default_scopes_are_exact_and_ordered() {
        let d = descriptor();
        assert_eq!(
            d.scopes(),
            [
                "openid",
                "profile",
                "email",
                "offline_access",
                "urn:zitadel:iam:user:metadata",
                "urn:zitadel:iam:user:resourceowner",
                "urn:zitadel:iam:org:projects:roles",
            ]
        );
    }

    #[test]
    fn defaults_name_the_zitadel_provider() {
        let d = descriptor();
        assert_eq!(d.id(), "zitadel");
        assert_eq!(d.display_name(), "ZITADEL");
        assert_eq!(d.signin_url(), "/auth/signin/provider/zitadel");
    }

    #[test]
    fn add_scope_does_not_duplicate() {
        let d = ProviderDescriptorBuilder::new(
            "https://auth.example.com".to_string(),
            "id".to_string(),
            "secret".to_string(),
            "http://localhost/auth/callback".to_string(),
            "http://localhost/auth/logout/callback".to_string(),
        )
        .add_scope("openid".to_string())
        .add_scope("custom".to_string())
        .build();

        assert_eq!(d.scopes().iter().filter(|s| *s == "openid").count(), 1);
        assert_eq!(d.scopes().last().map(String::as_str), Some("custom"));
    }

    #[test]
    fn debug_redacts_client_secret() {
        let debug = format!("{:?}", descriptor());
        assert!(!debug.contains("client-secret"));
        assert!(debug.contains("[redacted]"));
    }
}
