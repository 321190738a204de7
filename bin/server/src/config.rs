//! Centralized server configuration.
//!
//! Settings are read once at start from the process environment (after an
//! optional `.env` file is loaded) via the `config` crate, then frozen into
//! an immutable [`ServerConfig`] that is handed to every component through
//! the application state. Nothing re-reads the environment afterwards.
//!
//! Malformed numbers and booleans fall back to their defaults with a
//! warning rather than aborting start-up.

use frontdoor_access::ProviderDescriptor;
use frontdoor_access::provider::CALLBACK_PATH;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_DURATION_SECONDS: u64 = 3600;
const DEFAULT_PROVIDER_DOMAIN: &str = "https://zitadel.example.com";
const DEFAULT_CLIENT_ID: &str = "client-id";
const DEFAULT_CLIENT_SECRET: &str = "client-secret";
const DEFAULT_POST_LOGOUT_URL: &str = "http://localhost:3000/auth/logout/callback";
const DEFAULT_PROVIDER_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_CSRF_TOKEN_LIFETIME_SECONDS: u64 = 3600;
const DEFAULT_CLEANUP_INTERVAL_SECONDS: u64 = 300;

/// Raw environment values, before defaults are applied.
///
/// Every field is a string so that one bad value does not reject the
/// whole environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvironmentSettings {
    port: Option<String>,
    session_duration: Option<String>,
    session_secret: Option<String>,
    session_sliding: Option<String>,
    secure_cookies: Option<String>,
    zitadel_domain: Option<String>,
    zitadel_client_id: Option<String>,
    zitadel_client_secret: Option<String>,
    zitadel_post_logout_url: Option<String>,
    zitadel_callback_url: Option<String>,
    app_env: Option<String>,
    provider_timeout: Option<String>,
    csrf_token_lifetime: Option<String>,
    cleanup_interval: Option<String>,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    fn from_setting(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "development" || v == "dev" => Self::Development,
            _ => Self::Production,
        }
    }

    /// Returns true in development, where server errors are shown as-is.
    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Session-related configuration.
#[derive(Clone)]
pub struct SessionConfig {
    /// How long a session lives without activity.
    pub duration: Duration,
    /// Whether each authenticated request pushes the expiry forward.
    pub sliding: bool,
    /// Whether to set the Secure flag on cookies (requires HTTPS).
    pub secure_cookies: bool,
    /// Interval between sweeps of expired server-side state.
    pub cleanup_interval: Duration,
    /// Key material for the private cookie jar, if configured.
    pub secret: Option<String>,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("duration", &self.duration)
            .field("sliding", &self.sliding)
            .field("secure_cookies", &self.secure_cookies)
            .field("cleanup_interval", &self.cleanup_interval)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Identity provider connection settings.
#[derive(Clone)]
pub struct OidcSettings {
    /// Issuer URL of the provider.
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    /// Absolute URL of this server's callback route.
    pub callback_url: String,
    /// Where the provider sends the browser after sign-out.
    pub post_logout_url: String,
    /// Bound on every call to the provider.
    pub timeout: Duration,
}

impl fmt::Debug for OidcSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidcSettings")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("callback_url", &self.callback_url)
            .field("post_logout_url", &self.post_logout_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Immutable server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: u16,
    pub environment: AppEnvironment,
    pub session: SessionConfig,
    pub oidc: OidcSettings,
    /// Validity window of anti-forgery tokens.
    pub csrf_token_lifetime: Duration,
}

impl ServerConfig {
    /// Loads configuration from `.env` (if present) and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be read.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!(error = %e, "failed to load .env file");
            }
        }
        Self::from_source(config::Environment::default())
    }

    fn from_source(source: config::Environment) -> Result<Self, config::ConfigError> {
        let settings: EnvironmentSettings = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        Ok(Self::from_settings(settings))
    }

    fn from_settings(settings: EnvironmentSettings) -> Self {
        let port = parse_or("PORT", settings.port.as_deref(), DEFAULT_PORT);
        let session_seconds = parse_or(
            "SESSION_DURATION",
            settings.session_duration.as_deref(),
            DEFAULT_SESSION_DURATION_SECONDS,
        );
        let timeout_seconds = parse_or(
            "PROVIDER_TIMEOUT",
            settings.provider_timeout.as_deref(),
            DEFAULT_PROVIDER_TIMEOUT_SECONDS,
        );
        let csrf_seconds = parse_or(
            "CSRF_TOKEN_LIFETIME",
            settings.csrf_token_lifetime.as_deref(),
            DEFAULT_CSRF_TOKEN_LIFETIME_SECONDS,
        );
        let cleanup_seconds = parse_or(
            "CLEANUP_INTERVAL",
            settings.cleanup_interval.as_deref(),
            DEFAULT_CLEANUP_INTERVAL_SECONDS,
        );

        let callback_url = non_blank(settings.zitadel_callback_url)
            .unwrap_or_else(|| format!("http://localhost:{DEFAULT_PORT}{CALLBACK_PATH}"));

        Self {
            port,
            environment: AppEnvironment::from_setting(settings.app_env.as_deref()),
            session: SessionConfig {
                duration: Duration::from_secs(session_seconds.max(1)),
                sliding: parse_bool_or("SESSION_SLIDING", settings.session_sliding.as_deref(), true),
                secure_cookies: parse_bool_or(
                    "SECURE_COOKIES",
                    settings.secure_cookies.as_deref(),
                    false,
                ),
                cleanup_interval: Duration::from_secs(cleanup_seconds.max(1)),
                secret: non_blank(settings.session_secret),
            },
            oidc: OidcSettings {
                domain: non_blank(settings.zitadel_domain)
                    .unwrap_or_else(|| DEFAULT_PROVIDER_DOMAIN.to_string()),
                client_id: non_blank(settings.zitadel_client_id)
                    .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
                client_secret: non_blank(settings.zitadel_client_secret)
                    .unwrap_or_else(|| DEFAULT_CLIENT_SECRET.to_string()),
                callback_url,
                post_logout_url: non_blank(settings.zitadel_post_logout_url)
                    .unwrap_or_else(|| DEFAULT_POST_LOGOUT_URL.to_string()),
                timeout: Duration::from_secs(timeout_seconds.max(1)),
            },
            csrf_token_lifetime: Duration::from_secs(csrf_seconds.max(1)),
        }
    }

    /// Builds the provider descriptor from the identity provider settings.
    #[must_use]
    pub fn provider_descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::builder(
            self.oidc.domain.clone(),
            self.oidc.client_id.clone(),
            self.oidc.client_secret.clone(),
            self.oidc.callback_url.clone(),
            self.oidc.post_logout_url.clone(),
        )
        .build()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_settings(EnvironmentSettings::default())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(name: &str, value: Option<&str>, default: T) -> T
where
    T: FromStr + Copy + fmt::Display,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(variable = name, value = raw, default = %default, "invalid number, using default");
            default
        }),
    }
}

fn parse_bool_or(name: &str, value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => default,
        Some(v) if v.is_empty() => default,
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => {
                warn!(variable = name, value = %v, default, "invalid boolean, using default");
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> ServerConfig {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_source(config::Environment::default().source(Some(source)))
            .expect("environment should load")
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]);

        assert_eq!(config.port, 3000);
        assert_eq!(config.session.duration, Duration::from_secs(3600));
        assert!(config.session.sliding);
        assert!(!config.session.secure_cookies);
        assert_eq!(config.session.cleanup_interval, Duration::from_secs(300));
        assert!(config.session.secret.is_none());
        assert_eq!(config.oidc.domain, "https://zitadel.example.com");
        assert_eq!(config.oidc.client_id, "client-id");
        assert_eq!(config.oidc.callback_url, "http://localhost:3000/auth/callback");
        assert_eq!(
            config.oidc.post_logout_url,
            "http://localhost:3000/auth/logout/callback"
        );
        assert_eq!(config.oidc.timeout, Duration::from_secs(10));
        assert_eq!(config.csrf_token_lifetime, Duration::from_secs(3600));
        assert_eq!(config.environment, AppEnvironment::Production);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = load(&[
            ("PORT", "8080"),
            ("SESSION_DURATION", "120"),
            ("SESSION_SLIDING", "false"),
            ("SECURE_COOKIES", "true"),
            ("ZITADEL_DOMAIN", "https://id.example.org"),
            ("ZITADEL_CLIENT_ID", "frontdoor"),
            ("ZITADEL_POST_LOGOUT_URL", "https://app.example.org/auth/logout/callback"),
            ("APP_ENV", "development"),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.session.duration, Duration::from_secs(120));
        assert!(!config.session.sliding);
        assert!(config.session.secure_cookies);
        assert_eq!(config.oidc.domain, "https://id.example.org");
        assert_eq!(config.oidc.client_id, "frontdoor");
        assert_eq!(
            config.oidc.post_logout_url,
            "https://app.example.org/auth/logout/callback"
        );
        assert!(config.environment.is_development());
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let config = load(&[("PORT", "not-a-port"), ("SESSION_DURATION", "-5")]);

        assert_eq!(config.port, 3000);
        assert_eq!(config.session.duration, Duration::from_secs(3600));
    }

    #[test]
    fn descriptor_uses_oidc_settings() {
        let config = load(&[("ZITADEL_CLIENT_ID", "frontdoor")]);
        let descriptor = config.provider_descriptor();

        assert_eq!(descriptor.id(), "zitadel");
        assert_eq!(descriptor.client_id(), "frontdoor");
        assert_eq!(descriptor.redirect_uri(), "http://localhost:3000/auth/callback");
        assert_eq!(descriptor.signin_url(), "/auth/signin/provider/zitadel");
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = load(&[
            ("ZITADEL_CLIENT_SECRET", "hunter2"),
            ("SESSION_SECRET", "super-secret-key-material"),
        ]);
        let debug = format!("{config:?}");

        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("super-secret-key-material"));
    }
}
