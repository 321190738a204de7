//! Session lifecycle, sign-in state and anti-forgery tokens for frontdoor.
//!
//! This crate provides:
//! - Claims received from the identity provider (`Claims`)
//! - The immutable provider descriptor (`ProviderDescriptor`)
//! - Session management (`SessionManager`, `SessionStore`, `MemorySessionStore`)
//! - Single-use pending sign-in requests (`PendingAuthStore`)
//! - Anti-forgery token issuing and validation (`CsrfIssuer`)
//! - The error-code to user-facing message table (`messages`)
//!
//! Nothing here knows about HTTP. The server crate maps these types onto
//! cookies, redirects and pages.
//!
//! # Example
//!
//! ```
//! use frontdoor_access::{Claims, MemorySessionStore, SessionManager, SessionTokens};
//! use chrono::Duration;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let manager = SessionManager::new(MemorySessionStore::shared(), Duration::hours(1), true);
//!
//! let mut claims = Claims::new();
//! claims.insert("sub", "user-1");
//! claims.insert("name", "Alice");
//!
//! let id = manager.create(claims, SessionTokens::default()).await.unwrap();
//! let session = manager.resolve(&id).await.expect("fresh session resolves");
//! assert_eq!(session.claims().display_name(), Some("Alice"));
//!
//! manager.invalidate(&id).await;
//! assert!(manager.resolve(&id).await.is_none());
//! # });
//! ```

pub mod claims;
pub mod csrf;
pub mod error;
pub mod messages;
pub mod pending;
pub mod provider;
pub mod session;

// Re-export main types at crate root
pub use claims::Claims;
pub use csrf::{CsrfBinding, CsrfIssuer, CsrfToken};
pub use error::{CsrfError, SessionStoreError};
pub use messages::{AuthMessage, ErrorCategory, error_message, logout_error_message};
pub use pending::{PendingAuthRequest, PendingAuthStore, sanitize_return_url};
pub use provider::{ProviderDescriptor, ProviderDescriptorBuilder};
pub use session::{MemorySessionStore, Session, SessionManager, SessionStore, SessionTokens};
