//! Opaque random identifiers.
//!
//! Every identifier that leaves the server (session cookie, OAuth `state`,
//! anti-forgery tokens) is 256 bits from the thread-local CSPRNG, encoded as
//! unpadded base64url. They carry no structure a client could predict.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of random bytes behind every identifier.
const ID_BYTES: usize = 32;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to generate a strongly-typed random identifier.
macro_rules! define_random_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from fresh random bytes.
            #[must_use]
            pub fn generate() -> Self {
                let bytes: [u8; ID_BYTES] = rand::random();
                Self(URL_SAFE_NO_PAD.encode(bytes))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        // Identifiers are bearer secrets; keep them out of debug logs.
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}…)", stringify!($name), &self.0[..self.0.len().min(6)])
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let decoded = URL_SAFE_NO_PAD.decode(s).map_err(|e| ParseIdError {
                    id_type: stringify!($name),
                    reason: e.to_string(),
                })?;
                if decoded.len() != ID_BYTES {
                    return Err(ParseIdError {
                        id_type: stringify!($name),
                        reason: format!("expected {} bytes, got {}", ID_BYTES, decoded.len()),
                    });
                }
                Ok(Self(s.to_string()))
            }
        }
    };
}

define_random_id!(
    /// Identifier of an authenticated session.
    SessionId
);

define_random_id!(
    /// OAuth `state` parameter tying a provider callback to its pending request.
    AuthState
);

define_random_id!(
    /// Per-browser anti-forgery client identifier, kept in a private cookie.
    CsrfClientId
);

define_random_id!(
    /// Anti-forgery request token handed to clients.
    CsrfTokenValue
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_id_encodes_256_bits() {
        let id = AuthState::generate();
        assert_eq!(id.as_str().len(), 43);
        assert!(!id.as_str().contains('='));
    }

    #[test]
    fn parse_accepts_generated_id() {
        let id = SessionId::generate();
        let parsed: SessionId = id.as_str().parse().expect("should parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_short_value() {
        let err = "abc".parse::<SessionId>().unwrap_err();
        assert_eq!(err.id_type, "SessionId");
    }

    #[test]
    fn parse_rejects_non_base64() {
        assert!("not a token!".parse::<CsrfTokenValue>().is_err());
    }

    #[test]
    fn debug_does_not_leak_full_value() {
        let id = SessionId::generate();
        let debug = format!("{:?}", id);
        assert!(!debug.contains(id.as_str()));
        assert!(debug.starts_with("SessionId("));
    }

    #[test]
    fn id_serde_is_transparent() {
        let id = CsrfClientId::generate();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{}\"", id.as_str()));
    }
}
