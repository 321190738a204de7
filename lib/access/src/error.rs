//! Error types for the access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `SessionStoreError`: failures of the session backing store
//! - `CsrfError`: anti-forgery validation failures

use std::fmt;

/// Errors from a session backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    /// The store could not be reached or refused the operation.
    Unavailable { details: String },
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { details } => write!(f, "session store unavailable: {details}"),
        }
    }
}

impl std::error::Error for SessionStoreError {}

/// Reasons an anti-forgery token is rejected.
///
/// Callers only see pass/fail; the variant exists for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfError {
    /// No token was presented.
    Missing,
    /// The token was never issued, or has been revoked.
    Unknown,
    /// The token's validity window has passed.
    Expired,
    /// The token was issued to a different browser or session.
    BindingMismatch,
}

impl fmt::Display for CsrfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "anti-forgery token missing"),
            Self::Unknown => write!(f, "anti-forgery token unknown"),
            Self::Expired => write!(f, "anti-forgery token expired"),
            Self::BindingMismatch => write!(f, "anti-forgery token bound to another client"),
        }
    }
}

impl std::error::Error for CsrfError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_store_error_display() {
        let err = SessionStoreError::Unavailable {
            details: "connection reset".to_string(),
        };
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn csrf_error_display() {
        assert!(CsrfError::Missing.to_string().contains("missing"));
        assert!(CsrfError::Expired.to_string().contains("expired"));
        assert!(CsrfError::BindingMismatch.to_string().contains("another client"));
    }
}
