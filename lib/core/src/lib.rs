//! Core types and utilities shared by the frontdoor crates.
//!
//! This crate provides the `Result` alias used for layered error reports and
//! the opaque random identifiers that cross the HTTP boundary in cookies and
//! query parameters.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{AuthState, CsrfClientId, CsrfTokenValue, ParseIdError, SessionId};
