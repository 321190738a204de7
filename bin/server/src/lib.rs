//! frontdoor web server.
//!
//! This crate provides the axum application that signs users in through an
//! OpenID Connect provider, keeps their session, and renders the site's
//! pages with Leptos on the server.

#![allow(non_snake_case)]

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod pages;

#[cfg(test)]
pub(crate) mod testing;
