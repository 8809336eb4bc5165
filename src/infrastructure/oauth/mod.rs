//! OAuth 2.0 sign-in providers built on the `oauth2` crate.
//!
//! # Providers
//!
//! - [`GoogleProvider`] - Google, authorization code flow with PKCE

pub mod google;

pub use google::{GoogleProvider, GoogleSettings};
