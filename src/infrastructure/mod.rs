//! Infrastructure layer for external integrations.
//!
//! Implements the repository and identity provider traits defined by the
//! domain layer.
//!
//! # Modules
//!
//! - [`oauth`] - OAuth sign-in providers
//! - [`persistence`] - PostgreSQL repository implementations

pub mod oauth;
pub mod persistence;
