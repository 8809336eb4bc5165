//! Domain layer containing business entities and rules.
//!
//! This module holds the data model of the service and the contracts the
//! application layer depends on. It has no knowledge of HTTP or SQL.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`identity`] - OAuth sign-in provider contract
//! - [`repositories`] - Data access trait definitions
//! - [`plan`] - Subscription plans and their quotas
//! - [`session`] - Signed-in identity and session token claims
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])

pub mod entities;
pub mod identity;
pub mod plan;
pub mod repositories;
pub mod session;
