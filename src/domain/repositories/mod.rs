//! Repository trait definitions for the domain layer.
//!
//! This module defines the repository interfaces (traits) that abstract data access
//! operations following the Repository pattern. These traits are implemented by
//! concrete repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`LinkStore`] - Slug existence check used by the slug allocator
//! - [`LinkRepository`] - Link CRUD, listing and click bookkeeping
//! - [`UserRepository`] - Accounts created through OAuth sign-in

pub mod link_repository;
pub mod user_repository;

pub use link_repository::{LinkRepository, LinkStore};
pub use user_repository::UserRepository;

#[cfg(test)]
pub use link_repository::{MockLinkRepository, MockLinkStore};
#[cfg(test)]
pub use user_repository::MockUserRepository;
