//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL owned by a user
//! - [`User`] - An account created through OAuth sign-in
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation
//! and modification:
//! - `NewLink` - For inserting records
//! - `LinkPatch` - For partial updates
//! - `LinkListQuery` / `LinkFilter` - For paginated listing

pub mod link;
pub mod user;

pub use link::{Link, LinkFilter, LinkListQuery, LinkPatch, LinkSort, NewLink};
pub use user::User;
