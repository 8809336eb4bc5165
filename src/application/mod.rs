//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide the API used by HTTP
//! handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::slug_allocator::SlugAllocator`] - Unique slug allocation with bounded retry
//! - [`services::link_service::LinkService`] - Link creation, management and redirects
//! - [`services::auth_service::AuthService`] - Sign-in and session tokens

pub mod services;
