//! Business logic services for the application layer.

pub mod auth_service;
pub mod link_service;
pub mod slug_allocator;

pub use auth_service::{AuthService, SessionSettings, SignedIn};
pub use link_service::{LinkChanges, LinkDraft, LinkPage, LinkService};
pub use slug_allocator::{SlugAllocator, SlugError};
