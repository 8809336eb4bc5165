//! Repository traits for link data access.

use crate::domain::entities::{Link, LinkFilter, LinkListQuery, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Read-only existence check keyed by slug.
///
/// This is the only capability [`crate::application::services::SlugAllocator`]
/// needs. Every [`LinkRepository`] is a `LinkStore`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Returns true if a link with exactly this slug exists.
    ///
    /// Comparison is case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn exists(&self, slug: &str) -> Result<bool, AppError>;
}

/// Repository interface for managing short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the slug is already taken. The
    /// `links_slug_key` constraint is the final authority on uniqueness, so
    /// this can happen even after a successful existence check.
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Returns true if a link with exactly this slug exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError>;

    /// Finds a link by its slug, regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError>;

    /// Lists one page of a user's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        query: LinkListQuery,
    ) -> Result<Vec<Link>, AppError>;

    /// Counts a user's links matching `filter`.
    ///
    /// Pass `LinkFilter::default()` to count all of them.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_for_user(&self, user_id: Uuid, filter: LinkFilter) -> Result<i64, AppError>;

    /// Partially updates a link owned by `user_id`.
    ///
    /// Returns `Ok(None)` if no such link exists for that owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(
        &self,
        slug: &str,
        user_id: Uuid,
        patch: LinkPatch,
    ) -> Result<Option<Link>, AppError>;

    /// Deletes a link owned by `user_id`.
    ///
    /// Returns `Ok(true)` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, slug: &str, user_id: Uuid) -> Result<bool, AppError>;

    /// Increments the click counter and stamps `last_click_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_click(&self, link_id: i64) -> Result<(), AppError>;

    /// Round-trips to the database for health checks.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the database is unreachable.
    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
impl<T> LinkStore for T
where
    T: LinkRepository + ?Sized,
{
    async fn exists(&self, slug: &str) -> Result<bool, AppError> {
        self.slug_exists(slug).await
    }
}
