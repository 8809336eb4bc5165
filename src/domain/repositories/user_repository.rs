//! Repository trait for user accounts.

use crate::domain::entities::User;
use crate::domain::plan::PlanType;
use crate::domain::session::OAuthProfile;
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for user accounts.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates the user for `profile` or refreshes `name`/`image` of the
    /// existing user with the same email.
    ///
    /// New users start on [`PlanType::Free`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn upsert_from_profile(&self, profile: &OAuthProfile) -> Result<User, AppError>;

    /// Finds a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Finds a user by email (exact match).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Sets locale and timezone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update_preferences(
        &self,
        id: Uuid,
        locale: &str,
        timezone: &str,
    ) -> Result<(), AppError>;

    /// Moves a user to another plan.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn set_plan(&self, id: Uuid, plan: PlanType) -> Result<(), AppError>;

    /// Lists the most recently created users.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, limit: i64) -> Result<Vec<User>, AppError>;
}
