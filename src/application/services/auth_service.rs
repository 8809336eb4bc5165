//! Sign-in completion and session token handling.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::json;

use crate::domain::entities::User;
use crate::domain::repositories::UserRepository;
use crate::domain::session::{OAuthProfile, Session, SessionClaims};
use crate::error::AppError;

/// Session token settings.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// HS256 signing key.
    pub secret: String,
    pub max_age: Duration,
    /// Locale applied to users on sign-in.
    pub default_locale: String,
    /// Timezone applied to users on sign-in.
    pub default_timezone: String,
}

/// Outcome of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: User,
    pub token: String,
}

/// Service turning verified OAuth profiles into signed session tokens.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    max_age: Duration,
    default_locale: String,
    default_timezone: String,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, settings: SessionSettings) -> Self {
        Self {
            users,
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            max_age: settings.max_age,
            default_locale: settings.default_locale,
            default_timezone: settings.default_timezone,
        }
    }

    /// Lifetime of issued tokens.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Completes sign-in for a provider-verified profile.
    ///
    /// Creates the user on first sign-in. Failing to apply the default
    /// locale and timezone is logged and does not abort the sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the user cannot be stored or the
    /// token cannot be signed.
    pub async fn sign_in(&self, profile: &OAuthProfile) -> Result<SignedIn, AppError> {
        let mut user = self.users.upsert_from_profile(profile).await?;

        match self
            .users
            .update_preferences(user.id, &self.default_locale, &self.default_timezone)
            .await
        {
            Ok(()) => {
                user.locale = self.default_locale.clone();
                user.timezone = self.default_timezone.clone();
            }
            Err(e) => {
                tracing::error!(error = %e, email = %user.email, "failed to apply user preferences");
            }
        }

        tracing::info!(provider = %profile.provider, "User signed in: {}", user.email);

        let token = self.issue_token(&user)?;
        Ok(SignedIn { user, token })
    }

    /// Signs a session token for `user`, valid for [`Self::max_age`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if encoding fails.
    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        let claims = SessionClaims::for_user(user, Utc::now(), self.max_age);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            AppError::internal("Failed to sign session", json!({ "reason": e.to_string() }))
        })
    }

    /// Verifies a session token and shapes its claims into a [`Session`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the signature is invalid, the
    /// token has expired or the claims are malformed.
    pub fn authenticate(&self, token: &str) -> Result<Session, AppError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "session token rejected");
            AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Invalid or expired session" }),
            )
        })?;

        Ok(data.claims.into_session())
    }

    /// Records a sign-out.
    pub fn sign_out(&self, session: Option<&Session>) {
        let email = session.map_or("unknown", |s| s.user.email.as_str());
        tracing::info!("User signed out: {}", email);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::PlanType;
    use crate::domain::repositories::MockUserRepository;
    use uuid::Uuid;

    const SECRET: &str = "test-session-secret-with-32-bytes!!";

    fn settings(secret: &str) -> SessionSettings {
        SessionSettings {
            secret: secret.to_string(),
            max_age: Duration::days(30),
            default_locale: "ru".to_string(),
            default_timezone: "Asia/Dushanbe".to_string(),
        }
    }

    fn profile() -> OAuthProfile {
        OAuthProfile {
            provider: "google".to_string(),
            email: "ann@example.com".to_string(),
            name: Some("Ann".to_string()),
            image: None,
        }
    }

    fn stored_user(profile: &OAuthProfile) -> User {
        User {
            id: Uuid::new_v4(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            image: profile.image.clone(),
            plan: PlanType::Free,
            locale: "en".to_string(),
            timezone: "UTC".to_string(),
            created_at: Utc::now(),
        }
    }

    fn service(users: MockUserRepository) -> AuthService {
        AuthService::new(Arc::new(users), settings(SECRET))
    }

    #[tokio::test]
    async fn test_sign_in_issues_verifiable_token() {
        let mut users = MockUserRepository::new();
        users
            .expect_upsert_from_profile()
            .times(1)
            .returning(|p| Ok(stored_user(p)));
        users
            .expect_update_preferences()
            .withf(|_, locale, tz| locale == "ru" && tz == "Asia/Dushanbe")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(users);
        let signed_in = service.sign_in(&profile()).await.unwrap();

        assert_eq!(signed_in.user.locale, "ru");

        let session = service.authenticate(&signed_in.token).unwrap();
        assert_eq!(session.user.id, signed_in.user.id);
        assert_eq!(session.user.email, "ann@example.com");
        assert_eq!(session.user.plan, PlanType::Free);

        let remaining = session.expires - Utc::now();
        assert!(remaining > Duration::days(29) && remaining <= Duration::days(30));
    }

    #[tokio::test]
    async fn test_preference_failure_does_not_abort_sign_in() {
        let mut users = MockUserRepository::new();
        users
            .expect_upsert_from_profile()
            .returning(|p| Ok(stored_user(p)));
        users
            .expect_update_preferences()
            .returning(|_, _, _| Err(AppError::internal("Database error", json!({}))));

        let signed_in = service(users).sign_in(&profile()).await.unwrap();

        assert_eq!(signed_in.user.locale, "en");
        assert!(!signed_in.token.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_failure_propagates() {
        let mut users = MockUserRepository::new();
        users
            .expect_upsert_from_profile()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        users.expect_update_preferences().times(0);

        let result = service(users).sign_in(&profile()).await;

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let user = stored_user(&profile());
        let foreign = AuthService::new(
            Arc::new(MockUserRepository::new()),
            settings("another-secret-that-is-32-bytes-long"),
        )
        .issue_token(&user)
        .unwrap();

        let result = service(MockUserRepository::new()).authenticate(&foreign);

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let user = stored_user(&profile());
        let issued_at = Utc::now() - Duration::days(31);
        let claims = SessionClaims::for_user(&user, issued_at, Duration::days(30));
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = service(MockUserRepository::new()).authenticate(&token);

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = service(MockUserRepository::new());

        assert!(service.authenticate("not.a.jwt").is_err());
        assert!(service.authenticate("").is_err());
    }

    #[test]
    fn test_issued_token_carries_plan() {
        let mut user = stored_user(&profile());
        user.plan = PlanType::Business;

        let service = service(MockUserRepository::new());
        let token = service.issue_token(&user).unwrap();

        assert_eq!(
            service.authenticate(&token).unwrap().user.plan,
            PlanType::Business
        );
    }
}
