//! Sign-in providers: the seam between the OAuth library and sign-in.
//!
//! A provider builds the authorization redirect and, on callback, trades the
//! authorization code for a verified [`OAuthProfile`]. Everything after that
//! is handled by [`crate::application::services::AuthService::sign_in`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::session::OAuthProfile;
use crate::error::AppError;

/// Redirect to the provider plus the values the callback must see again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Provider authorization URL the browser is sent to.
    pub url: String,
    /// CSRF token echoed back as `?state=`.
    pub state: String,
    /// PKCE code verifier, sent with the code exchange.
    pub pkce_verifier: String,
}

/// An OAuth provider able to verify a user's identity.
///
/// # Implementations
///
/// - [`crate::infrastructure::oauth::GoogleProvider`] - Google OpenID Connect
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Path segment identifying the provider, e.g. `google`.
    fn name(&self) -> &'static str;

    /// Starts a sign-in with a fresh CSRF state and PKCE challenge.
    fn authorization_request(&self) -> AuthorizationRequest;

    /// Exchanges an authorization code for the user's verified profile.
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthorized`] if the provider rejects the code or the
    ///   email is not verified
    /// - [`AppError::Unavailable`] if the provider cannot be reached
    async fn exchange(&self, code: &str, pkce_verifier: &str) -> Result<OAuthProfile, AppError>;
}

/// Providers enabled for this deployment, in registration order.
#[derive(Clone, Default)]
pub struct IdentityProviders {
    providers: Vec<Arc<dyn IdentityProvider>>,
}

impl IdentityProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `provider`, replacing any earlier one with the same name.
    pub fn register(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.providers.retain(|p| p.name() != provider.name());
        self.providers.push(provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn IdentityProvider>> {
        self.providers.iter().find(|p| p.name() == name).cloned()
    }

    /// Provider the login page sends users to.
    pub fn default_name(&self) -> Option<&'static str> {
        self.providers.first().map(|p| p.name())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(name: &'static str) -> Arc<dyn IdentityProvider> {
        let mut mock = MockIdentityProvider::new();
        mock.expect_name().return_const(name);
        Arc::new(mock)
    }

    #[test]
    fn test_lookup_by_name() {
        let providers = IdentityProviders::new()
            .register(provider("google"))
            .register(provider("github"));

        assert!(providers.get("google").is_some());
        assert!(providers.get("github").is_some());
        assert!(providers.get("Google").is_none());
        assert!(providers.get("yandex").is_none());
    }

    #[test]
    fn test_first_registered_is_default() {
        let providers = IdentityProviders::new()
            .register(provider("google"))
            .register(provider("github"));

        assert_eq!(providers.default_name(), Some("google"));
        assert_eq!(providers.names(), vec!["google", "github"]);
    }

    #[test]
    fn test_register_replaces_same_name() {
        let providers = IdentityProviders::new()
            .register(provider("google"))
            .register(provider("google"));

        assert_eq!(providers.names(), vec!["google"]);
    }

    #[test]
    fn test_empty_registry() {
        let providers = IdentityProviders::new();

        assert!(providers.is_empty());
        assert_eq!(providers.default_name(), None);
    }
}
