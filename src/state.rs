//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::{AuthService, LinkService};
use crate::domain::identity::IdentityProviders;

/// Services available to every handler and middleware.
///
/// Cloned per request; the services themselves are shared behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub auth_service: Arc<AuthService>,
    pub providers: Arc<IdentityProviders>,
    /// Marks session cookies `Secure`. Set when the app is served over HTTPS.
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService>,
        auth_service: Arc<AuthService>,
        providers: Arc<IdentityProviders>,
    ) -> Self {
        Self {
            link_service,
            auth_service,
            providers,
            secure_cookies: false,
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}
