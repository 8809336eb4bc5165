//! Session resolution and route gating middleware.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_auth::AuthBearer;
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use std::convert::Infallible;

use crate::domain::session::Session;
use crate::{error::AppError, state::AppState};

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "session_token";

/// Where unauthenticated page requests are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// Page prefixes that need a signed-in user.
const PROTECTED_PAGES: &[&str] = &["/dashboard", "/pro", "/settings"];

/// API prefixes that need a signed-in user.
const PROTECTED_API: &[&str] = &["/api/links"];

/// Outcome of [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    RedirectToLogin,
    Unauthorized,
}

/// Matches `prefix` on whole path segments, so `/pro` covers `/pro/x`
/// but not `/promo`.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Decides whether a request for `path` may proceed.
pub fn authorize(path: &str, authenticated: bool) -> Access {
    if authenticated {
        return Access::Allow;
    }
    if PROTECTED_PAGES.iter().any(|p| under(path, p)) {
        return Access::RedirectToLogin;
    }
    if PROTECTED_API.iter().any(|p| under(path, p)) {
        return Access::Unauthorized;
    }
    Access::Allow
}

/// Extracts the raw session token.
///
/// # Token Sources
///
/// 1. `Authorization: Bearer <token>`
/// 2. `session_token` cookie
async fn session_token(parts: &mut Parts) -> Option<String> {
    if let Ok(AuthBearer(token)) = AuthBearer::from_request_parts(parts, &()).await {
        return Some(token);
    }

    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Resolves the caller's session and gates protected routes.
///
/// # Flow
///
/// 1. Read the token from the Bearer header or the session cookie
/// 2. Verify it via [`crate::application::services::AuthService::authenticate`]
/// 3. Apply [`authorize`] to the request path
/// 4. Store the [`Session`] in request extensions for handlers
///
/// An invalid or expired token is treated the same as no token.
///
/// # Responses
///
/// - Protected pages without a session redirect to [`LOGIN_PATH`]
/// - Protected API routes without a session return `401 Unauthorized`
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    let session = match session_token(&mut parts).await {
        Some(token) => st.auth_service.authenticate(&token).ok(),
        None => None,
    };

    match authorize(parts.uri.path(), session.is_some()) {
        Access::Allow => {}
        Access::RedirectToLogin => return Redirect::to(LOGIN_PATH).into_response(),
        Access::Unauthorized => {
            return AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Sign in required" }),
            )
            .into_response();
        }
    }

    let mut req = Request::from_parts(parts, body);
    if let Some(session) = session {
        req.extensions_mut().insert(session);
    }

    next.run(req).await
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            AppError::unauthorized("Unauthorized", json!({ "reason": "Sign in required" }))
        })
    }
}

impl<S> OptionalFromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Session>().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_redirect_when_signed_out() {
        for path in ["/dashboard", "/dashboard/links", "/pro", "/settings/profile"] {
            assert_eq!(authorize(path, false), Access::RedirectToLogin, "{path}");
        }
    }

    #[test]
    fn test_api_links_rejects_when_signed_out() {
        assert_eq!(authorize("/api/links", false), Access::Unauthorized);
        assert_eq!(authorize("/api/links/abc123", false), Access::Unauthorized);
    }

    #[test]
    fn test_public_paths_pass() {
        for path in [
            "/",
            "/health",
            "/abc123",
            "/promo",
            "/dashboards",
            "/api/auth/session",
            "/auth/login",
        ] {
            assert_eq!(authorize(path, false), Access::Allow, "{path}");
        }
    }

    #[test]
    fn test_signed_in_passes_everywhere() {
        for path in ["/dashboard", "/api/links", "/settings"] {
            assert_eq!(authorize(path, true), Access::Allow);
        }
    }
}
