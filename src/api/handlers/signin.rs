//! Handlers for the OAuth sign-in flow.
//!
//! # Flow
//!
//! 1. `GET /auth/login` sends the browser to the default provider
//! 2. `GET /api/auth/signin/{provider}` stores CSRF state and the PKCE
//!    verifier in short-lived cookies and redirects to the provider
//! 3. `GET /api/auth/callback/{provider}` checks the state, exchanges the
//!    code, signs the user in and sets the session cookie
//!
//! Failures land on `/auth/error?error=<code>`.

use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration;
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::auth::SESSION_COOKIE;
use crate::error::AppError;
use crate::state::AppState;

const STATE_COOKIE: &str = "oauth_state";
const PKCE_COOKIE: &str = "oauth_pkce";
const FLOW_COOKIE_PATH: &str = "/api/auth";
const FLOW_COOKIE_MINUTES: i64 = 15;

/// Where failed sign-ins are sent.
pub const ERROR_PATH: &str = "/auth/error";

/// Where users land after signing in.
pub const SIGNED_IN_PATH: &str = "/dashboard";

/// Query parameters the provider appends to the callback URL.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set instead of `code` when the user declines consent.
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthErrorQuery {
    pub error: Option<String>,
}

fn to_cookie_duration(d: Duration) -> time::Duration {
    time::Duration::seconds(d.num_seconds())
}

fn flow_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(FLOW_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(to_cookie_duration(Duration::minutes(FLOW_COOKIE_MINUTES)))
        .build()
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(token: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(to_cookie_duration(max_age))
        .build()
}

fn clear_flow(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(STATE_COOKIE).path(FLOW_COOKIE_PATH))
        .remove(Cookie::build(PKCE_COOKIE).path(FLOW_COOKIE_PATH))
}

fn error_redirect(code: &str) -> Redirect {
    Redirect::to(&format!("{ERROR_PATH}?error={code}"))
}

/// Sends the browser to the default sign-in provider.
///
/// # Endpoint
///
/// `GET /auth/login`
pub async fn login_handler(State(state): State<AppState>) -> Redirect {
    match state.providers.default_name() {
        Some(name) => Redirect::to(&format!("/api/auth/signin/{name}")),
        None => {
            tracing::warn!("sign-in requested but no provider is configured");
            error_redirect("Configuration")
        }
    }
}

/// Starts a sign-in with `provider`.
///
/// # Endpoint
///
/// `GET /api/auth/signin/{provider}`
///
/// # Errors
///
/// Returns `404 Not Found` if the provider is not configured.
pub async fn signin_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let provider = state.providers.get(&name).ok_or_else(|| {
        AppError::not_found("Unknown sign-in provider", json!({ "provider": name }))
    })?;

    let request = provider.authorization_request();
    let jar = jar
        .add(flow_cookie(STATE_COOKIE, request.state, state.secure_cookies))
        .add(flow_cookie(PKCE_COOKIE, request.pkce_verifier, state.secure_cookies));

    Ok((jar, Redirect::to(&request.url)))
}

/// Completes a sign-in started by [`signin_handler`].
///
/// # Endpoint
///
/// `GET /api/auth/callback/{provider}?code=…&state=…`
///
/// # Responses
///
/// - Success: session cookie set, redirect to [`SIGNED_IN_PATH`]
/// - Failure: redirect to [`ERROR_PATH`] with `AccessDenied`, `OAuthCallback`
///   or `Callback`
pub async fn callback_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let outcome = complete_sign_in(&state, &name, query, &jar).await;
    let jar = clear_flow(jar);

    match outcome {
        Ok(token) => {
            let cookie = session_cookie(
                token,
                state.auth_service.max_age(),
                state.secure_cookies,
            );
            (jar.add(cookie), Redirect::to(SIGNED_IN_PATH))
        }
        Err(code) => (jar, error_redirect(code)),
    }
}

/// Runs the callback checks, returning the session token or an error code.
async fn complete_sign_in(
    state: &AppState,
    name: &str,
    query: CallbackQuery,
    jar: &CookieJar,
) -> Result<String, &'static str> {
    if let Some(error) = query.error {
        tracing::warn!(provider = %name, error = %error, "provider denied sign-in");
        return Err("AccessDenied");
    }

    let provider = state.providers.get(name).ok_or("Configuration")?;

    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        tracing::warn!(provider = %name, "callback without code or state");
        return Err("OAuthCallback");
    };

    let expected_state = jar.get(STATE_COOKIE).map(|c| c.value());
    let verifier = jar.get(PKCE_COOKIE).map(|c| c.value());
    let (Some(expected_state), Some(verifier)) = (expected_state, verifier) else {
        tracing::warn!(provider = %name, "callback without sign-in cookies");
        return Err("OAuthCallback");
    };
    if expected_state != returned_state {
        tracing::warn!(provider = %name, "OAuth state mismatch");
        return Err("OAuthCallback");
    }

    let profile = provider
        .exchange(&code, verifier)
        .await
        .map_err(|_| "OAuthCallback")?;

    let signed_in = state.auth_service.sign_in(&profile).await.map_err(|e| {
        tracing::error!(error = %e, email = %profile.email, "sign-in failed");
        "Callback"
    })?;

    Ok(signed_in.token)
}

/// Reports a failed sign-in.
///
/// # Endpoint
///
/// `GET /auth/error?error=<code>`
pub async fn auth_error_handler(Query(query): Query<AuthErrorQuery>) -> AppError {
    let error = query.error.unwrap_or_else(|| "Default".to_string());
    AppError::unauthorized("Sign-in failed", json!({ "error": error }))
}
