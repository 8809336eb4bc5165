//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{slug}`        - Short link redirect (public)
//! - `GET  /health`        - Health check (public)
//! - `/api/links/*`        - Link management (session required)
//! - `/api/auth/*`         - OAuth sign-in, session lookup and sign-out
//! - `GET  /auth/login`    - Start sign-in with the default provider
//! - `GET  /auth/error`    - Failed sign-in report
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Session gate** - Resolves the session for every request; protected
//!   pages redirect to the login page, protected API routes return 401
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{auth_error_handler, health_handler, login_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::error::AppError;
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use serde_json::json;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// How clients are keyed for rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimit {
    /// No rate limiting. Used by in-process tests, which have no peer address.
    Disabled,
    /// Keyed by the socket peer address.
    PeerIp,
    /// Keyed by `X-Forwarded-For` / `X-Real-IP`. Trusted reverse proxies only.
    Proxied,
}

async fn not_found() -> AppError {
    AppError::not_found("Not found", json!({}))
}

/// Builds the router with all routes, the session gate and tracing.
///
/// The session gate wraps the fallback too, so unknown paths under a
/// protected prefix are gated before they 404.
pub fn router(state: AppState, limit: RateLimit) -> Router {
    let mut public = Router::new().route("/{slug}", get(redirect_handler));
    let mut api_router = api::routes::link_routes().merge(api::routes::auth_routes());

    match limit {
        RateLimit::Disabled => {}
        RateLimit::PeerIp => {
            public = public.layer(rate_limit::layer());
            api_router = api_router.layer(rate_limit::secure_layer());
        }
        RateLimit::Proxied => {
            public = public.layer(rate_limit::proxied_layer());
            api_router = api_router.layer(rate_limit::proxied_secure_layer());
        }
    }

    Router::new()
        .route("/health", get(health_handler))
        .route("/auth/login", get(login_handler))
        .route("/auth/error", get(auth_error_handler))
        .merge(public)
        .nest("/api", api_router)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router served by [`crate::server::run`].
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let limit = if behind_proxy {
        RateLimit::Proxied
    } else {
        RateLimit::PeerIp
    };

    NormalizePathLayer::trim_trailing_slash().layer(router(state, limit))
}
