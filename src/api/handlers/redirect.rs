//! Handler for short URL redirect.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Redirect,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;
use crate::utils::urls::extract_host;

/// Query string accepted by the redirect endpoint.
#[derive(Debug, Deserialize)]
pub struct RedirectParams {
    pub password: Option<String>,
}

/// Redirects a slug to its original URL.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// # Request Flow
///
/// 1. Look up the link by slug (case-sensitive)
/// 2. Reject inactive, expired or password-protected links as needed
/// 3. Record the click (failures are logged, not returned)
/// 4. Return 307 Temporary Redirect
///
/// # Errors
///
/// - 404 Not Found if the slug is unknown or the link is inactive
/// - 410 Gone if the link has expired
/// - 401 Unauthorized if `?password=` is missing or wrong for a protected link
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<RedirectParams>,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    let link = state.link_service.resolve(&slug, params.password).await?;

    tracing::info!(
        slug = %slug,
        client_ip = %client_ip(&headers),
        destination = %extract_host(&link.original_url),
        "redirect"
    );

    Ok(Redirect::temporary(&link.original_url))
}
