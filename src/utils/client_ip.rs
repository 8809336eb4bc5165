//! Client IP extraction from proxy headers.

use axum::http::HeaderMap;

const FALLBACK_IP: &str = "127.0.0.1";

/// Returns the originating client IP for a request.
///
/// Lookup order:
/// 1. First entry of `X-Forwarded-For`
/// 2. `X-Real-IP`
/// 3. `127.0.0.1`
///
/// Headers are trusted as-is; the service is expected to run behind a proxy
/// that overwrites them.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(FALLBACK_IP)
        .to_string()
}
