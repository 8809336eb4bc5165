//! Short URL construction and destination URL checks.

use url::Url;
use validator::ValidationError;

/// Hosts that may not be shortened, matched as substrings of the destination host.
pub const FORBIDDEN_HOSTS: &[&str] = &["injo.me", "injo.pro", "localhost"];

const QR_SIZE: u32 = 200;

/// Builds public URLs for slugs.
#[derive(Debug, Clone)]
pub struct ShortUrls {
    base: String,
}

impl ShortUrls {
    /// `development` switches the base to `http://localhost:3000`.
    pub fn new(domain: &str, development: bool) -> Self {
        let base = if development {
            "http://localhost:3000".to_string()
        } else {
            format!("https://{}", domain.trim_end_matches('/'))
        };
        Self { base }
    }

    /// Full short URL for `slug`.
    pub fn short_url(&self, slug: &str) -> String {
        format!("{}/{}", self.base, slug)
    }

    /// QR image URL (qrserver.com) encoding the short URL of `slug`.
    pub fn qr_code_url(&self, slug: &str) -> String {
        qr_code_url(&self.short_url(slug))
    }
}

/// QR image URL for an arbitrary URL.
pub fn qr_code_url(target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!(
        "https://api.qrserver.com/v1/create-qr-code/?size={QR_SIZE}x{QR_SIZE}&data={encoded}"
    )
}

/// Host part of `raw`, or `"unknown"` if it does not parse.
pub fn extract_host(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| "unknown".to_string())
}

/// `validator` hook for destination URLs.
///
/// Accepts absolute `http`/`https` URLs whose host does not point back at
/// the shortener itself.
pub fn validate_destination(raw: &str) -> Result<(), ValidationError> {
    let url = Url::parse(raw)
        .map_err(|_| ValidationError::new("url").with_message("Invalid URL".into()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::new("url")
            .with_message("Only http and https URLs are allowed".into()));
    }

    let host = url
        .host_str()
        .ok_or_else(|| ValidationError::new("url").with_message("URL must have a host".into()))?
        .to_ascii_lowercase();

    if FORBIDDEN_HOSTS.iter().any(|forbidden| host.contains(forbidden)) {
        return Err(ValidationError::new("forbidden_host")
            .with_message("Links to the shortener itself cannot be shortened".into()));
    }

    Ok(())
}
