//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::api::dto::pagination::PaginationMeta;
use crate::application::services::{LinkChanges, LinkDraft};
use crate::domain::entities::Link;
use crate::utils::slug_generator::validate_not_reserved;
use crate::utils::urls::validate_destination;

/// Compiled regex for custom slug validation.
static CUSTOM_SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

const MAX_TAG_LENGTH: usize = 30;

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.iter().any(|t| t.chars().count() > MAX_TAG_LENGTH) {
        return Err(ValidationError::new("tag_length")
            .with_message("Each tag must be at most 30 characters".into()));
    }
    Ok(())
}

const PASSWORD_LENGTH: std::ops::RangeInclusive<usize> = 4..=50;

fn validate_future(at: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *at <= Utc::now() {
        return Err(ValidationError::new("expires_at")
            .with_message("Expiry must be in the future".into()));
    }
    Ok(())
}

/// Request body for `POST /api/links`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    #[validate(custom(function = "validate_destination"))]
    pub original_url: String,

    #[validate(length(max = 200, message = "Maximum 200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 500, message = "Maximum 500 characters"))]
    pub description: Option<String>,

    #[validate(length(min = 3, max = 50, message = "Slug must be 3-50 characters"))]
    #[validate(regex(
        path = "*CUSTOM_SLUG_REGEX",
        message = "Only letters, digits, '-' and '_' are allowed"
    ))]
    #[validate(custom(function = "validate_not_reserved"))]
    pub custom_slug: Option<String>,

    #[validate(length(max = 10, message = "At most 10 tags"))]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,

    #[validate(custom(function = "validate_future"))]
    pub expires_at: Option<DateTime<Utc>>,

    #[validate(length(min = 4, max = 50, message = "Password must be 4-50 characters"))]
    pub password: Option<String>,
}

impl CreateLinkRequest {
    pub fn into_draft(self) -> LinkDraft {
        LinkDraft {
            original_url: self.original_url,
            title: self.title,
            description: self.description,
            custom_slug: self.custom_slug,
            tags: self.tags.unwrap_or_default(),
            expires_at: self.expires_at,
            password: self.password,
        }
    }
}

/// Request body for `PATCH /api/links/{slug}`.
///
/// `expiresAt` and `password` accept `null` to clear the current value.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_nullable_fields"))]
pub struct UpdateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    #[validate(custom(function = "validate_destination"))]
    pub original_url: Option<String>,

    #[validate(length(max = 200, message = "Maximum 200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 500, message = "Maximum 500 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 10, message = "At most 10 tags"))]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,

    pub is_active: Option<bool>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub password: Option<Option<String>>,
}

/// Checks the values being set on nullable fields. Clearing is always allowed.
fn validate_nullable_fields(req: &UpdateLinkRequest) -> Result<(), ValidationError> {
    if let Some(Some(at)) = &req.expires_at {
        validate_future(at)?;
    }
    if let Some(Some(password)) = &req.password
        && !PASSWORD_LENGTH.contains(&password.chars().count())
    {
        return Err(ValidationError::new("password")
            .with_message("Password must be 4-50 characters".into()));
    }
    Ok(())
}

impl UpdateLinkRequest {
    pub fn into_changes(self) -> LinkChanges {
        LinkChanges {
            original_url: self.original_url,
            title: self.title,
            description: self.description,
            tags: self.tags,
            is_active: self.is_active,
            expires_at: self.expires_at,
            password: self.password,
        }
    }
}

/// Public representation of a link. Never exposes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkView {
    pub id: i64,
    pub slug: String,
    pub original_url: String,
    pub short_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub is_protected: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub last_click_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkView {
    pub fn new(link: Link, short_url: String) -> Self {
        Self {
            is_protected: link.is_protected(),
            id: link.id,
            slug: link.slug,
            original_url: link.original_url,
            short_url,
            title: link.title,
            description: link.description,
            tags: link.tags,
            is_active: link.is_active,
            expires_at: link.expires_at,
            click_count: link.click_count,
            last_click_at: link.last_click_at,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Payload of a successful `POST /api/links`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkData {
    pub link: LinkView,
    pub short_url: String,
    pub qr_code_url: String,
}

/// Payload of `GET /api/links`.
#[derive(Debug, Serialize)]
pub struct LinkListData {
    pub links: Vec<LinkView>,
    pub pagination: PaginationMeta,
}

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
