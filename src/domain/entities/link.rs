//! Link entity representing a shortened URL owned by a user.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A shortened URL with its metadata.
///
/// `slug` is unique across all links and case-sensitive.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub slug: String,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub user_id: Uuid,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
    pub click_count: i64,
    pub last_click_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }

    /// Returns true if visitors must supply a password before redirecting.
    pub fn is_protected(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Input data for inserting a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub slug: String,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub user_id: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged. For the nullable columns,
/// `Some(None)` clears the value and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub original_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub password_hash: Option<Option<String>>,
}

/// Column used to order link listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkSort {
    #[default]
    CreatedAt,
    ClickCount,
    Title,
}

impl LinkSort {
    /// SQL column name for this sort key.
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::ClickCount => "click_count",
            Self::Title => "title",
        }
    }
}

/// Search and tag filters applied to a user's links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkFilter {
    /// Case-insensitive substring matched against title, URL and slug.
    pub search: Option<String>,
    /// Exact tag the link must carry.
    pub tag: Option<String>,
}

impl LinkFilter {
    /// Returns true if `link` satisfies both filters.
    pub fn matches(&self, link: &Link) -> bool {
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            let needle = needle.to_lowercase();
            link.original_url.to_lowercase().contains(&needle)
                || link.slug.to_lowercase().contains(&needle)
                || link
                    .title
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&needle))
        });
        let tag_ok = self
            .tag
            .as_deref()
            .is_none_or(|tag| link.tags.iter().any(|t| t == tag));
        search_ok && tag_ok
    }
}

/// A page request over a user's links.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkListQuery {
    pub filter: LinkFilter,
    pub sort: LinkSort,
    pub descending: bool,
    pub offset: i64,
    pub limit: i64,
}
