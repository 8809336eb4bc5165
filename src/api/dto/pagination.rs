//! Pagination, search and sort query parameters for link listings.

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::entities::{LinkFilter, LinkListQuery, LinkSort};
use crate::error::AppError;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 50;
const MAX_SEARCH_LENGTH: usize = 100;
const MAX_TAG_LENGTH: usize = 30;

/// Sort key accepted by `sortBy`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    CreatedAt,
    ClickCount,
    Title,
}

impl From<SortBy> for LinkSort {
    fn from(s: SortBy) -> Self {
        match s {
            SortBy::CreatedAt => LinkSort::CreatedAt,
            SortBy::ClickCount => LinkSort::ClickCount,
            SortBy::Title => LinkSort::Title,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query string of `GET /api/links`.
///
/// Uses `serde_with` to parse page numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLinksQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<u32>,

    pub search: Option<String>,

    #[serde(default)]
    pub sort_by: SortBy,

    #[serde(default)]
    pub sort_order: SortOrder,

    pub tag: Option<String>,
}

/// A validated page request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub query: LinkListQuery,
}

impl ListLinksQuery {
    /// Validates the parameters and converts them to a repository query.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `limit`: 10
    /// - `sortBy`: `createdAt`, `sortOrder`: `desc`
    ///
    /// Blank `search` and `tag` values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `page` is 0, `limit` is outside
    /// 1..=50, or `search`/`tag` are too long.
    pub fn resolve(self) -> Result<PageRequest, AppError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);

        if page == 0 {
            return Err(AppError::bad_request(
                "Page must be greater than 0",
                json!({ "page": page }),
            ));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::bad_request(
                "Limit must be between 1 and 50",
                json!({ "limit": limit }),
            ));
        }

        let search = non_blank(self.search);
        if search
            .as_deref()
            .is_some_and(|s| s.chars().count() > MAX_SEARCH_LENGTH)
        {
            return Err(AppError::bad_request(
                "Search must be at most 100 characters",
                json!({}),
            ));
        }

        let tag = non_blank(self.tag);
        if tag
            .as_deref()
            .is_some_and(|t| t.chars().count() > MAX_TAG_LENGTH)
        {
            return Err(AppError::bad_request(
                "Tag must be at most 30 characters",
                json!({}),
            ));
        }

        Ok(PageRequest {
            page,
            limit,
            query: LinkListQuery {
                filter: LinkFilter { search, tag },
                sort: self.sort_by.into(),
                descending: matches!(self.sort_order, SortOrder::Desc),
                offset: i64::from(page - 1) * i64::from(limit),
                limit: i64::from(limit),
            },
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Pagination block of list responses.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let limit_i = i64::from(limit.max(1));
        let total_pages = (total.max(0) + limit_i - 1) / limit_i;

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: i64::from(page) < total_pages,
            has_prev: page > 1,
        }
    }
}
