//! Link creation, management and redirect resolution.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::application::services::slug_allocator::SlugAllocator;
use crate::domain::entities::{Link, LinkFilter, LinkListQuery, LinkPatch, NewLink};
use crate::domain::plan::{
    PlanType, can_create_link, can_use_custom_slug, can_use_password_protection,
};
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::error::AppError;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::slug_generator::IndexSource;
use crate::utils::urls::ShortUrls;

/// Validated input for a new link.
#[derive(Debug, Clone, Default)]
pub struct LinkDraft {
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub custom_slug: Option<String>,
    pub tags: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub password: Option<String>,
}

/// Validated changes to an existing link.
///
/// `expires_at` and `password` use `Some(None)` to clear the value.
#[derive(Debug, Clone, Default)]
pub struct LinkChanges {
    pub original_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub password: Option<Option<String>>,
}

/// One page of links plus the total matching the filter.
#[derive(Debug, Clone)]
pub struct LinkPage {
    pub links: Vec<Link>,
    pub total: i64,
}

/// Service for creating and managing a user's short links.
///
/// Enforces plan quotas and feature flags, allocates slugs through
/// [`SlugAllocator`] and hashes link passwords before storage.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    users: Arc<dyn UserRepository>,
    allocator: SlugAllocator,
    urls: ShortUrls,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// The slug allocator checks existence against `links` and draws
    /// randomness from `source`.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        users: Arc<dyn UserRepository>,
        source: Arc<dyn IndexSource>,
        urls: ShortUrls,
    ) -> Self {
        let allocator = SlugAllocator::new(links.clone(), source);
        Self {
            links,
            users,
            allocator,
            urls,
        }
    }

    /// Creates a link for `user_id`.
    ///
    /// # Flow
    ///
    /// 1. Load the owner's current plan
    /// 2. Check the link quota and plan features (custom slug, password)
    /// 3. Hash the password, if any
    /// 4. Allocate a slug (custom or random)
    /// 5. Insert the link
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthorized`] if the user no longer exists
    /// - [`AppError::Forbidden`] if the plan forbids the request
    /// - [`AppError::Conflict`] if the custom slug is taken, or a concurrent
    ///   insert claimed the slug first
    /// - [`AppError::Unavailable`] if no random slug could be found
    pub async fn create_link(&self, user_id: Uuid, draft: LinkDraft) -> Result<Link, AppError> {
        let plan = self.plan_of(user_id).await?;

        let current = self
            .links
            .count_for_user(user_id, LinkFilter::default())
            .await?;
        if !can_create_link(plan, u64::try_from(current).unwrap_or(0)) {
            return Err(AppError::forbidden(
                "Link limit reached for your plan",
                json!({
                    "plan": plan,
                    "limit": plan.limits().max_links,
                    "current": current,
                }),
            ));
        }

        if draft.custom_slug.is_some() && !can_use_custom_slug(plan) {
            return Err(AppError::forbidden(
                "Custom slugs are not available on your plan",
                json!({ "plan": plan }),
            ));
        }

        let password_hash = match draft.password {
            Some(password) => {
                self.ensure_password_protection(plan)?;
                Some(hash_password(password).await?)
            }
            None => None,
        };

        let slug = self
            .allocator
            .allocate(draft.custom_slug.as_deref())
            .await?;

        let link = self
            .links
            .create(NewLink {
                slug,
                original_url: draft.original_url,
                title: draft.title,
                description: draft.description,
                tags: draft.tags,
                user_id,
                expires_at: draft.expires_at,
                password_hash,
            })
            .await?;

        metrics::counter!("links_created_total").increment(1);
        tracing::info!(slug = %link.slug, user_id = %user_id, "link created");

        Ok(link)
    }

    /// Lists one page of the user's links.
    pub async fn list_links(&self, user_id: Uuid, query: LinkListQuery) -> Result<LinkPage, AppError> {
        let total = self
            .links
            .count_for_user(user_id, query.filter.clone())
            .await?;
        let links = self.links.list_for_user(user_id, query).await?;

        Ok(LinkPage { links, total })
    }

    /// Retrieves a link owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the slug does not exist or belongs to
    /// someone else.
    pub async fn get_link(&self, user_id: Uuid, slug: &str) -> Result<Link, AppError> {
        self.links
            .find_by_slug(slug)
            .await?
            .filter(|link| link.user_id == user_id)
            .ok_or_else(|| link_not_found(slug))
    }

    /// Applies `changes` to a link owned by `user_id`.
    ///
    /// # Errors
    ///
    /// - [`AppError::Forbidden`] if a password is set on a plan without protection
    /// - [`AppError::NotFound`] if the link does not exist for this owner
    pub async fn update_link(
        &self,
        user_id: Uuid,
        slug: &str,
        changes: LinkChanges,
    ) -> Result<Link, AppError> {
        let password_hash = match changes.password {
            Some(Some(password)) => {
                let plan = self.plan_of(user_id).await?;
                self.ensure_password_protection(plan)?;
                Some(Some(hash_password(password).await?))
            }
            Some(None) => Some(None),
            None => None,
        };

        let patch = LinkPatch {
            original_url: changes.original_url,
            title: changes.title,
            description: changes.description,
            tags: changes.tags,
            is_active: changes.is_active,
            expires_at: changes.expires_at,
            password_hash,
        };

        self.links
            .update(slug, user_id, patch)
            .await?
            .ok_or_else(|| link_not_found(slug))
    }

    /// Deletes a link owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist for this owner.
    pub async fn delete_link(&self, user_id: Uuid, slug: &str) -> Result<(), AppError> {
        if !self.links.delete(slug, user_id).await? {
            return Err(link_not_found(slug));
        }
        tracing::info!(slug, user_id = %user_id, "link deleted");
        Ok(())
    }

    /// Resolves a slug for redirection and records the click.
    ///
    /// Click bookkeeping failures are logged and do not block the redirect.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the slug is unknown or the link is inactive
    /// - [`AppError::Gone`] if the link has expired
    /// - [`AppError::Unauthorized`] if the link is protected and `password`
    ///   is missing or wrong
    pub async fn resolve(&self, slug: &str, password: Option<String>) -> Result<Link, AppError> {
        let link = self
            .links
            .find_by_slug(slug)
            .await?
            .filter(|link| link.is_active)
            .ok_or_else(|| link_not_found(slug))?;

        if link.is_expired() {
            return Err(AppError::gone(
                "Short link has expired",
                json!({ "slug": slug, "expired_at": link.expires_at }),
            ));
        }

        if let Some(hash) = &link.password_hash {
            let Some(password) = password else {
                return Err(AppError::unauthorized(
                    "Password required",
                    json!({ "slug": slug }),
                ));
            };
            if !verify_password(password, hash.clone()).await? {
                return Err(AppError::unauthorized(
                    "Invalid password",
                    json!({ "slug": slug }),
                ));
            }
        }

        if let Err(e) = self.links.record_click(link.id).await {
            tracing::warn!(error = %e, slug, "failed to record click");
        }

        Ok(link)
    }

    /// Full short URL for `slug`.
    pub fn short_url(&self, slug: &str) -> String {
        self.urls.short_url(slug)
    }

    /// QR image URL for the short URL of `slug`.
    pub fn qr_code_url(&self, slug: &str) -> String {
        self.urls.qr_code_url(slug)
    }

    /// Checks database connectivity.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.links.ping().await
    }

    async fn plan_of(&self, user_id: Uuid) -> Result<PlanType, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| user.plan)
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": "User no longer exists" }),
                )
            })
    }

    fn ensure_password_protection(&self, plan: PlanType) -> Result<(), AppError> {
        if can_use_password_protection(plan) {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Password protection is not available on your plan",
                json!({ "plan": plan }),
            ))
        }
    }
}

fn link_not_found(slug: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "slug": slug }))
}
