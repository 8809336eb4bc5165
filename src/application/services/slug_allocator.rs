//! Unique slug allocation with bounded retry.
//!
//! Random candidates start at [`BASE_LENGTH`] characters and grow by one
//! character every three collisions, for at most [`MAX_ATTEMPTS`] existence
//! checks. The check is a pre-filter: two concurrent allocations can both see
//! a slug as free, and the unique constraint on `links.slug` decides which
//! insert wins.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;

use crate::domain::repositories::{LinkRepository, LinkStore};
use crate::error::AppError;
use crate::utils::slug_generator::{IndexSource, generate_slug};

/// Length of the first random candidate.
pub const BASE_LENGTH: usize = 6;

/// Existence checks performed before giving up.
pub const MAX_ATTEMPTS: usize = 10;

/// Candidate length for the 0-indexed `attempt`.
pub fn candidate_length(attempt: usize) -> usize {
    BASE_LENGTH + attempt / 3
}

/// Failures of [`SlugAllocator::allocate`].
#[derive(Debug, Error)]
pub enum SlugError {
    /// The caller-supplied slug is already in use.
    #[error("slug '{slug}' is already taken")]
    Conflict { slug: String },

    /// Every random candidate collided.
    #[error("no free slug found after {attempts} attempts")]
    Exhausted { attempts: usize },

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<SlugError> for AppError {
    fn from(e: SlugError) -> Self {
        match e {
            SlugError::Conflict { slug } => {
                AppError::conflict("Slug already taken", json!({ "slug": slug }))
            }
            SlugError::Exhausted { attempts } => AppError::unavailable(
                "Could not generate a unique slug, please retry",
                json!({ "attempts": attempts }),
            ),
            SlugError::Store(e) => e,
        }
    }
}

/// Produces slugs that are free at the time they are checked.
///
/// Holds no state between calls besides its collaborators.
pub struct SlugAllocator<S: ?Sized = dyn LinkRepository> {
    store: Arc<S>,
    source: Arc<dyn IndexSource>,
}

impl<S: LinkStore + ?Sized> SlugAllocator<S> {
    /// Creates an allocator over `store`, drawing randomness from `source`.
    pub fn new(store: Arc<S>, source: Arc<dyn IndexSource>) -> Self {
        Self { store, source }
    }

    /// Generates one random candidate of exactly `length` base62 characters.
    pub fn generate(&self, length: usize) -> String {
        generate_slug(self.source.as_ref(), length)
    }

    /// Returns a slug that no stored link used when it was checked.
    ///
    /// A `custom_slug` is returned unchanged if free. It is neither
    /// normalized nor re-validated here; request validation has already run.
    ///
    /// Without a custom slug, up to [`MAX_ATTEMPTS`] random candidates are
    /// checked one after another.
    ///
    /// # Errors
    ///
    /// - [`SlugError::Conflict`] if `custom_slug` exists; not retried
    /// - [`SlugError::Exhausted`] if all random candidates collided
    /// - [`SlugError::Store`] if an existence check fails
    pub async fn allocate(&self, custom_slug: Option<&str>) -> Result<String, SlugError> {
        if let Some(slug) = custom_slug {
            if self.store.exists(slug).await? {
                return Err(SlugError::Conflict {
                    slug: slug.to_string(),
                });
            }
            return Ok(slug.to_string());
        }

        for attempt in 0..MAX_ATTEMPTS {
            let candidate = self.generate(candidate_length(attempt));

            if !self.store.exists(&candidate).await? {
                return Ok(candidate);
            }

            tracing::debug!(attempt, length = candidate.len(), "slug collision, retrying");
        }

        metrics::counter!("slug_allocation_exhausted_total").increment(1);
        tracing::error!(attempts = MAX_ATTEMPTS, "slug allocation exhausted");

        Err(SlugError::Exhausted { attempts: MAX_ATTEMPTS })
    }
}
