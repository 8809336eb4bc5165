//! Random base62 slug generation and custom slug validation rules.
//!
//! Randomness is taken from an [`IndexSource`] so callers can swap the
//! thread-local RNG for a seeded or scripted source in tests.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Mutex;
use validator::ValidationError;

/// Base62 alphabet: digits, upper case, lower case.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Words that cannot be used as custom slugs because they shadow routes.
///
/// Compared case-insensitively.
pub const RESERVED_SLUGS: &[&str] = &[
    "api",
    "auth",
    "admin",
    "dashboard",
    "pro",
    "www",
    "mail",
    "ftp",
    "blog",
    "help",
    "support",
    "about",
    "terms",
    "privacy",
    "contact",
    "login",
    "register",
];

/// Source of uniformly distributed indices.
pub trait IndexSource: Send + Sync {
    /// Returns an index in `0..upper`. `upper` is never zero.
    fn next_index(&self, upper: usize) -> usize;
}

/// Draws indices from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl IndexSource for ThreadRngSource {
    fn next_index(&self, upper: usize) -> usize {
        rand::rng().random_range(0..upper)
    }
}

/// Deterministic source backed by a seeded [`StdRng`].
#[derive(Debug)]
pub struct SeededSource {
    rng: Mutex<StdRng>,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl IndexSource for SeededSource {
    fn next_index(&self, upper: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(0..upper)
    }
}

/// Builds a slug of exactly `length` characters.
///
/// Each character is an independent draw from `source` over [`ALPHABET`]
/// (sampling with replacement).
pub fn generate_slug(source: &dyn IndexSource, length: usize) -> String {
    (0..length)
        .map(|_| ALPHABET[source.next_index(ALPHABET.len())] as char)
        .collect()
}

/// Returns true if `slug` matches a reserved word, ignoring case.
pub fn is_reserved(slug: &str) -> bool {
    RESERVED_SLUGS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(slug))
}

/// `validator` hook rejecting reserved custom slugs.
pub fn validate_not_reserved(slug: &str) -> Result<(), ValidationError> {
    if is_reserved(slug) {
        return Err(ValidationError::new("reserved").with_message("This slug is reserved".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Cycles through the alphabet in order.
    struct Counting(AtomicUsize);

    impl IndexSource for Counting {
        fn next_index(&self, upper: usize) -> usize {
            self.0.fetch_add(1, Ordering::Relaxed) % upper
        }
    }

    #[test]
    fn test_alphabet_is_base62() {
        let unique: HashSet<u8> = ALPHABET.iter().copied().collect();
        assert_eq!(unique.len(), 62);
        assert!(ALPHABET.iter().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_has_requested_length_and_alphabet() {
        for length in 6..=20 {
            let slug = generate_slug(&ThreadRngSource, length);
            assert_eq!(slug.len(), length);
            assert!(slug.bytes().all(|c| ALPHABET.contains(&c)));
        }
    }

    #[test]
    fn test_generate_maps_indices_to_alphabet() {
        let source = Counting(AtomicUsize::new(8));
        assert_eq!(generate_slug(&source, 6), "89ABCD");
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let a = generate_slug(&SeededSource::new(42), 12);
        let b = generate_slug(&SeededSource::new(42), 12);
        assert_eq!(a, b);
    }

    #[test]
    fn test_thread_rng_slugs_are_distinct() {
        let slugs: HashSet<String> = (0..1000)
            .map(|_| generate_slug(&ThreadRngSource, 10))
            .collect();
        assert_eq!(slugs.len(), 1000);
    }

    #[test]
    fn test_reserved_is_case_insensitive() {
        assert!(is_reserved("admin"));
        assert!(is_reserved("Dashboard"));
        assert!(is_reserved("LOGIN"));
        assert!(!is_reserved("admins"));
        assert!(!is_reserved("my-link"));
    }

    #[test]
    fn test_validate_all_reserved_slugs() {
        for &reserved in RESERVED_SLUGS {
            assert!(
                validate_not_reserved(reserved).is_err(),
                "Reserved slug '{}' should be rejected",
                reserved
            );
        }
        assert!(validate_not_reserved("promo2026").is_ok());
    }
}
