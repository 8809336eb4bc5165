//! Password hashing for protected links.
//!
//! bcrypt is CPU-bound, so both operations run on the blocking thread pool.

use serde_json::json;

use crate::error::AppError;

/// bcrypt work factor.
pub const HASH_COST: u32 = 12;

/// Hashes `password` with bcrypt.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if hashing fails or the blocking task panics.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .map_err(|e| task_failed("Password hashing task failed", e))?
        .map_err(|e| {
            AppError::internal("Password hashing failed", json!({ "reason": e.to_string() }))
        })
}

/// Checks `password` against a bcrypt hash.
///
/// A malformed hash counts as a mismatch.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the blocking task panics.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| task_failed("Password verification task failed", e))?;

    match verified {
        Ok(ok) => Ok(ok),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            Ok(false)
        }
    }
}

fn task_failed(message: &str, e: tokio::task::JoinError) -> AppError {
    AppError::internal(message, json!({ "reason": e.to_string() }))
}
