//! HTTP middleware for request processing and protection.
//!
//! Provides session resolution with route gating, rate limiting, and
//! observability middleware.

pub mod auth;
pub mod rate_limit;
pub mod tracing;
