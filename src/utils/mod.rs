//! Utility functions for slug generation, URL processing, and request handling.
//!
//! - [`slug_generator`] - Base62 slug generation and reserved words
//! - [`urls`] - Short URL / QR URL construction and destination checks
//! - [`client_ip`] - Client IP extraction from proxy headers
//! - [`password`] - bcrypt hashing for protected links

pub mod client_ip;
pub mod password;
pub mod slug_generator;
pub mod urls;
