//! # Ladle Shared Library
//!
//! This crate contains the data layer and domain logic of the Ladle
//! recipe-sharing backend, used by the API server and the offline
//! ingredient importer.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their operations
//! - `auth`: Password hashing and JWT tokens
//! - `db`: Connection pool and migrations
//! - `shopping`: Shopping list aggregation and rendering

pub mod auth;
pub mod db;
pub mod models;
pub mod shopping;

/// Current version of the Ladle shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
