//! # TidyTask Shared Library
//!
//! Domain model and business rules for the TidyTask todo manager, shared by
//! the HTTP server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: users, categories, tasks and their enums
//! - `domain`: pure rules (validation, due dates, filtering, statistics)
//! - `store`: storage trait with PostgreSQL and in-memory implementations
//! - `service`: the operations front ends call, scoped to an authenticated user
//! - `auth`: password hashing and session tokens
//! - `db`: connection pool and migrations
//! - `seed`: first-run administrator and default categories
//! - `error`: error types shared across modules

pub mod auth;
pub mod db;
pub mod domain;
pub mod error;
pub mod models;
pub mod seed;
pub mod service;
pub mod store;

/// Current version of the TidyTask shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
