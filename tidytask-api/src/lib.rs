//! # TidyTask server library
//!
//! HTTP front ends over the task services in `tidytask-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from the environment
//! - `error`: JSON error responses
//! - `middleware`: Authentication and security headers
//! - `routes`: JSON API handlers
//! - `ui`: Server-rendered pages and forms

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod ui;
