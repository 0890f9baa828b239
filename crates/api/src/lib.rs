//! HTTP API layer for wyr-rs.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: auth, categories, questions, user profile
//! - **Extractors**: required and optional authentication
//! - **Middleware**: bearer-token resolution into request extensions
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;

pub use endpoints::router;
