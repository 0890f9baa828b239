//! Core business logic for wyr-rs.

pub mod services;

pub use services::*;
