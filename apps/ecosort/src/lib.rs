//! # EcoSort Library
//!
//! This library exposes the EcoSort modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod clients;
pub mod config;

// Re-export ecosort_core for convenience
pub use ecosort_core;
