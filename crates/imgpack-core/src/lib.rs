//! Imgpack Core Library
//!
//! This crate provides the shared types used across all imgpack components:
//! the `FetchError` enum, the `FetcherConfig` configuration, and the
//! download/archive result models.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::FetcherConfig;
pub use error::{FetchError, LogLevel};
pub use models::{ArchiveOutput, DownloadedImage};
