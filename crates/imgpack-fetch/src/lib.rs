//! Imgpack Fetch Library
//!
//! The fetch pipeline: SSRF-guarded URL validation, bounded streaming
//! downloads, and a concurrency-limited scheduler, composed behind the
//! [`ImageFetcher`] facade.
//!
//! Trust boundary: a network fetch is only ever issued for a
//! [`ValidatedTarget`], and those are only produced by [`validate_url`].
//! Validation re-runs on every fetch attempt because DNS answers can
//! change between validation and use.

pub mod downloader;
pub mod scheduler;
pub mod service;
pub mod ssrf;

// Re-export commonly used types
pub use service::ImageFetcher;
pub use ssrf::{validate_url, ValidatedTarget};
