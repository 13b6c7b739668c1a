//! Result models for the fetch pipeline.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One successfully downloaded image.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadedImage {
    /// Basename derived from the URL path, normalized to a recognized
    /// image extension.
    pub filename: String,
    /// Raw payload. Skipped in serialized form; only the metadata travels.
    #[serde(skip)]
    pub data: Bytes,
    /// Payload size in bytes. Always within the configured min/max bounds.
    pub size: u64,
}

impl DownloadedImage {
    pub fn new(filename: String, data: Bytes) -> Self {
        let size = data.len() as u64;
        Self {
            filename,
            data,
            size,
        }
    }
}

/// A finished archive plus the number of images actually included.
///
/// `success_count` may be smaller than the number of requested URLs;
/// callers must report this count, not the request length.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchiveOutput {
    #[serde(skip)]
    pub data: Bytes,
    pub success_count: usize,
}
