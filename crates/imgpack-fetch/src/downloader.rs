//! Bounded single-fetch downloader.
//!
//! One attempt per target, no redirects, a wall-clock deadline over the
//! whole transfer, and streaming size enforcement: the body is counted
//! chunk by chunk and the read is abandoned the moment the running total
//! crosses the ceiling. The advertised `Content-Length` is only an early
//! exit; a server that lies about it is still caught by the counter.

use std::ffi::OsStr;
use std::path::Path;

use bytes::Bytes;
use futures::StreamExt;

use imgpack_core::{DownloadedImage, FetchError, FetcherConfig};

use crate::ssrf::ValidatedTarget;

/// Extensions accepted as-is; anything else is normalized to `.jpg`.
const RECOGNIZED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Download one validated target under the configured byte and time budgets.
pub async fn download(
    client: &reqwest::Client,
    target: &ValidatedTarget,
    config: &FetcherConfig,
) -> Result<DownloadedImage, FetchError> {
    let response = client
        .get(target.url().clone())
        .timeout(config.timeout())
        .send()
        .await
        .map_err(map_transport_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpError(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("application/octet-stream")
        .split(';')
        .next()
        .unwrap_or("application/octet-stream")
        .trim()
        .to_lowercase();

    if !content_type.starts_with("image/") {
        return Err(FetchError::NotAnImage(content_type));
    }

    // Early exit on an honest oversized header. Not a security boundary;
    // the streamed counter below is the authoritative check.
    if let Some(length) = response.content_length() {
        if length > config.max_file_size_bytes {
            return Err(FetchError::ContentLengthTooLarge {
                length,
                limit: config.max_file_size_bytes,
            });
        }
    }

    let filename = filename_from_url(target.url());

    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();
    let mut streamed: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_transport_error)?;
        streamed += chunk.len() as u64;
        if streamed > config.max_file_size_bytes {
            // Dropping the stream cancels the in-flight read.
            return Err(FetchError::SizeLimitExceeded {
                streamed,
                limit: config.max_file_size_bytes,
            });
        }
        buffer.extend_from_slice(&chunk);
    }

    let size = buffer.len() as u64;
    if size < config.min_file_size_bytes {
        return Err(FetchError::TooSmall {
            size,
            min: config.min_file_size_bytes,
        });
    }

    tracing::debug!(
        host = %target.host(),
        filename = %filename,
        size = size,
        "Downloaded image"
    );

    Ok(DownloadedImage::new(filename, Bytes::from(buffer)))
}

fn map_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

/// Basename from the last URL path segment, timestamp-named when the path
/// has none, normalized to a recognized image extension.
fn filename_from_url(url: &reqwest::Url) -> String {
    let raw = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("image_{}.jpg", chrono::Utc::now().timestamp_millis()));

    normalize_extension(&raw)
}

fn normalize_extension(name: &str) -> String {
    let extension = Path::new(name)
        .extension()
        .and_then(OsStr::to_str)
        .map(|e| e.to_lowercase());

    match extension {
        Some(ext) if RECOGNIZED_EXTENSIONS.contains(&ext.as_str()) => name.to_string(),
        _ => format!("{}.jpg", name),
    }
}
