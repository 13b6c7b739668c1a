//! Error types module
//!
//! All fetch and archive failures are unified under the `FetchError` enum.
//! Every variant except `AllDownloadsFailed` describes a single batch item
//! and is absorbed at the scheduler boundary; `AllDownloadsFailed` is the
//! only condition that propagates to the caller of `build_archive`.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Warning level - for rejected or failed items within a batch
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Scheme not allowed: only https URLs are accepted, got '{0}'")]
    SchemeNotAllowed(String),

    #[error("URL must not contain embedded credentials")]
    CredentialsInUrl,

    #[error("Domain not allowed: '{0}' is not in the trusted host list")]
    DomainNotAllowed(String),

    #[error("DNS resolution failed for '{0}'")]
    DnsResolutionFailed(String),

    #[error("Hostname resolves to a private or reserved address: {0}")]
    PrivateIpRejected(std::net::IpAddr),

    #[error("URL returned HTTP status {0}")]
    HttpError(u16),

    #[error("Response is not an image: content-type '{0}'")]
    NotAnImage(String),

    #[error("Advertised content length {length} exceeds limit of {limit} bytes")]
    ContentLengthTooLarge { length: u64, limit: u64 },

    #[error("Download exceeded size limit of {limit} bytes after streaming {streamed} bytes")]
    SizeLimitExceeded { streamed: u64, limit: u64 },

    #[error("Payload too small: {size} bytes is below the {min} byte minimum")]
    TooSmall { size: u64, min: u64 },

    #[error("Download timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("All downloads in the batch failed")]
    AllDownloadsFailed,
}

impl FetchError {
    /// Log level operators should see this error at.
    pub fn log_level(&self) -> LogLevel {
        match self {
            // Rejections of a single candidate URL are expected traffic
            FetchError::InvalidUrl(_)
            | FetchError::SchemeNotAllowed(_)
            | FetchError::CredentialsInUrl
            | FetchError::DomainNotAllowed(_)
            | FetchError::PrivateIpRejected(_)
            | FetchError::NotAnImage(_)
            | FetchError::ContentLengthTooLarge { .. }
            | FetchError::SizeLimitExceeded { .. }
            | FetchError::TooSmall { .. } => LogLevel::Warn,

            // Transient network conditions
            FetchError::DnsResolutionFailed(_)
            | FetchError::HttpError(_)
            | FetchError::Timeout
            | FetchError::Network(_) => LogLevel::Warn,

            FetchError::AllDownloadsFailed => LogLevel::Error,
        }
    }
}
