//! The `ImageFetcher` facade: validate, download, schedule, archive.

use std::sync::Arc;

use imgpack_core::{ArchiveOutput, DownloadedImage, FetchError, FetcherConfig, LogLevel};

use crate::{downloader, scheduler, ssrf};

/// Batch image fetcher with SSRF validation and bounded downloads.
///
/// Owns one HTTP client with redirects disabled: a redirect target never
/// goes through validation, so it is never followed. Cheap to clone.
#[derive(Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl ImageFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Validate and download a single URL.
    ///
    /// Validation runs fresh on every call, including the DNS step.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_one(&self, url: &str) -> Result<DownloadedImage, FetchError> {
        let target = ssrf::validate_url(url, &self.config).await?;
        downloader::download(&self.client, &target, &self.config).await
    }

    /// Fetch a whole batch through the worker pool.
    ///
    /// The returned vector has the same length as `urls` and is
    /// index-aligned with it; a failed item becomes `None` in its slot
    /// and never aborts its siblings.
    pub async fn fetch_many(&self, urls: &[String]) -> Vec<Option<DownloadedImage>> {
        let fetcher = self.clone();
        let urls: Arc<[String]> = urls.to_vec().into();
        let concurrency = self.config.concurrency;

        scheduler::run_pool(urls.len(), concurrency, move |index| {
            let fetcher = fetcher.clone();
            let urls = Arc::clone(&urls);
            async move {
                let url = &urls[index];
                match fetcher.fetch_one(url).await {
                    Ok(image) => {
                        tracing::debug!(url = %url, filename = %image.filename, size = image.size, "Fetched image");
                        Some(image)
                    }
                    Err(err) => {
                        match err.log_level() {
                            LogLevel::Error => {
                                tracing::error!(url = %url, error = %err, "Image fetch failed")
                            }
                            LogLevel::Warn => {
                                tracing::warn!(url = %url, error = %err, "Skipping image")
                            }
                        }
                        None
                    }
                }
            }
        })
        .await
    }

    /// Fetch a batch and pack the successes into a store-only zip.
    ///
    /// Errors only when every download failed; otherwise the archive
    /// carries whatever succeeded, and `success_count` reports the actual
    /// number of entries.
    pub async fn build_archive(&self, urls: &[String]) -> Result<ArchiveOutput, FetchError> {
        let results = self.fetch_many(urls).await;
        imgpack_archive::build_zip(&results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssrf::ValidatedTarget;

    fn rejecting_fetcher() -> ImageFetcher {
        // Empty allowlist: every URL is rejected before any network I/O.
        ImageFetcher::new(FetcherConfig {
            allowed_domains: vec![],
            ..FetcherConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_one_revalidates() {
        let fetcher = rejecting_fetcher();
        let err = fetcher
            .fetch_one("https://images.unsplash.com/photo.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::DomainNotAllowed(_)));

        let err = fetcher
            .fetch_one("http://images.unsplash.com/photo.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::SchemeNotAllowed(_)));
    }

    #[tokio::test]
    async fn test_fetch_many_shape_matches_input() {
        let fetcher = rejecting_fetcher();
        let urls = vec![
            "https://images.unsplash.com/a.jpg".to_string(),
            "not a url".to_string(),
            "https://images.unsplash.com/b.jpg".to_string(),
        ];

        let results = fetcher.fetch_many(&urls).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|slot| slot.is_none()));
    }

    #[tokio::test]
    async fn test_build_archive_all_failed() {
        let fetcher = rejecting_fetcher();
        let urls = vec!["https://images.unsplash.com/a.jpg".to_string()];
        let err = fetcher.build_archive(&urls).await.unwrap_err();
        assert!(matches!(err, FetchError::AllDownloadsFailed));
    }

    #[tokio::test]
    async fn test_partial_batch_archives_only_successes() {
        // Downloader-level pipeline: 1st and 3rd item download from a
        // local server, 2nd fails, archive keeps original order.
        let mut server = mockito::Server::new_async().await;
        for path in ["/first.jpg", "/third.png"] {
            server
                .mock("GET", path)
                .with_status(200)
                .with_header(
                    "content-type",
                    if path.ends_with(".png") {
                        "image/png"
                    } else {
                        "image/jpeg"
                    },
                )
                .with_body(vec![9u8; 2048])
                .create_async()
                .await;
        }
        server
            .mock("GET", "/second.jpg")
            .with_status(500)
            .create_async()
            .await;

        let config = FetcherConfig {
            max_file_size_bytes: 10 * 1024,
            ..FetcherConfig::default()
        };
        let client = reqwest::Client::new();

        let mut results: Vec<Option<DownloadedImage>> = Vec::new();
        for path in ["/first.jpg", "/second.jpg", "/third.png"] {
            let url = format!("{}{}", server.url(), path);
            let target = ValidatedTarget::for_tests(reqwest::Url::parse(&url).unwrap());
            results.push(downloader::download(&client, &target, &config).await.ok());
        }

        assert!(results[0].is_some());
        assert!(results[1].is_none());
        assert!(results[2].is_some());

        let output = imgpack_archive::build_zip(&results).unwrap();
        assert_eq!(output.success_count, 2);

        let mut archive =
            zip::ZipArchive::new(std::io::Cursor::new(output.data.to_vec())).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), "1_first.jpg");
        assert_eq!(archive.by_index(1).unwrap().name(), "2_third.png");
    }

    #[test]
    fn test_fetcher_clone_shares_config() {
        let fetcher = rejecting_fetcher();
        let clone = fetcher.clone();
        assert_eq!(
            clone.config().max_file_size_bytes,
            fetcher.config().max_file_size_bytes
        );
    }
}
