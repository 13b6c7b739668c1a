use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use imgpack_core::FetcherConfig;
use imgpack_fetch::ImageFetcher;

#[derive(Parser, Debug)]
#[command(name = "imgpack")]
#[command(about = "Download a batch of image URLs into a single zip archive")]
struct Args {
    /// Image URLs to fetch (https only, allowlisted hosts)
    urls: Vec<String>,

    /// File with one URL per line, combined with positional URLs
    #[arg(long, value_name = "PATH")]
    urls_file: Option<PathBuf>,

    /// Output archive path
    #[arg(short, long, default_value = "images.zip")]
    out: PathBuf,

    /// Maximum simultaneous downloads (overrides IMGPACK_CONCURRENCY)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Output format: json or text (default: text)
    #[arg(long, default_value = "text")]
    format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut urls = args.urls.clone();
    if let Some(path) = &args.urls_file {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read URL file {}", path.display()))?;
        urls.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }

    if urls.is_empty() {
        anyhow::bail!("No URLs given; pass them as arguments or via --urls-file");
    }

    let mut config = FetcherConfig::from_env()?;
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 {
            anyhow::bail!("--concurrency must be at least 1");
        }
        config.concurrency = concurrency;
    }

    tracing::info!(
        urls = urls.len(),
        concurrency = config.concurrency,
        out = %args.out.display(),
        "Fetching image batch"
    );

    let fetcher = ImageFetcher::new(config)?;
    let output = fetcher
        .build_archive(&urls)
        .await
        .context("Failed to build image archive")?;

    tokio::fs::write(&args.out, &output.data)
        .await
        .with_context(|| format!("Failed to write archive to {}", args.out.display()))?;

    match args.format.as_str() {
        "json" => {
            let summary = serde_json::json!({
                "requested": urls.len(),
                "archived": output.success_count,
                "archive": args.out.display().to_string(),
                "archive_bytes": output.data.len(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => {
            println!(
                "Archived {} of {} images to {} ({} bytes)",
                output.success_count,
                urls.len(),
                args.out.display(),
                output.data.len()
            );
        }
    }

    Ok(())
}
