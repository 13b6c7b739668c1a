use std::io::Write;
use std::path::Path;

use bytes::Bytes;

use imgpack_core::{ArchiveOutput, DownloadedImage, FetchError};

/// Sanitize filename for archive entry to prevent path traversal.
/// Extracts only the base name (strips path components like `../`).
fn sanitize_archive_filename(filename: &str, fallback: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Build a store-only ZIP archive from a batch result.
///
/// Failed slots (`None`) are skipped; the surviving images keep their
/// original batch order and are numbered `1..=k`, so two inputs sharing a
/// basename still produce unique entry names. Fails with
/// [`FetchError::AllDownloadsFailed`] when no slot succeeded, since an
/// empty archive is meaningless to the caller.
pub fn build_zip(results: &[Option<DownloadedImage>]) -> Result<ArchiveOutput, FetchError> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let successes: Vec<&DownloadedImage> = results.iter().flatten().collect();
    if successes.is_empty() {
        return Err(FetchError::AllDownloadsFailed);
    }

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .unix_permissions(0o644);

        for (seq, image) in successes.iter().enumerate() {
            let safe_filename =
                sanitize_archive_filename(&image.filename, &format!("image_{}.jpg", seq + 1));
            let entry_name = format!("{}_{}", seq + 1, safe_filename);

            zip.start_file(&entry_name, options)
                .map_err(|e| FetchError::Network(format!("Failed to add entry to ZIP: {}", e)))?;
            zip.write_all(&image.data)
                .map_err(|e| FetchError::Network(format!("Failed to write entry to ZIP: {}", e)))?;
        }

        zip.finish()
            .map_err(|e| FetchError::Network(format!("Failed to finalize ZIP archive: {}", e)))?;
    }

    let success_count = successes.len();
    tracing::debug!(
        entries = success_count,
        archive_bytes = buffer.len(),
        "Built store-only ZIP archive"
    );

    Ok(ArchiveOutput {
        data: Bytes::from(buffer),
        success_count,
    })
}
