//! Image Materializer: download a delivered image into a task directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use scenegen_core::naming::{image_file_name, normalize_url};

/// Errors from downloading or writing a single image.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The asset host returned a non-2xx status code.
    #[error("Fetching {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Writing the image to disk failed.
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads result images and writes them under their resolved names.
#[derive(Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    asset_origin: String,
}

impl ImageFetcher {
    /// Create a fetcher. Scheme-less URLs are resolved against
    /// `asset_origin`.
    pub fn new(asset_origin: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            asset_origin,
        })
    }

    /// Name that [`materialize`](Self::materialize) would write `url` under
    /// for `stem`.
    pub fn file_name(&self, url: &str, stem: &str) -> String {
        image_file_name(stem, &normalize_url(url, &self.asset_origin))
    }

    /// Download `url` and write it to `dir/<stem><ext>`, replacing any
    /// existing file. Returns the written path.
    pub async fn materialize(&self, url: &str, dir: &Path, stem: &str) -> Result<PathBuf, FetchError> {
        let file_name = self.file_name(url, stem);
        let url = normalize_url(url, &self.asset_origin);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;

        let path = dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Image saved");
        Ok(path)
    }
}
