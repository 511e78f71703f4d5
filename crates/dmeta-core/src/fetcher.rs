//! Archive retrieval: HTTP download of a zipped source tree and extraction
//! to a local directory.

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Cursor};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// HTTP client for fetching source archives.
pub struct Fetcher {
    client: Client,
}

/// A downloaded archive payload plus its content hash.
pub struct ArchivePayload {
    /// Raw zip bytes.
    pub bytes: Vec<u8>,
    /// Hash of the payload, for source metadata.
    pub sha256: String,
}

impl Fetcher {
    /// Creates a new fetcher with the default request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(60))
    }

    /// Creates a new fetcher with a custom request timeout (primarily for
    /// tests).
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dmeta/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client })
    }

    /// Downloads an archive and returns its bytes and hash.
    ///
    /// A 404 maps to [`Error::NotFound`]; any other non-success status maps
    /// to [`Error::Network`].
    pub async fn fetch_archive(&self, url: &str) -> Result<ArchivePayload> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidUrl(format!(
                "'{url}' is not an http(s) URL"
            )));
        }

        debug!("Fetching archive from {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            if status == StatusCode::NOT_FOUND {
                return Err(Error::NotFound(format!(
                    "No archive at '{url}'. Check the URL or the source branch name"
                )));
            }
            match response.error_for_status() {
                Ok(_) => unreachable!("Status should be an error"),
                Err(err) => return Err(Error::Network(err)),
            }
        }

        let bytes = response.bytes().await?.to_vec();
        let sha256 = calculate_sha256(&bytes);
        info!("Fetched {} bytes from {}", bytes.len(), url);

        Ok(ArchivePayload { bytes, sha256 })
    }
}

/// Extract a zip payload into `dest`.
///
/// Entries that would escape the destination directory are skipped rather
/// than written.
pub fn unpack_archive(bytes: &[u8], dest: &Path) -> Result<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::Archive(format!("Failed to open archive: {e}")))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| Error::Archive(format!("Failed to read archive entry: {e}")))?;

        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping archive entry with unsafe path: {}", entry.name());
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = fs::File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
        }
    }

    debug!("Unpacked archive into {}", dest.display());
    Ok(())
}

fn calculate_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    STANDARD.encode(hasher.finalize())
}

// Note: Default is not implemented as Fetcher::new() can fail.
