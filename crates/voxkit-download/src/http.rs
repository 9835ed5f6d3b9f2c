//! Streaming HTTP downloads with bounded redirect handling.
//!
//! Redirects are followed manually (the client's own policy is disabled) so
//! the hop limit, relative `Location` resolution and the missing-header case
//! are all under our control.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde::de::DeserializeOwned;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::DownloadError;

/// Maximum number of redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 5;

const USER_AGENT: &str = concat!("voxkit/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP fetcher shared by every installer.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
    max_redirects: usize,
}

impl Downloader {
    /// Create a downloader with the default redirect limit.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_max_redirects(MAX_REDIRECTS)
    }

    /// Create a downloader following at most `max_redirects` hops.
    pub fn with_max_redirects(max_redirects: usize) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(DownloadError::Client)?;

        Ok(Self {
            client,
            max_redirects,
        })
    }

    /// Download `url` to `dest`, creating parent directories as needed.
    ///
    /// `on_progress` receives integer percentages, each strictly greater
    /// than the last, and only when the server declares a content length.
    /// On any failure after `dest` was created the partial file is removed.
    ///
    /// Returns the number of bytes written.
    pub async fn download<F>(
        &self,
        url: &str,
        dest: &Path,
        on_progress: F,
    ) -> Result<u64, DownloadError>
    where
        F: Fn(u8) + Send + Sync,
    {
        let (final_url, response) = self.send(url).await?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| DownloadError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let file = File::create(dest)
            .await
            .map_err(|source| DownloadError::Io {
                path: dest.to_path_buf(),
                source,
            })?;

        info!(url, dest = %dest.display(), "Downloading");

        match write_body(response, file, &final_url, dest, &on_progress).await {
            Ok(bytes) => {
                info!(bytes, dest = %dest.display(), "Download complete");
                Ok(bytes)
            }
            Err(e) => {
                warn!(url, error = %e, "Download failed, removing partial file");
                if let Err(rm) = fs::remove_file(dest).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        warn!(dest = %dest.display(), error = %rm, "Failed to remove partial file");
                    }
                }
                Err(e)
            }
        }
    }

    /// Fetch `url` and parse the whole body as one JSON document.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DownloadError> {
        let (final_url, response) = self.send(url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| DownloadError::Network {
                url: final_url.to_string(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| DownloadError::Json {
            url: final_url.to_string(),
            source,
        })
    }

    /// Issue a GET, following redirects up to the hop limit.
    ///
    /// Returns the final URL together with its successful response.
    async fn send(&self, url: &str) -> Result<(Url, reqwest::Response), DownloadError> {
        let mut current = Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let mut hops = 0usize;

        loop {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|source| DownloadError::Network {
                    url: current.to_string(),
                    source,
                })?;

            let status = response.status();

            if is_followed_redirect(status) {
                if hops >= self.max_redirects {
                    return Err(DownloadError::TooManyRedirects {
                        url: url.to_string(),
                        max: self.max_redirects,
                    });
                }

                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| DownloadError::MissingLocation {
                        url: current.to_string(),
                        status: status.as_u16(),
                    })?;

                // `join` resolves relative locations and keeps absolute ones as-is
                let next = current
                    .join(location)
                    .map_err(|e| DownloadError::InvalidUrl {
                        url: location.to_string(),
                        reason: e.to_string(),
                    })?;

                debug!(from = %current, to = %next, status = status.as_u16(), "Following redirect");
                current = next;
                hops += 1;
                continue;
            }

            if !status.is_success() {
                return Err(DownloadError::HttpStatus {
                    url: current.to_string(),
                    status: status.as_u16(),
                });
            }

            return Ok((current, response));
        }
    }
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Integer percentage of `received` over `total`, capped at 100.
#[allow(clippy::cast_possible_truncation)]
fn percent(received: u64, total: u64) -> u8 {
    (received.saturating_mul(100) / total).min(100) as u8
}

async fn write_body<F>(
    response: reqwest::Response,
    mut file: File,
    url: &Url,
    dest: &Path,
    on_progress: &F,
) -> Result<u64, DownloadError>
where
    F: Fn(u8) + Send + Sync,
{
    let total = response.content_length().filter(|&len| len > 0);
    let mut received: u64 = 0;
    let mut last_percent: Option<u8> = None;
    let mut stream = response.bytes_stream();

    let io_err = |source| DownloadError::Io {
        path: dest.to_path_buf(),
        source,
    };

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| DownloadError::Network {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).await.map_err(io_err)?;
        received += chunk.len() as u64;

        if let Some(total) = total {
            let pct = percent(received, total);
            if last_percent.is_none_or(|last| pct > last) {
                on_progress(pct);
                last_percent = Some(pct);
            }
        }
    }

    file.flush().await.map_err(io_err)?;

    if let Some(expected) = total {
        if received < expected {
            return Err(DownloadError::Incomplete {
                url: url.to_string(),
                received,
                expected,
            });
        }
    }

    Ok(received)
}
