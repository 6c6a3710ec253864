/*!
 * Media acquisition collaborator.
 *
 * The pipeline never talks HTTP directly; it goes through the [`Fetcher`]
 * trait so the transport can be swapped out (tests use an in-memory mock).
 * [`HttpFetcher`] is the production implementation backed by reqwest.
 */

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use log::debug;
use reqwest::Client;
use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app_config::FetchConfig;
use crate::errors::FetchError;
use crate::file_utils::FileManager;

/// Common trait for media fetchers
///
/// Contract: fetching to a destination that already holds a non-empty file
/// is an idempotent no-op success. Otherwise one bounded-timeout request is
/// made and the body streamed to the destination; success is reported only
/// if a non-empty file results. There is no retry policy at this level.
#[async_trait]
pub trait Fetcher: Send + Sync + Debug {
    /// Acquire `url` into the local file at `dest`
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// HTTP fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// HTTP client with timeout and user-agent applied
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher from the acquisition settings
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;
        Ok(HttpFetcher { client })
    }

    async fn stream_to_file(
        &self,
        mut stream: impl futures_util::Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
        dest: &Path,
    ) -> Result<(), FetchError> {
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| FetchError::WriteFailed {
                path: dest.to_path_buf(),
                message: e.to_string(),
            })?;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::RequestFailed(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| FetchError::WriteFailed {
                    path: dest.to_path_buf(),
                    message: e.to_string(),
                })?;
        }

        file.flush().await.map_err(|e| FetchError::WriteFailed {
            path: dest.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        // Idempotent no-op when the destination is already populated
        if FileManager::is_non_empty_file(dest) {
            debug!("Skipping fetch, destination already populated: {:?}", dest);
            return Ok(());
        }

        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status_code: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let result = self.stream_to_file(response.bytes_stream(), dest).await;

        match result {
            Ok(()) if FileManager::is_non_empty_file(dest) => Ok(()),
            Ok(()) => {
                // A zero-byte leftover would satisfy the idempotence check on
                // a later attempt, so remove it
                let _ = std::fs::remove_file(dest);
                Err(FetchError::EmptyBody(dest.to_path_buf()))
            }
            Err(e) => {
                let _ = std::fs::remove_file(dest);
                Err(e)
            }
        }
    }
}
