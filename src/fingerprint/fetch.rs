use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use super::{fingerprint_bytes, Fingerprint};
use crate::config::FetchConfig;
use crate::error::{Error, Result};

/// Where the pixels of one frame come from
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FrameSource {
    /// HTTP(S) location of an encoded image
    Url(String),
    /// Encoded image bytes, optionally as a `data:<mime>;base64,` URI
    Base64(String),
    /// Fingerprint computed upstream
    Fingerprint(Fingerprint),
}

/// Resolves frame sources into fingerprints, isolating failures per frame
#[derive(Clone)]
pub struct FrameFetcher {
    client: reqwest::Client,
    timeout: Duration,
    parallelism: usize,
    max_image_bytes: usize,
}

impl FrameFetcher {
    pub fn new(client: reqwest::Client, conf: &FetchConfig) -> Self {
        Self {
            client,
            timeout: conf.timeout(),
            parallelism: conf.parallelism.max(1),
            max_image_bytes: conf.max_image_bytes,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Downloads one image, bounded by the per-fetch timeout and the size limit
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let download = async {
            let response = self.client.get(url).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::HttpStatus(status.as_u16()));
            }

            let limit = self.max_image_bytes;
            if response
                .content_length()
                .is_some_and(|len| len > limit as u64)
            {
                return Err(Error::ImageTooLarge { limit });
            }

            let mut body = Vec::new();
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                if body.len() + chunk.len() > limit {
                    return Err(Error::ImageTooLarge { limit });
                }
                body.extend_from_slice(&chunk);
            }

            Ok::<_, Error>(body)
        };

        tokio::time::timeout(self.timeout, download)
            .await
            .map_err(|_| Error::FetchTimeout(self.timeout))?
    }

    #[instrument(skip(self, source))]
    pub async fn fingerprint_source(&self, source: &FrameSource) -> Result<Fingerprint> {
        match source {
            FrameSource::Fingerprint(fingerprint) => Ok(*fingerprint),
            FrameSource::Base64(data) => {
                let bytes = decode_base64_image(data)?;
                hash_on_blocking_pool(bytes).await
            }
            FrameSource::Url(url) => {
                let bytes = self.fetch_image(url).await?;
                log::debug!("Fetched {} bytes from {}", bytes.len(), url);
                hash_on_blocking_pool(bytes).await
            }
        }
    }

    /// Fingerprints every source concurrently. A failed or timed out frame yields `None` at its
    /// position instead of failing the batch; output order follows input order.
    #[instrument(skip_all, fields(frames = sources.len()))]
    pub async fn fingerprint_all(&self, sources: &[FrameSource]) -> Vec<Option<Fingerprint>> {
        let futures: Vec<_> = sources
            .iter()
            .enumerate()
            .map(|(idx, source)| async move {
                let fingerprint = self
                    .fingerprint_source(source)
                    .await
                    .inspect_err(|err| log::warn!("Frame {} has no fingerprint: {}", idx, err))
                    .ok();
                (idx, fingerprint)
            })
            .collect();

        let mut results: Vec<(usize, Option<Fingerprint>)> = futures::stream::iter(futures)
            .buffer_unordered(self.parallelism)
            .collect()
            .await;
        results.sort_by_key(|(idx, _)| *idx);

        let missing = results.iter().filter(|(_, fp)| fp.is_none()).count();
        if missing > 0 {
            log::info!("{}/{} frames could not be fingerprinted", missing, results.len());
        }

        results.into_iter().map(|(_, fp)| fp).collect()
    }
}

fn decode_base64_image(data: &str) -> Result<Vec<u8>> {
    let payload = match data.strip_prefix("data:") {
        Some(uri) => uri.split_once(";base64,").map_or(uri, |(_, payload)| payload),
        None => data,
    };

    Ok(general_purpose::STANDARD.decode(payload.trim())?)
}

async fn hash_on_blocking_pool(bytes: Vec<u8>) -> Result<Fingerprint> {
    tokio::task::spawn_blocking(move || fingerprint_bytes(&bytes)).await?
}
