//! Where artifact bytes come from

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::{debug, info, instrument, warn};

use crate::config::ArtifactsConfig;
use crate::{Result, WeathercastError};

/// Anything that can hand out an artifact's bytes by its remote id
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    async fn fetch(&self, remote_id: &str) -> Result<Vec<u8>>;
}

/// Downloads `{base_url}{remote_id}` over HTTP, retrying transient failures
pub struct HttpArtifactSource {
    client: ClientWithMiddleware,
    base_url: String,
}

impl HttpArtifactSource {
    pub fn new(config: &ArtifactsConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("weathercast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeathercastError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    #[must_use]
    pub fn url_for(&self, remote_id: &str) -> String {
        format!("{}{}", self.base_url, remote_id)
    }
}

#[async_trait]
impl ArtifactSource for HttpArtifactSource {
    #[instrument(skip(self))]
    async fn fetch(&self, remote_id: &str) -> Result<Vec<u8>> {
        let url = self.url_for(remote_id);
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WeathercastError::download(remote_id, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Artifact request returned HTTP {}", status);
            return Err(WeathercastError::download(
                remote_id,
                format!(
                    "HTTP {} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
            ));
        }

        // Blob stores answer with an HTML page when the id needs a
        // confirmation step or does not point at a file.
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/html"));
        if is_html {
            return Err(WeathercastError::download(
                remote_id,
                "server returned an HTML page instead of the file",
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WeathercastError::download(remote_id, format!("reading body failed: {e}")))?;

        info!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
