use crate::config::toml_config::SourceConfig;
use crate::domain::model::Platform;
use crate::domain::ports::{SnapshotPath, SnapshotSource};
use crate::utils::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Reads snapshots from the static file host over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    telegram_root: Url,
    discord_root: Url,
    cache_bust: bool,
}

fn parse_root(field: &str, raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| DashboardError::InvalidConfigValue {
        field: field.to_string(),
        value: raw.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;
    // Url::join replaces the last segment unless the base ends with a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

impl HttpSource {
    pub fn new(
        telegram_base_url: &str,
        discord_base_url: &str,
        timeout: Duration,
        cache_bust: bool,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            telegram_root: parse_root("source.telegram_base_url", telegram_base_url)?,
            discord_root: parse_root("source.discord_base_url", discord_base_url)?,
            cache_bust,
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Self::new(
            &config.telegram_base_url,
            &config.discord_base_url,
            Duration::from_secs(config.timeout_seconds),
            config.cache_bust,
        )
    }

    pub fn url_for(&self, path: &SnapshotPath) -> Result<Url> {
        let root = match path.platform {
            Platform::Telegram => &self.telegram_root,
            Platform::Discord => &self.discord_root,
        };
        let mut url = root
            .join(&path.path)
            .map_err(|e| DashboardError::ConfigError {
                message: format!("Cannot build URL for {}: {}", path, e),
            })?;
        if self.cache_bust {
            url.query_pairs_mut()
                .append_pair("t", &chrono::Utc::now().timestamp_millis().to_string());
        }
        Ok(url)
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    async fn fetch(&self, path: &SnapshotPath) -> Result<Vec<u8>> {
        let url = self.url_for(path)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("{} -> {}", path, status);

        if status == StatusCode::NOT_FOUND {
            return Err(DashboardError::NotFound {
                resource: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DashboardError::HttpStatus {
                resource: path.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
