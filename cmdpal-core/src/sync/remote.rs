//! Remote catalog source
//!
//! The remote publishes a small version descriptor at a well-known URL and a
//! full catalog snapshot at the URL the descriptor points to:
//!
//! ```text
//! commands_version.json  ← {"latestVersion": 7, "dataUrl": "..."}
//! commands.json          ← [ {id, name, platform, category, tags, variations, version}, ... ]
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::PaletteConfig;
use crate::entry::{CatalogEntry, RemoteVersionDescriptor};
use crate::error::SyncError;

/// Where catalog updates come from
///
/// Implementations make exactly one attempt per call; retry policy belongs
/// to the host.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the descriptor naming the newest snapshot
    async fn fetch_descriptor(&self) -> Result<RemoteVersionDescriptor, SyncError>;

    /// Fetch the full snapshot at `data_url`
    async fn fetch_snapshot(&self, data_url: &str) -> Result<Vec<CatalogEntry>, SyncError>;

    /// Source identifier for logging
    fn name(&self) -> &'static str;
}

/// Plain HTTP(S) GET remote
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    version_url: String,
}

impl HttpRemote {
    pub fn new(version_url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        Self::with_user_agent(version_url, timeout, default_user_agent())
    }

    pub fn with_user_agent(
        version_url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, SyncError> {
        const MIN_TIMEOUT: Duration = Duration::from_secs(1);
        let timeout = if timeout < MIN_TIMEOUT {
            warn!(
                "Configured timeout {:?} is too low; using minimum of {:?}",
                timeout, MIN_TIMEOUT
            );
            MIN_TIMEOUT
        } else {
            timeout
        };

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|source| SyncError::Client { source })?;

        Ok(Self {
            client,
            version_url: version_url.into(),
        })
    }

    pub fn from_config(config: &PaletteConfig) -> Result<Self, SyncError> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| default_user_agent().to_string());
        Self::with_user_agent(&config.version_url, config.timeout(), &user_agent)
    }

    pub fn version_url(&self) -> &str {
        &self.version_url
    }
}

fn default_user_agent() -> &'static str {
    concat!("cmdpal/", env!("CARGO_PKG_VERSION"))
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch_descriptor(&self) -> Result<RemoteVersionDescriptor, SyncError> {
        let url = &self.version_url;
        debug!("Fetching version descriptor from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| SyncError::DescriptorFetch {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(SyncError::DescriptorHttp {
                url: url.clone(),
                status: response.status(),
            });
        }

        response
            .json::<RemoteVersionDescriptor>()
            .await
            .map_err(|source| SyncError::DescriptorFetch {
                url: url.clone(),
                source,
            })
    }

    async fn fetch_snapshot(&self, data_url: &str) -> Result<Vec<CatalogEntry>, SyncError> {
        debug!("Downloading catalog snapshot from {}", data_url);

        let response = self
            .client
            .get(data_url)
            .send()
            .await
            .map_err(|source| SyncError::SnapshotFetch {
                url: data_url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(SyncError::SnapshotFetchHttp {
                url: data_url.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<Vec<CatalogEntry>>()
            .await
            .map_err(|source| SyncError::SnapshotFetch {
                url: data_url.to_string(),
                source,
            })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
