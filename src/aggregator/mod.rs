//! xTeVe synchronisation
//!
//! The aggregator is driven through three commands: fetch the server config,
//! re-ingest one playlist file, and save the EPG mapping. The orchestrator
//! decides when each one runs; this client only knows how.

use async_trait::async_trait;
use tracing::{debug, info};

pub mod mapping;
pub mod transport;

pub use mapping::EpgActivation;
pub use transport::{AggregatorTransport, WebSocketTransport};

use crate::config::AggregatorSettings;
use crate::errors::{AppError, AppResult};
use crate::models::aggregator::{
    get_server_config_request, save_epg_mapping_request, update_playlist_request,
};
use crate::models::AggregatorConfig;

#[async_trait]
pub trait PlaylistAggregator: Send + Sync {
    /// Fetch the whole server configuration document
    async fn fetch_config(&self) -> AppResult<AggregatorConfig>;

    /// Ask the aggregator to re-ingest the configured playlist file
    async fn sync_playlist(&self, config: &AggregatorConfig) -> AppResult<()>;

    /// Activate matching mapping entries and push the whole mapping back
    ///
    /// Takes the document by value: after a push the local copy is stale and a
    /// fresh fetch is required before anything else is mutated.
    async fn push_mapping(&self, config: AggregatorConfig) -> AppResult<Vec<String>>;
}

pub struct AggregatorSyncClient<T> {
    transport: T,
    playlist_name: String,
    activation: EpgActivation,
}

impl AggregatorSyncClient<WebSocketTransport> {
    pub fn from_settings(settings: &AggregatorSettings) -> Self {
        Self::new(
            WebSocketTransport::new(settings.url.trim(), settings.request_timeout),
            settings.playlist_name.clone(),
            EpgActivation::from_settings(settings),
        )
    }
}

impl<T: AggregatorTransport> AggregatorSyncClient<T> {
    pub fn new(transport: T, playlist_name: impl Into<String>, activation: EpgActivation) -> Self {
        Self {
            transport,
            playlist_name: playlist_name.into(),
            activation,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: AggregatorTransport> PlaylistAggregator for AggregatorSyncClient<T> {
    async fn fetch_config(&self) -> AppResult<AggregatorConfig> {
        let request = get_server_config_request()
            .map_err(|e| AppError::internal(format!("failed to encode config request: {e}")))?;
        let reply = self.transport.request(request).await?;

        let config = AggregatorConfig::from_json(&reply)
            .map_err(|e| AppError::protocol(format!("undecodable server config: {e}")))?;
        debug!(
            "Aggregator: config has {} playlist files and {} mapping entries",
            config.settings.files.m3u.len(),
            config.epg_mapping().len()
        );
        Ok(config)
    }

    async fn sync_playlist(&self, config: &AggregatorConfig) -> AppResult<()> {
        let (id, file) = config
            .find_playlist(&self.playlist_name)
            .ok_or_else(|| AppError::playlist_not_found(self.playlist_name.as_str()))?;

        let request = update_playlist_request(id, file)
            .map_err(|e| AppError::internal(format!("failed to encode playlist update: {e}")))?;

        info!("Aggregator: updating playlist {} ({})", self.playlist_name, id);
        self.transport.send(request).await
    }

    async fn push_mapping(&self, mut config: AggregatorConfig) -> AppResult<Vec<String>> {
        let activated = self.activation.apply(config.epg_mapping_mut());
        let mapping = config.into_epg_mapping();

        let request = save_epg_mapping_request(&mapping)
            .map_err(|e| AppError::internal(format!("failed to encode EPG mapping: {e}")))?;

        info!(
            "Aggregator: saving EPG mapping ({} entries, {} activated)",
            mapping.len(),
            activated.len()
        );
        self.transport.send(request).await?;
        Ok(activated)
    }
}
