//! Waiting for the aggregator to catch up
//!
//! xTeVe acknowledges nothing and applies commands in the background. A plain
//! pause keeps the phases ordered; after a playlist re-ingest the mapping is
//! also polled until it differs from what it was before the command, bounded
//! by a timeout.

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::aggregator::PlaylistAggregator;
use crate::config::SyncSettings;
use crate::errors::AppResult;
use crate::models::{AggregatorConfig, EpgMapping};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    pub delay: Duration,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl SettlePolicy {
    pub fn from_settings(settings: &SyncSettings) -> Self {
        Self {
            delay: settings.settle_delay,
            poll_interval: settings.poll_interval,
            timeout: settings.settle_timeout,
        }
    }

    /// No waiting at all
    pub fn immediate() -> Self {
        Self {
            delay: Duration::ZERO,
            poll_interval: Duration::ZERO,
            timeout: Duration::ZERO,
        }
    }

    pub async fn pause(&self, next_phase: &str) {
        if self.delay.is_zero() {
            return;
        }
        info!("Waiting {:?} before {}", self.delay, next_phase);
        sleep(self.delay).await;
    }

    /// Re-fetch the server config until its EPG mapping differs from `before`
    ///
    /// Returns the most recent document whether or not a change was seen. A
    /// run that only disabled channels leaves the mapping as it was, so an
    /// unchanged mapping at the deadline is only a warning.
    pub async fn await_mapping_change<A>(
        &self,
        aggregator: &A,
        before: &EpgMapping,
    ) -> AppResult<AggregatorConfig>
    where
        A: PlaylistAggregator + ?Sized,
    {
        let started = Instant::now();
        self.pause("re-fetching the server config").await;

        let mut config = aggregator.fetch_config().await?;
        let mut fetches = 1;

        while config.epg_mapping() == before {
            if started.elapsed() >= self.timeout {
                if !self.timeout.is_zero() {
                    warn!(
                        "EPG mapping unchanged after {:?} ({} fetches), continuing",
                        self.timeout, fetches
                    );
                }
                return Ok(config);
            }
            sleep(self.poll_interval).await;
            config = aggregator.fetch_config().await?;
            fetches += 1;
        }

        debug!("EPG mapping changed after {} fetches", fetches);
        Ok(config)
    }
}
