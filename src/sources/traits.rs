//! Provider-facing trait
//!
//! The reconciler only ever talks to the provider through this trait, which
//! keeps the HTTP client swappable for in-memory fakes in tests.

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{Action, Channel};

#[async_trait]
pub trait ChannelProvider: Send + Sync {
    /// Scrape the current channel list, in page order
    async fn fetch_channels(&self) -> AppResult<Vec<Channel>>;

    /// Push one enable/disable toggle
    async fn apply_action(&self, action: &Action) -> AppResult<()>;
}
