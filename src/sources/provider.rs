//! IPTV provider console client
//!
//! The console exposes a single form endpoint. A list query returns the
//! channel-list envelope; a toggle query flips one channel in the provider
//! playlist. The session is carried in a `uid`/`pass` cookie.

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::Client;
use tracing::{debug, info};

use super::channel_list::decode_channel_list;
use super::traits::ChannelProvider;
use crate::config::ProviderSettings;
use crate::errors::AppResult;
use crate::models::{Action, Channel};

const USER_AGENT: &str = concat!("channel-reconciler/", env!("CARGO_PKG_VERSION"));

// Console request vocabulary
const REQUEST_TYPE: &str = "4";
const LIST_WIDGET: &str = "sch";
const TOGGLE_WIDGET: &str = "s";

pub struct ProviderClient {
    client: Client,
    url: String,
    cookie: String,
    playlist: String,
    category: String,
}

impl ProviderClient {
    pub fn new(settings: &ProviderSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            url: settings.url.trim().to_string(),
            cookie: session_cookie(&settings.uid, &settings.pass),
            playlist: settings.playlist.clone(),
            category: settings.category.clone(),
        })
    }

    fn list_params(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("jxt", REQUEST_TYPE),
            ("jxw", LIST_WIDGET),
            ("s", self.playlist.as_str()),
            ("c", self.category.as_str()),
        ]
    }

    fn toggle_params<'a>(&'a self, action: &'a Action) -> Vec<(&'static str, &'a str)> {
        vec![
            ("jxt", REQUEST_TYPE),
            ("jxw", TOGGLE_WIDGET),
            ("s", self.playlist.as_str()),
            ("c", action.channel_id.as_str()),
            ("a", action.target.as_flag()),
        ]
    }

    async fn post_form(&self, params: &[(&'static str, &str)]) -> AppResult<String> {
        let response = self
            .client
            .post(&self.url)
            .header(COOKIE, &self.cookie)
            .form(params)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ChannelProvider for ProviderClient {
    async fn fetch_channels(&self) -> AppResult<Vec<Channel>> {
        info!(
            "Provider: querying {} channels in playlist {}",
            self.category, self.playlist
        );
        let body = self.post_form(&self.list_params()).await?;
        debug!("Provider: channel list response is {} bytes", body.len());

        decode_channel_list(&body)
    }

    async fn apply_action(&self, action: &Action) -> AppResult<()> {
        self.post_form(&self.toggle_params(action)).await?;
        Ok(())
    }
}

fn session_cookie(uid: &str, pass: &str) -> String {
    format!("uid={}; pass={}", uid.trim(), pass.trim())
}
