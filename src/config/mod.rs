use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use url::Url;

pub mod defaults;
pub mod duration_serde;

use crate::errors::{AppError, AppResult};
use crate::utils::describe_secret;
use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub aggregator: AggregatorSettings,
    #[serde(default)]
    pub media_server: MediaServerSettings,
    #[serde(default)]
    pub rules: RuleSettings,
    #[serde(default)]
    pub sync: SyncSettings,
}

/// IPTV provider web console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub pass: String,
    /// Provider-side playlist the channels live in (`s` parameter)
    #[serde(default = "default_provider_playlist")]
    pub playlist: String,
    /// Category searched when listing channels (`c` parameter)
    #[serde(default = "default_provider_category")]
    pub category: String,
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

/// xTeVe websocket endpoint and the EPG activation it performs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorSettings {
    #[serde(default)]
    pub url: String,
    /// Display name of the playlist file to re-ingest
    #[serde(default = "default_aggregator_playlist")]
    pub playlist_name: String,
    /// Inactive mapping entries whose name contains one of these get activated
    #[serde(default = "default_activation_tokens")]
    pub activation_tokens: Vec<String>,
    #[serde(default = "default_group_title")]
    pub group_title: String,
    #[serde(default = "default_mapping_profile")]
    pub mapping_profile: String,
    #[serde(default = "default_xmltv_file")]
    pub xmltv_file: String,
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

/// Emby REST API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaServerSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_task_key")]
    pub task_key: String,
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSettings {
    /// Channels whose title contains one of these are always enabled
    #[serde(default = "default_keep_tokens")]
    pub keep_tokens: Vec<String>,
    /// Channels whose title contains one of these are never auto-disabled
    #[serde(default = "default_exclusions")]
    pub exclusions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_settle_delay", with = "duration_serde")]
    pub settle_delay: Duration,
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub poll_interval: Duration,
    #[serde(default = "default_settle_timeout", with = "duration_serde")]
    pub settle_timeout: Duration,
}

fn default_provider_playlist() -> String {
    DEFAULT_PROVIDER_PLAYLIST.to_string()
}

fn default_provider_category() -> String {
    DEFAULT_PROVIDER_CATEGORY.to_string()
}

fn default_aggregator_playlist() -> String {
    DEFAULT_AGGREGATOR_PLAYLIST.to_string()
}

fn default_activation_tokens() -> Vec<String> {
    to_strings(DEFAULT_ACTIVATION_TOKENS)
}

fn default_group_title() -> String {
    DEFAULT_EPG_GROUP_TITLE.to_string()
}

fn default_mapping_profile() -> String {
    DEFAULT_EPG_MAPPING_PROFILE.to_string()
}

fn default_xmltv_file() -> String {
    DEFAULT_EPG_XMLTV_FILE.to_string()
}

fn default_task_key() -> String {
    DEFAULT_GUIDE_TASK_KEY.to_string()
}

fn default_keep_tokens() -> Vec<String> {
    to_strings(DEFAULT_KEEP_TOKENS)
}

fn default_exclusions() -> Vec<String> {
    to_strings(DEFAULT_EXCLUSIONS)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn default_settle_delay() -> Duration {
    Duration::from_millis(DEFAULT_SETTLE_DELAY_MS)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
}

fn default_settle_timeout() -> Duration {
    Duration::from_secs(DEFAULT_SETTLE_TIMEOUT_SECS)
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            uid: String::new(),
            pass: String::new(),
            playlist: default_provider_playlist(),
            category: default_provider_category(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            playlist_name: default_aggregator_playlist(),
            activation_tokens: default_activation_tokens(),
            group_title: default_group_title(),
            mapping_profile: default_mapping_profile(),
            xmltv_file: default_xmltv_file(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for MediaServerSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            task_key: default_task_key(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            keep_tokens: default_keep_tokens(),
            exclusions: default_exclusions(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            settle_delay: default_settle_delay(),
            poll_interval: default_poll_interval(),
            settle_timeout: default_settle_timeout(),
        }
    }
}

impl Config {
    /// Layer an optional TOML file, prefixed environment variables and the
    /// legacy flat variables, then validate the result.
    pub fn load_from(config_file: Option<&Path>) -> AppResult<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = config_file {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"));

        for (var, key) in LEGACY_ENV_KEYS {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    builder = builder
                        .set_override(*key, value)
                        .map_err(|e| AppError::configuration(e.to_string()))?;
                }
            }
        }

        let config: Config = builder
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| AppError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Check every required setting, reporting all problems at once
    pub fn validate(&self) -> AppResult<()> {
        let mut problems = Vec::new();

        let required = [
            ("provider.url", &self.provider.url),
            ("provider.uid", &self.provider.uid),
            ("provider.pass", &self.provider.pass),
            ("aggregator.url", &self.aggregator.url),
            ("media_server.url", &self.media_server.url),
            ("media_server.api_key", &self.media_server.api_key),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                problems.push(format!("{key} is required"));
            }
        }

        check_url(&mut problems, "provider.url", &self.provider.url, &["http", "https"]);
        check_url(&mut problems, "aggregator.url", &self.aggregator.url, &["ws", "wss"]);
        check_url(&mut problems, "media_server.url", &self.media_server.url, &["http", "https"]);

        if self.aggregator.playlist_name.trim().is_empty() {
            problems.push("aggregator.playlist_name must not be empty".to_string());
        }
        if self.media_server.task_key.trim().is_empty() {
            problems.push("media_server.task_key must not be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::configuration(problems.join("; ")))
        }
    }

    /// Log the effective configuration without revealing credentials
    pub fn log_summary(&self) {
        info!("provider.url: {}", self.provider.url);
        info!("provider.uid: {}", describe_secret(&self.provider.uid));
        info!("provider.pass: {}", describe_secret(&self.provider.pass));
        info!(
            "provider.playlist/category: {}/{}",
            self.provider.playlist, self.provider.category
        );
        info!("aggregator.url: {}", self.aggregator.url);
        info!("aggregator.playlist_name: {}", self.aggregator.playlist_name);
        info!("media_server.url: {}", self.media_server.url);
        info!("media_server.api_key: {}", describe_secret(&self.media_server.api_key));
        info!(
            "rules: keep {:?}, never disable {:?}",
            self.rules.keep_tokens, self.rules.exclusions
        );
        info!(
            "sync: settle {:?}, poll {:?}, timeout {:?}",
            self.sync.settle_delay, self.sync.poll_interval, self.sync.settle_timeout
        );
    }
}

fn check_url(problems: &mut Vec<String>, key: &str, value: &str, schemes: &[&str]) {
    // Emptiness is reported by the required check
    if value.trim().is_empty() {
        return;
    }
    match Url::parse(value.trim()) {
        Ok(url) if schemes.contains(&url.scheme()) => {}
        Ok(url) => problems.push(format!(
            "{key} has unsupported scheme '{}' (expected {})",
            url.scheme(),
            schemes.join(" or ")
        )),
        Err(e) => problems.push(format!("{key} is not a valid URL: {e}")),
    }
}
