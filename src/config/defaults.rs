//! Configuration default values
//!
//! Central place for every default the config sections fall back to.
// Provider defaults
pub const DEFAULT_PROVIDER_PLAYLIST: &str = "NO_EPG";
pub const DEFAULT_PROVIDER_CATEGORY: &str = "MLB";

// Aggregator defaults
pub const DEFAULT_AGGREGATOR_PLAYLIST: &str = "NO_EPG";
pub const DEFAULT_EPG_GROUP_TITLE: &str = "NO_EPG";
pub const DEFAULT_EPG_MAPPING_PROFILE: &str = "180_Minutes";
pub const DEFAULT_EPG_XMLTV_FILE: &str = "xTeVe Dummy";
pub const DEFAULT_ACTIVATION_TOKENS: &[&str] = &["tigers"];

// Media server defaults
pub const DEFAULT_GUIDE_TASK_KEY: &str = "RefreshGuide";

// Rule defaults
pub const DEFAULT_KEEP_TOKENS: &[&str] = &["tigers"];
pub const DEFAULT_EXCLUSIONS: &[&str] = &["US MLB San Diego Padres", "US MLB Network"];

// Timing defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_SETTLE_TIMEOUT_SECS: u64 = 10;

// Environment
pub const ENV_PREFIX: &str = "CHANNEL_RECONCILER";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Flat variable names understood for compatibility with existing `.env` files
pub const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("IPTV_API_ADDRESS", "provider.url"),
    ("IPTV_UID", "provider.uid"),
    ("IPTV_PASS", "provider.pass"),
    ("XTEVE_WEB_SOCKET_ADDRESS", "aggregator.url"),
    ("EMBY_API_ADDRESS", "media_server.url"),
    ("EMBY_API_KEY", "media_server.api_key"),
];
