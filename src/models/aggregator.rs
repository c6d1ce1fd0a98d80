//! xTeVe server configuration document and websocket command payloads
//!
//! Only the two regions the reconciler touches are modelled: the M3U playlist
//! files under `settings.files.m3u` and the channel mapping under
//! `xepg.epgMapping`. Playlist files and mapping entries stay raw JSON objects
//! with typed accessors, because `saveEpgMapping` replaces the server's whole
//! mapping collection and anything we fail to echo back is lost.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const GET_SERVER_CONFIG_COMMAND: &str = "getServerConfig";
pub const UPDATE_FILE_M3U_COMMAND: &str = "updateFileM3U";
pub const SAVE_EPG_MAPPING_COMMAND: &str = "saveEpgMapping";

pub type EpgMapping = BTreeMap<String, EpgEntry>;

/// Response to `getServerConfig`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AggregatorConfig {
    pub settings: ServerSettings,
    pub xepg: XepgData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerSettings {
    pub files: PlaylistFiles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistFiles {
    pub m3u: BTreeMap<String, PlaylistFile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct XepgData {
    #[serde(rename = "epgMapping")]
    pub epg_mapping: EpgMapping,
}

// Mapping entry keys the activation rule reads or overwrites
pub const NAME_KEY: &str = "name";
pub const ACTIVE_KEY: &str = "x-active";
pub const GROUP_TITLE_KEY: &str = "x-group-title";
pub const MAPPING_KEY: &str = "x-mapping";
pub const XMLTV_FILE_KEY: &str = "x-xmltv-file";

/// An M3U playlist registered with the aggregator
///
/// Held as the raw object so the update command echoes it back exactly,
/// including keys we never look at and explicit nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistFile(Map<String, Value>);

impl PlaylistFile {
    pub fn name(&self) -> &str {
        self.0.get(NAME_KEY).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn tuner(&self) -> Option<i64> {
        self.0.get("tuner").and_then(Value::as_i64)
    }
}

/// One channel's guide mapping record
///
/// The object is kept in received key order. Overwriting a key that already
/// exists leaves it in place, so an entry nobody touched serializes to the
/// same text it arrived as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpgEntry(Map<String, Value>);

impl EpgEntry {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Channel name; absent, null or non-string reads as empty
    pub fn name(&self) -> &str {
        self.0.get(NAME_KEY).and_then(Value::as_str).unwrap_or_default()
    }

    /// Only an explicit `true` counts as active
    pub fn is_active(&self) -> bool {
        self.0.get(ACTIVE_KEY).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Overwrite one key, keeping its position when it already exists
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl AggregatorConfig {
    /// Decode a `getServerConfig` response frame
    pub fn from_json(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    /// Find the playlist file whose display name equals `name`
    ///
    /// Keys are scanned in sorted order so repeated runs pick the same entry
    /// when the aggregator holds duplicates.
    pub fn find_playlist(&self, name: &str) -> Option<(&str, &PlaylistFile)> {
        self.settings
            .files
            .m3u
            .iter()
            .find(|(_, file)| file.name() == name)
            .map(|(id, file)| (id.as_str(), file))
    }

    pub fn epg_mapping(&self) -> &EpgMapping {
        &self.xepg.epg_mapping
    }

    pub fn epg_mapping_mut(&mut self) -> &mut EpgMapping {
        &mut self.xepg.epg_mapping
    }

    pub fn into_epg_mapping(self) -> EpgMapping {
        self.xepg.epg_mapping
    }
}

#[derive(Debug, Serialize)]
struct CommandRequest<'a> {
    cmd: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateFileM3uRequest<'a> {
    files: UpdateFiles<'a>,
    cmd: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateFiles<'a> {
    m3u: BTreeMap<&'a str, &'a PlaylistFile>,
}

#[derive(Debug, Serialize)]
struct SaveEpgMappingRequest<'a> {
    #[serde(rename = "epgMapping")]
    epg_mapping: &'a EpgMapping,
    cmd: &'a str,
}

/// `{"cmd":"getServerConfig"}`
pub fn get_server_config_request() -> serde_json::Result<String> {
    serde_json::to_string(&CommandRequest {
        cmd: GET_SERVER_CONFIG_COMMAND,
    })
}

/// Update command carrying exactly one playlist file
pub fn update_playlist_request(id: &str, file: &PlaylistFile) -> serde_json::Result<String> {
    let mut m3u = BTreeMap::new();
    m3u.insert(id, file);
    serde_json::to_string(&UpdateFileM3uRequest {
        files: UpdateFiles { m3u },
        cmd: UPDATE_FILE_M3U_COMMAND,
    })
}

/// Save command carrying the whole mapping collection
///
/// serde_json only escapes quotes, backslashes and control characters, so `&`,
/// `<` and `>` in channel names and stream URLs reach the aggregator verbatim.
pub fn save_epg_mapping_request(mapping: &EpgMapping) -> serde_json::Result<String> {
    serde_json::to_string(&SaveEpgMappingRequest {
        epg_mapping: mapping,
        cmd: SAVE_EPG_MAPPING_COMMAND,
    })
}
