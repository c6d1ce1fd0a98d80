//! EPG mapping activation
//!
//! After the playlist re-ingest, channels the provider just enabled show up in
//! the mapping as inactive entries with no guide source. Entries whose name
//! matches an activation token get the dummy guide assigned and are switched
//! on. Exactly four fields are written; everything else is left as received.

use tracing::info;

use crate::config::AggregatorSettings;
use crate::models::aggregator::{
    ACTIVE_KEY, GROUP_TITLE_KEY, MAPPING_KEY, XMLTV_FILE_KEY,
};
use crate::models::{EpgEntry, EpgMapping};
use crate::utils::{contains_any_ignore_case, normalize_tokens};

#[derive(Debug, Clone)]
pub struct EpgActivation {
    tokens: Vec<String>,
    group_title: String,
    mapping_profile: String,
    xmltv_file: String,
}

impl EpgActivation {
    pub fn new<S: AsRef<str>>(
        tokens: &[S],
        group_title: impl Into<String>,
        mapping_profile: impl Into<String>,
        xmltv_file: impl Into<String>,
    ) -> Self {
        Self {
            tokens: normalize_tokens(tokens),
            group_title: group_title.into(),
            mapping_profile: mapping_profile.into(),
            xmltv_file: xmltv_file.into(),
        }
    }

    pub fn from_settings(settings: &AggregatorSettings) -> Self {
        Self::new(
            &settings.activation_tokens,
            settings.group_title.as_str(),
            settings.mapping_profile.as_str(),
            settings.xmltv_file.as_str(),
        )
    }

    pub fn matches(&self, entry: &EpgEntry) -> bool {
        !entry.is_active() && contains_any_ignore_case(entry.name(), &self.tokens)
    }

    fn activate(&self, entry: &mut EpgEntry) {
        entry.set(GROUP_TITLE_KEY, self.group_title.as_str());
        entry.set(MAPPING_KEY, self.mapping_profile.as_str());
        entry.set(XMLTV_FILE_KEY, self.xmltv_file.as_str());
        entry.set(ACTIVE_KEY, true);
    }

    /// Activate every matching entry in place, returning their names
    pub fn apply(&self, mapping: &mut EpgMapping) -> Vec<String> {
        let mut activated = Vec::new();
        for entry in mapping.values_mut().filter(|entry| self.matches(entry)) {
            self.activate(entry);
            info!("Aggregator: enabling channel mapping: {}", entry.name());
            activated.push(entry.name().to_string());
        }
        activated
    }
}
