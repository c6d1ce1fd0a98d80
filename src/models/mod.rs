use serde::{Deserialize, Serialize};
use std::fmt;

pub mod aggregator;
pub mod scheduled_task;

pub use aggregator::*;
pub use scheduled_task::ScheduledTask;

/// A channel as scraped from the provider console
///
/// Values are rebuilt on every scrape; only `id` is meaningful across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub title: String,
    pub id: String,
    pub enabled: bool,
}

impl Channel {
    pub fn new(title: impl Into<String>, id: impl Into<String>, enabled: bool) -> Self {
        Self {
            title: title.into(),
            id: id.into(),
            enabled,
        }
    }

    pub fn state(&self) -> TargetState {
        TargetState::from_enabled(self.enabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetState {
    Enabled,
    Disabled,
}

impl TargetState {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }

    /// Literal flag the provider toggle endpoint expects
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::Enabled => "1",
            Self::Disabled => "0",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => write!(f, "enable"),
            Self::Disabled => write!(f, "disable"),
        }
    }
}

/// What the rule engine wants for a single channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Enable,
    Disable,
    NoOpinion,
}

impl Decision {
    pub fn target(&self) -> Option<TargetState> {
        match self {
            Decision::Enable => Some(TargetState::Enabled),
            Decision::Disable => Some(TargetState::Disabled),
            Decision::NoOpinion => None,
        }
    }
}

/// A single state change to push to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub channel_id: String,
    /// Carried for logging only
    pub title: String,
    pub target: TargetState,
}

impl Action {
    pub fn for_channel(channel: &Channel, target: TargetState) -> Self {
        Self {
            channel_id: channel.id.clone(),
            title: channel.title.clone(),
            target,
        }
    }
}
