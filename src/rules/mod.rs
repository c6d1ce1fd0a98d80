//! Channel curation rules
//!
//! Two predicate classes are evaluated independently for every channel:
//!
//! - **keep**: the title contains one of the keep tokens. Desired state is
//!   enabled, whatever the current state.
//! - **prune**: the channel is enabled and its title contains none of the
//!   exclusion entries. Desired state is disabled.
//!
//! When both hold, keep wins. Matching is case-insensitive substring
//! containment and nothing more.

use crate::config::RuleSettings;
use crate::models::{Channel, Decision};
use crate::utils::{contains_any_ignore_case, normalize_tokens};

#[derive(Debug, Clone)]
pub struct RuleEngine {
    keep_tokens: Vec<String>,
    exclusions: Vec<String>,
}

impl RuleEngine {
    pub fn new<K: AsRef<str>, E: AsRef<str>>(keep_tokens: &[K], exclusions: &[E]) -> Self {
        Self {
            keep_tokens: normalize_tokens(keep_tokens),
            exclusions: normalize_tokens(exclusions),
        }
    }

    pub fn from_settings(settings: &RuleSettings) -> Self {
        Self::new(&settings.keep_tokens, &settings.exclusions)
    }

    pub fn decide(&self, channel: &Channel) -> Decision {
        let keep = self.is_kept(&channel.title);
        let prune = channel.enabled && !self.is_excluded(&channel.title);

        if keep {
            Decision::Enable
        } else if prune {
            Decision::Disable
        } else {
            Decision::NoOpinion
        }
    }

    fn is_kept(&self, title: &str) -> bool {
        contains_any_ignore_case(title, &self.keep_tokens)
    }

    fn is_excluded(&self, title: &str) -> bool {
        contains_any_ignore_case(title, &self.exclusions)
    }
}
