//! Channel reconciliation against the provider
//!
//! Turns a scraped channel list into the minimal set of toggles and pushes
//! them one at a time. A failed toggle is recorded and the batch carries on;
//! the caller decides what a partial failure means for the rest of the run.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::errors::{ActionFailure, AppError, AppResult};
use crate::models::{Action, Channel};
use crate::rules::RuleEngine;
use crate::sources::ChannelProvider;

/// Compute the toggles needed to bring `channels` to the state the rules want
///
/// Channels already in the desired state produce nothing. A channel id that
/// appears twice in one scrape is planned once, from its first occurrence.
pub fn plan_actions(rules: &RuleEngine, channels: &[Channel]) -> Vec<Action> {
    let mut seen = HashSet::new();
    let mut actions = Vec::new();

    for channel in channels {
        if !seen.insert(channel.id.as_str()) {
            debug!("Skipping duplicate channel id {} ({})", channel.id, channel.title);
            continue;
        }

        let Some(target) = rules.decide(channel).target() else {
            continue;
        };
        if target != channel.state() {
            actions.push(Action::for_channel(channel, target));
        }
    }

    actions
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub planned: Vec<Action>,
    pub applied: Vec<Action>,
    pub failures: Vec<ActionFailure>,
}

impl ReconcileReport {
    /// Nothing needed changing
    pub fn is_noop(&self) -> bool {
        self.planned.is_empty()
    }

    /// At least one toggle reached the provider
    pub fn changed_anything(&self) -> bool {
        !self.applied.is_empty()
    }

    /// Fold per-action failures into the run-level error, if any
    pub fn failure(&self) -> Option<AppError> {
        if self.failures.is_empty() {
            None
        } else {
            Some(AppError::ActionFailures {
                failures: self.failures.clone(),
                attempted: self.planned.len(),
            })
        }
    }
}

pub struct Reconciler<P> {
    provider: P,
    rules: RuleEngine,
}

impl<P: ChannelProvider> Reconciler<P> {
    pub fn new(provider: P, rules: RuleEngine) -> Self {
        Self { provider, rules }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn plan(&self, channels: &[Channel]) -> Vec<Action> {
        plan_actions(&self.rules, channels)
    }

    /// Scrape, plan and (unless `dry_run`) apply
    ///
    /// Scrape failures are fatal and returned as errors; toggle failures end
    /// up in the report.
    pub async fn reconcile(&self, dry_run: bool) -> AppResult<ReconcileReport> {
        let channels = self.provider.fetch_channels().await?;
        let planned = self.plan(&channels);
        info!(
            "Provider: {} channels scraped, {} need changing",
            channels.len(),
            planned.len()
        );

        if planned.is_empty() || dry_run {
            for action in &planned {
                info!("Provider (dry run): would {} channel: {}", action.target, action.title);
            }
            return Ok(ReconcileReport {
                planned,
                ..ReconcileReport::default()
            });
        }

        Ok(self.apply(planned).await)
    }

    /// Push every action, collecting failures instead of stopping on them
    pub async fn apply(&self, planned: Vec<Action>) -> ReconcileReport {
        let mut applied = Vec::with_capacity(planned.len());
        let mut failures = Vec::new();

        for action in &planned {
            info!("Provider: {} channel: {}", action.target, action.title);
            match self.provider.apply_action(action).await {
                Ok(()) => applied.push(action.clone()),
                Err(e) => {
                    warn!(
                        "Provider: failed to {} channel {} ({}): {}",
                        action.target, action.title, action.channel_id, e
                    );
                    failures.push(ActionFailure {
                        action: action.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        ReconcileReport {
            planned,
            applied,
            failures,
        }
    }
}
