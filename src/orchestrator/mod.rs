//! One reconciliation run, end to end
//!
//! Provider toggles first, then the aggregator round trips, then the guide
//! refresh. Each phase is awaited before the next one starts, and the
//! aggregator and media server are left alone when the provider needed no
//! changes.

use std::fmt;
use tracing::{info, warn};

pub mod settle;

pub use settle::SettlePolicy;

use crate::aggregator::PlaylistAggregator;
use crate::errors::{AppError, AppResult};
use crate::media_server::GuideRefresher;
use crate::models::Action;
use crate::reconciler::{ReconcileReport, Reconciler};
use crate::sources::ChannelProvider;

#[derive(Debug)]
pub enum RunOutcome {
    /// Every channel was already in the desired state
    NothingToDo,
    /// Actions were planned and logged but not applied
    DryRun(Vec<Action>),
    Completed {
        report: ReconcileReport,
        activated: Vec<String>,
    },
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::NothingToDo => write!(f, "no channel changes needed"),
            RunOutcome::DryRun(planned) => {
                write!(f, "dry run: {} channel changes planned", planned.len())
            }
            RunOutcome::Completed { report, activated } => write!(
                f,
                "{} channels reconciled, {} mapping entries activated and pushed, guide refresh triggered",
                report.applied.len(),
                activated.len()
            ),
        }
    }
}

pub struct Orchestrator<P, A, G> {
    reconciler: Reconciler<P>,
    aggregator: A,
    guide: G,
    settle: SettlePolicy,
    dry_run: bool,
}

impl<P, A, G> Orchestrator<P, A, G>
where
    P: ChannelProvider,
    A: PlaylistAggregator,
    G: GuideRefresher,
{
    pub fn new(reconciler: Reconciler<P>, aggregator: A, guide: G, settle: SettlePolicy) -> Self {
        Self {
            reconciler,
            aggregator,
            guide,
            settle,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn reconciler(&self) -> &Reconciler<P> {
        &self.reconciler
    }

    pub fn aggregator(&self) -> &A {
        &self.aggregator
    }

    pub fn guide(&self) -> &G {
        &self.guide
    }

    /// Run every phase in order
    ///
    /// Fatal errors stop the run where they happen. Failed toggles do not, as
    /// long as at least one toggle went through; they are returned as
    /// `ActionFailures` once the rest of the pipeline has finished.
    pub async fn run(&self) -> AppResult<RunOutcome> {
        info!("Reconciling provider channels");
        let report = self.reconciler.reconcile(self.dry_run).await?;

        if report.is_noop() {
            info!("No channel changes needed, skipping aggregator and guide refresh");
            return Ok(RunOutcome::NothingToDo);
        }
        if self.dry_run {
            return Ok(RunOutcome::DryRun(report.planned));
        }
        if !report.changed_anything() {
            // A non-empty plan with nothing applied means every toggle failed
            return Err(report
                .failure()
                .unwrap_or_else(|| AppError::internal("no planned channel change was applied")));
        }

        info!("Syncing aggregator playlist");
        let before = self.aggregator.fetch_config().await?;
        self.settle.pause("the playlist update").await;
        self.aggregator.sync_playlist(&before).await?;

        let fresh = self
            .settle
            .await_mapping_change(&self.aggregator, before.epg_mapping())
            .await?;

        self.settle.pause("the EPG mapping push").await;
        info!("Pushing EPG mapping");
        let activated = self.aggregator.push_mapping(fresh).await?;

        self.settle.pause("the guide refresh").await;
        info!("Triggering guide refresh");
        self.guide.refresh().await?;

        if let Some(err) = report.failure() {
            warn!(
                "Pipeline finished but {} of {} channel changes failed",
                report.failures.len(),
                report.planned.len()
            );
            return Err(err);
        }

        Ok(RunOutcome::Completed { report, activated })
    }
}
