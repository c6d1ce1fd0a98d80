//! End-to-end runs of the orchestrator against in-memory stand-ins for the
//! provider console, the xTeVe websocket and the Emby task API.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use channel_reconciler::aggregator::{AggregatorSyncClient, AggregatorTransport, EpgActivation};
use channel_reconciler::config::{AggregatorSettings, RuleSettings};
use channel_reconciler::errors::{AppError, AppResult};
use channel_reconciler::media_server::{GuideRefreshTrigger, ScheduledTaskApi};
use channel_reconciler::models::{Action, Channel, ScheduledTask, TargetState};
use channel_reconciler::orchestrator::{Orchestrator, RunOutcome, SettlePolicy};
use channel_reconciler::reconciler::Reconciler;
use channel_reconciler::rules::RuleEngine;
use channel_reconciler::sources::{decode_channel_list, ChannelProvider};

const SCENARIO_FRAGMENT: &str = r#"<ul>
  <li><input type="checkbox" id="ch-101" checked><label>US MLB Network</label></li>
  <li><input type="checkbox" id="ch-202"><label>Detroit Tigers</label></li>
</ul>"#;

fn envelope(fragment: &str) -> String {
    json!({"Fs": [0, [0, [0, [0, fragment]]]]}).to_string()
}

/// Provider console serving a fixed list response
struct FakeConsole {
    body: String,
    rejected_ids: Vec<&'static str>,
    toggles: Mutex<Vec<Action>>,
}

impl FakeConsole {
    fn new(body: String) -> Self {
        Self {
            body,
            rejected_ids: Vec::new(),
            toggles: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChannelProvider for FakeConsole {
    async fn fetch_channels(&self) -> AppResult<Vec<Channel>> {
        decode_channel_list(&self.body)
    }

    async fn apply_action(&self, action: &Action) -> AppResult<()> {
        self.toggles.lock().unwrap().push(action.clone());
        if self.rejected_ids.contains(&action.channel_id.as_str()) {
            return Err(AppError::internal("console returned an error page"));
        }
        Ok(())
    }
}

/// xTeVe that only shows the new channel in its mapping after a playlist update
struct FakeXteve {
    playlist_name: &'static str,
    synced: AtomicBool,
    requests: AtomicUsize,
    sent: Mutex<Vec<Value>>,
}

impl FakeXteve {
    fn new(playlist_name: &'static str) -> Self {
        Self {
            playlist_name,
            synced: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.load(Ordering::SeqCst) + self.sent.lock().unwrap().len()
    }

    fn server_config(&self) -> Value {
        let mut mapping = json!({
            "x-ID.1": {"name": "US MLB Network", "x-active": true, "x-mapping": "MLB.us"}
        });
        if self.synced.load(Ordering::SeqCst) {
            mapping["x-ID.2"] = json!({
                "name": "Detroit Tigers",
                "x-active": false,
                "x-mapping": "-",
                "url": "http://p/ch-202?token=a&b=c"
            });
        }
        json!({
            "settings": {"files": {"m3u": {"M7": {"name": self.playlist_name, "tuner": 1}}}},
            "xepg": {"epgMapping": mapping}
        })
    }
}

#[async_trait]
impl AggregatorTransport for FakeXteve {
    async fn request(&self, _message: String) -> AppResult<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.server_config().to_string())
    }

    async fn send(&self, message: String) -> AppResult<()> {
        let payload: Value = serde_json::from_str(&message).unwrap();
        if payload["cmd"] == "updateFileM3U" {
            self.synced.store(true, Ordering::SeqCst);
        }
        self.sent.lock().unwrap().push(payload);
        Ok(())
    }
}

struct FakeEmby {
    tasks: Vec<ScheduledTask>,
    listed: AtomicUsize,
    runs: Mutex<Vec<String>>,
}

impl FakeEmby {
    fn with_keys(keys: &[&str]) -> Self {
        let tasks = keys
            .iter()
            .enumerate()
            .map(|(i, key)| ScheduledTask {
                id: format!("task-{i}"),
                key: key.to_string(),
            })
            .collect();
        Self {
            tasks,
            listed: AtomicUsize::new(0),
            runs: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ScheduledTaskApi for FakeEmby {
    async fn list_tasks(&self) -> AppResult<Vec<ScheduledTask>> {
        self.listed.fetch_add(1, Ordering::SeqCst);
        Ok(self.tasks.clone())
    }

    async fn run_task(&self, task_id: &str) -> AppResult<()> {
        self.runs.lock().unwrap().push(task_id.to_string());
        Ok(())
    }
}

type Pipeline = Orchestrator<FakeConsole, AggregatorSyncClient<FakeXteve>, GuideRefreshTrigger<FakeEmby>>;

fn pipeline(console: FakeConsole, xteve: FakeXteve, emby: FakeEmby) -> Pipeline {
    let settle = SettlePolicy {
        delay: Duration::ZERO,
        poll_interval: Duration::from_millis(1),
        timeout: Duration::from_millis(200),
    };
    Orchestrator::new(
        Reconciler::new(console, RuleEngine::from_settings(&RuleSettings::default())),
        AggregatorSyncClient::new(
            xteve,
            "NO_EPG",
            EpgActivation::from_settings(&AggregatorSettings::default()),
        ),
        GuideRefreshTrigger::new(emby, "RefreshGuide"),
        settle,
    )
}

#[test]
fn scenario_fragment_parses_and_plans_one_enable() {
    let channels = assert_ok!(decode_channel_list(&envelope(SCENARIO_FRAGMENT)));
    assert_eq!(
        channels,
        vec![
            Channel::new("US MLB Network", "ch-101", true),
            Channel::new("Detroit Tigers", "ch-202", false),
        ]
    );

    let rules = RuleEngine::from_settings(&RuleSettings::default());
    let actions = channel_reconciler::reconciler::plan_actions(&rules, &channels);

    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].channel_id, "ch-202");
    assert_eq!(actions[0].target, TargetState::Enabled);
}

#[tokio::test]
async fn full_run_toggles_syncs_pushes_and_refreshes() {
    let pipeline = pipeline(
        FakeConsole::new(envelope(SCENARIO_FRAGMENT)),
        FakeXteve::new("NO_EPG"),
        FakeEmby::with_keys(&["RefreshLibrary", "RefreshGuide"]),
    );

    let outcome = assert_ok!(pipeline.run().await);
    assert!(matches!(outcome, RunOutcome::Completed { ref activated, .. } if activated == &["Detroit Tigers"]));

    let toggles = pipeline.reconciler().provider().toggles.lock().unwrap().clone();
    assert_eq!(toggles.len(), 1);
    assert_eq!(toggles[0].channel_id, "ch-202");

    let sent = pipeline.aggregator().transport().sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["cmd"], "updateFileM3U");
    assert_eq!(sent[0]["files"]["m3u"]["M7"], json!({"name": "NO_EPG", "tuner": 1}));
    assert_eq!(sent[1]["cmd"], "saveEpgMapping");

    let tigers = &sent[1]["epgMapping"]["x-ID.2"];
    assert_eq!(tigers["x-active"], true);
    assert_eq!(tigers["x-group-title"], "NO_EPG");
    assert_eq!(tigers["x-mapping"], "180_Minutes");
    assert_eq!(tigers["x-xmltv-file"], "xTeVe Dummy");
    assert_eq!(tigers["url"], "http://p/ch-202?token=a&b=c");
    assert_eq!(sent[1]["epgMapping"]["x-ID.1"]["x-mapping"], "MLB.us");

    assert_eq!(*pipeline.guide().api().runs.lock().unwrap(), vec!["task-1".to_string()]);
}

#[tokio::test]
async fn nothing_to_do_never_touches_aggregator_or_media_server() {
    let fragment = r#"<li><input type="checkbox" id="ch-202" checked><label>Detroit Tigers</label></li>
        <li><input type="checkbox" id="ch-303"><label>US MLB Chicago Cubs</label></li>"#;
    let pipeline = pipeline(
        FakeConsole::new(envelope(fragment)),
        FakeXteve::new("NO_EPG"),
        FakeEmby::with_keys(&["RefreshGuide"]),
    );

    let outcome = assert_ok!(pipeline.run().await);

    assert!(matches!(outcome, RunOutcome::NothingToDo));
    assert!(pipeline.reconciler().provider().toggles.lock().unwrap().is_empty());
    assert_eq!(pipeline.aggregator().transport().calls(), 0);
    assert_eq!(pipeline.guide().api().listed.load(Ordering::SeqCst), 0);
    assert!(pipeline.guide().api().runs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_envelope_makes_no_toggle_calls() {
    let body = json!({"Fs": [0, [0, "session expired"]]}).to_string();
    let pipeline = pipeline(
        FakeConsole::new(body),
        FakeXteve::new("NO_EPG"),
        FakeEmby::with_keys(&["RefreshGuide"]),
    );

    let err = assert_err!(pipeline.run().await);

    assert!(matches!(err, AppError::MalformedUpstream { .. }));
    assert!(err.is_fatal());
    assert!(pipeline.reconciler().provider().toggles.lock().unwrap().is_empty());
    assert_eq!(pipeline.aggregator().transport().calls(), 0);
    assert_eq!(pipeline.guide().api().listed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_playlist_fails_before_any_push() {
    let pipeline = pipeline(
        FakeConsole::new(envelope(SCENARIO_FRAGMENT)),
        FakeXteve::new("Sports"),
        FakeEmby::with_keys(&["RefreshGuide"]),
    );

    let err = assert_err!(pipeline.run().await);

    assert!(matches!(err, AppError::PlaylistNotFound { ref name } if name == "NO_EPG"));
    assert!(pipeline.aggregator().transport().sent.lock().unwrap().is_empty());
    assert_eq!(pipeline.guide().api().listed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_refresh_task_fails_without_post() {
    let pipeline = pipeline(
        FakeConsole::new(envelope(SCENARIO_FRAGMENT)),
        FakeXteve::new("NO_EPG"),
        FakeEmby::with_keys(&["RefreshLibrary", "CleanTranscodeFolder"]),
    );

    let err = assert_err!(pipeline.run().await);

    assert!(matches!(err, AppError::TaskNotFound { ref key } if key == "RefreshGuide"));
    assert_eq!(pipeline.guide().api().listed.load(Ordering::SeqCst), 1);
    assert!(pipeline.guide().api().runs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn partial_toggle_failure_finishes_pipeline_then_fails_run() {
    let fragment = r#"<li><input type="checkbox" id="ch-202"><label>Detroit Tigers</label></li>
        <li><input type="checkbox" id="ch-404" checked><label>US MLB New York Mets</label></li>"#;
    let mut console = FakeConsole::new(envelope(fragment));
    console.rejected_ids = vec!["ch-404"];
    let pipeline = pipeline(console, FakeXteve::new("NO_EPG"), FakeEmby::with_keys(&["RefreshGuide"]));

    let err = assert_err!(pipeline.run().await);

    match &err {
        AppError::ActionFailures { failures, attempted } => {
            assert_eq!(*attempted, 2);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].action.channel_id, "ch-404");
            assert_eq!(failures[0].action.target, TargetState::Disabled);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_fatal());
    assert_eq!(pipeline.aggregator().transport().sent.lock().unwrap().len(), 2);
    assert_eq!(pipeline.guide().api().runs.lock().unwrap().len(), 1);
}
