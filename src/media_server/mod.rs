//! Emby guide refresh
//!
//! The guide refresh is an Emby scheduled task. Its id differs between
//! installations, so the task list is fetched on every run and searched by
//! key. Triggering is fire-and-forget.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::config::MediaServerSettings;
use crate::errors::{AppError, AppResult};
use crate::models::scheduled_task::find_task;
use crate::models::ScheduledTask;
use crate::utils::sanitize_base_url;

#[async_trait]
pub trait ScheduledTaskApi: Send + Sync {
    async fn list_tasks(&self) -> AppResult<Vec<ScheduledTask>>;

    async fn run_task(&self, task_id: &str) -> AppResult<()>;
}

#[async_trait]
pub trait GuideRefresher: Send + Sync {
    async fn refresh(&self) -> AppResult<()>;
}

pub struct EmbyClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl EmbyClient {
    pub fn new(settings: &MediaServerSettings) -> AppResult<Self> {
        let client = Client::builder().timeout(settings.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: sanitize_base_url(&settings.url),
            api_key: settings.api_key.trim().to_string(),
        })
    }

    fn tasks_url(&self) -> String {
        format!("{}/emby/ScheduledTasks", self.base_url)
    }

    fn run_url(&self, task_id: &str) -> String {
        format!("{}/emby/ScheduledTasks/Running/{}", self.base_url, task_id)
    }
}

#[async_trait]
impl ScheduledTaskApi for EmbyClient {
    async fn list_tasks(&self) -> AppResult<Vec<ScheduledTask>> {
        let tasks = self
            .client
            .get(self.tasks_url())
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<ScheduledTask>>()
            .await?;
        debug!("Media server: {} scheduled tasks", tasks.len());
        Ok(tasks)
    }

    async fn run_task(&self, task_id: &str) -> AppResult<()> {
        self.client
            .post(self.run_url(task_id))
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Finds the refresh task by key and starts it
pub struct GuideRefreshTrigger<A> {
    api: A,
    task_key: String,
}

impl GuideRefreshTrigger<EmbyClient> {
    pub fn from_settings(settings: &MediaServerSettings) -> AppResult<Self> {
        Ok(Self::new(EmbyClient::new(settings)?, settings.task_key.clone()))
    }
}

impl<A: ScheduledTaskApi> GuideRefreshTrigger<A> {
    pub fn new(api: A, task_key: impl Into<String>) -> Self {
        Self {
            api,
            task_key: task_key.into(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

#[async_trait]
impl<A: ScheduledTaskApi> GuideRefresher for GuideRefreshTrigger<A> {
    async fn refresh(&self) -> AppResult<()> {
        let tasks = self.api.list_tasks().await?;
        let task = find_task(&tasks, &self.task_key)
            .ok_or_else(|| AppError::task_not_found(self.task_key.as_str()))?;

        info!("Media server: triggering {} (task {})", self.task_key, task.id);
        self.api.run_task(&task.id).await
    }
}
