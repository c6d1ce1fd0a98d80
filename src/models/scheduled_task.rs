use serde::{Deserialize, Serialize};

/// Entry of the media server's scheduled-task list
///
/// Emby returns a much larger object per task; only the two fields needed to
/// locate and trigger a task are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Key")]
    pub key: String,
}

/// Linear scan for the task registered under `key`
pub fn find_task<'a>(tasks: &'a [ScheduledTask], key: &str) -> Option<&'a ScheduledTask> {
    tasks.iter().find(|task| task.key == key)
}
