//! Loads and saves the two persisted records: the task collection and the
//! set of task ids that have already raised a due-soon alarm.
//!
//! Loading never fails. A missing record is empty; an unreadable or
//! unparsable one is logged and treated as empty, independently of the other.

use crate::error::AppError;
use crate::model::{Task, TaskId};
use crate::storage::kv_store::KeyValueStore;
use std::collections::BTreeSet;

pub const TASKS_KEY: &str = "todos";
pub const ALARMED_IDS_KEY: &str = "alarmedTodoIds";

pub fn load_tasks(store: &dyn KeyValueStore) -> Vec<Task> {
    match try_load_tasks(store) {
        Ok(tasks) => tasks,
        Err(err) => {
            tracing::warn!(key = TASKS_KEY, error = %err, "failed to load tasks, starting empty");
            Vec::new()
        }
    }
}

pub fn try_load_tasks(store: &dyn KeyValueStore) -> Result<Vec<Task>, AppError> {
    let Some(content) = store.get(TASKS_KEY)? else {
        return Ok(Vec::new());
    };
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut tasks: Vec<Task> = serde_json::from_str(&content)?;
    for task in &mut tasks {
        if !task.completed {
            task.completed_at = None;
        }
    }
    Ok(tasks)
}

pub fn load_alarmed_ids(store: &dyn KeyValueStore) -> BTreeSet<TaskId> {
    match try_load_alarmed_ids(store) {
        Ok(ids) => ids,
        Err(err) => {
            tracing::warn!(
                key = ALARMED_IDS_KEY,
                error = %err,
                "failed to load alarmed task ids, starting empty"
            );
            BTreeSet::new()
        }
    }
}

pub fn try_load_alarmed_ids(store: &dyn KeyValueStore) -> Result<BTreeSet<TaskId>, AppError> {
    let Some(content) = store.get(ALARMED_IDS_KEY)? else {
        return Ok(BTreeSet::new());
    };
    if content.trim().is_empty() {
        return Ok(BTreeSet::new());
    }

    Ok(serde_json::from_str(&content)?)
}

pub fn save_tasks(store: &mut dyn KeyValueStore, tasks: &[Task]) -> Result<(), AppError> {
    let content = serde_json::to_string(tasks)?;
    store.set(TASKS_KEY, &content)
}

pub fn save_alarmed_ids(
    store: &mut dyn KeyValueStore,
    ids: &BTreeSet<TaskId>,
) -> Result<(), AppError> {
    let content = serde_json::to_string(ids)?;
    store.set(ALARMED_IDS_KEY, &content)
}
