//! The application state a front end owns: tasks, alarm state and the store
//! they persist to, behind one set of command and query methods.

use crate::alarm::AlarmMonitor;
use crate::clock::{Clock, SystemClock};
use crate::model::{Task, TaskFields, TaskId};
use crate::organize::{self, SortMode, TaskGroup};
use crate::storage::json_store;
use crate::storage::kv_store::{FileStore, KeyValueStore, MemoryStore};
use crate::store::TaskStore;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TaskCounts {
    pub active: usize,
    pub completed: usize,
}

pub struct TaskApi<S = Box<dyn KeyValueStore>, C = SystemClock> {
    store: TaskStore,
    monitor: AlarmMonitor,
    kv: S,
    clock: C,
}

impl TaskApi<Box<dyn KeyValueStore>, SystemClock> {
    /// Opens the file-backed store at the default location, or an unsaved
    /// in-memory one when that location cannot be resolved.
    pub fn open() -> Self {
        let kv: Box<dyn KeyValueStore> = match FileStore::from_env() {
            Ok(store) => {
                tracing::debug!(dir = %store.dir().display(), "opened task store");
                Box::new(store)
            }
            Err(err) => {
                tracing::error!(error = %err, "no task store location, changes will not be saved");
                Box::new(MemoryStore::new())
            }
        };
        Self::load(kv, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> TaskApi<S, C> {
    /// Reads both persisted records; unreadable ones start empty.
    pub fn load(kv: S, clock: C) -> Self {
        let tasks = json_store::load_tasks(&kv);
        let alarmed = json_store::load_alarmed_ids(&kv);
        tracing::debug!(
            tasks = tasks.len(),
            alarmed = alarmed.len(),
            "loaded task state"
        );

        let mut store = TaskStore::new(tasks);
        if let Some(&highest) = alarmed.last() {
            store.reserve_ids_through(highest);
        }

        Self {
            store,
            monitor: AlarmMonitor::new(alarmed),
            kv,
            clock,
        }
    }

    pub fn add_task(&mut self, fields: TaskFields) -> Option<Task> {
        let now = self.clock.now();
        let Some(task) = self.store.add(fields, now).cloned() else {
            tracing::debug!("ignored task with blank text");
            return None;
        };
        self.persist_tasks();
        Some(task)
    }

    pub fn toggle_task(&mut self, id: TaskId) -> Option<Task> {
        let now = self.clock.now();
        let task = self.store.toggle(id, now).cloned();
        self.after_mutation(id, task.is_some());
        task
    }

    pub fn update_task(&mut self, id: TaskId, fields: TaskFields) -> Option<Task> {
        let task = self.store.update(id, fields).cloned();
        self.after_mutation(id, task.is_some());
        task
    }

    /// Removes the task; a missing id is not an error.
    pub fn delete_task(&mut self, id: TaskId) -> Option<Task> {
        let removed = self.store.delete(id);
        self.after_mutation(id, removed.is_some());
        removed
    }

    pub fn clear_completed_history(&mut self) -> usize {
        let removed = self.store.clear_completed();
        if removed > 0 {
            self.persist_tasks();
        }
        removed
    }

    /// One periodic check cycle. Returns the task that was just alarmed.
    pub fn check_alarm(&mut self) -> Option<Task> {
        let now = self.clock.now();
        tracing::debug!(alarming = self.monitor.current().is_some(), "due-soon check");
        let raised = self.monitor.check(self.store.tasks(), now).cloned()?;
        self.persist_alarmed_ids();
        Some(raised)
    }

    pub fn dismiss_alarm(&mut self) -> Option<Task> {
        self.monitor.dismiss()
    }

    pub fn current_alarm(&self) -> Option<&Task> {
        self.monitor.current()
    }

    pub fn alarm_monitor(&self) -> &AlarmMonitor {
        &self.monitor
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.store.get(id)
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn active_tasks(&self) -> Vec<Task> {
        self.store.active().cloned().collect()
    }

    pub fn completed_tasks(&self) -> Vec<Task> {
        self.store.completed().cloned().collect()
    }

    pub fn organized(&self, mode: SortMode) -> Vec<TaskGroup> {
        organize::organize(self.store.active(), mode)
    }

    pub fn history(&self) -> Vec<Task> {
        organize::history(self.store.completed())
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts {
            active: self.store.active().count(),
            completed: self.store.completed().count(),
        }
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    pub fn key_value_store(&self) -> &S {
        &self.kv
    }

    fn after_mutation(&mut self, id: TaskId, applied: bool) {
        if applied {
            self.persist_tasks();
        } else {
            tracing::debug!(task_id = id, "no task with that id");
        }
    }

    fn persist_tasks(&mut self) {
        if let Err(err) = json_store::save_tasks(&mut self.kv, self.store.tasks()) {
            tracing::error!(error = %err, "failed to save tasks, keeping in-memory state");
        }
    }

    fn persist_alarmed_ids(&mut self) {
        if let Err(err) = json_store::save_alarmed_ids(&mut self.kv, self.monitor.alarmed_ids()) {
            tracing::error!(error = %err, "failed to save alarmed task ids");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaskApi;
    use crate::clock::ManualClock;
    use crate::error::AppError;
    use crate::model::{Priority, TaskFields};
    use crate::organize::SortMode;
    use crate::storage::json_store::{self, ALARMED_IDS_KEY, TASKS_KEY};
    use crate::storage::kv_store::{KeyValueStore, MemoryStore};
    use std::collections::BTreeSet;
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    fn start() -> OffsetDateTime {
        datetime!(2025-12-20 09:00:00 UTC)
    }

    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, AppError> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), AppError> {
            Err(AppError::io("quota exceeded"))
        }
    }

    #[test]
    fn due_soon_task_alarms_once_and_survives_reload() {
        let clock = ManualClock::new(start());
        let mut api = TaskApi::load(MemoryStore::new(), &clock);
        let task = api
            .add_task(
                TaskFields::new("Submit report")
                    .category("Work")
                    .priority(Priority::High)
                    .due(start() + Duration::minutes(4)),
            )
            .unwrap();

        clock.advance(Duration::seconds(10));
        let raised = api.check_alarm().expect("alarm raised");
        assert_eq!(raised.id, task.id);
        assert_eq!(api.current_alarm().map(|task| task.id), Some(task.id));
        assert_eq!(
            json_store::load_alarmed_ids(api.key_value_store()),
            BTreeSet::from([task.id])
        );

        assert_eq!(api.dismiss_alarm().map(|task| task.id), Some(task.id));
        clock.advance(Duration::seconds(10));
        assert!(api.check_alarm().is_none());
        assert!(api.current_alarm().is_none());

        let kv = api.key_value_store().clone();
        let mut reloaded = TaskApi::load(kv, &clock);
        assert!(reloaded.check_alarm().is_none());
    }

    #[test]
    fn every_mutation_rewrites_the_task_record() {
        let clock = ManualClock::new(start());
        let mut api = TaskApi::load(MemoryStore::new(), &clock);

        let id = api.add_task(TaskFields::new("demo")).unwrap().id;
        assert_eq!(json_store::load_tasks(api.key_value_store()).len(), 1);

        api.toggle_task(id);
        let stored = json_store::load_tasks(api.key_value_store());
        assert!(stored[0].completed);
        assert_eq!(stored[0].completed_at, Some(start()));

        api.update_task(id, TaskFields::new("renamed").priority(Priority::Low));
        let stored = json_store::load_tasks(api.key_value_store());
        assert_eq!(stored[0].text, "renamed");
        assert_eq!(stored[0].priority, Priority::Low);

        assert_eq!(api.clear_completed_history(), 1);
        assert!(json_store::load_tasks(api.key_value_store()).is_empty());
    }

    #[test]
    fn clear_history_keeps_active_tasks() {
        let clock = ManualClock::new(start());
        let mut api = TaskApi::load(MemoryStore::new(), &clock);
        let done = api.add_task(TaskFields::new("done")).unwrap().id;
        api.add_task(TaskFields::new("open"));
        api.toggle_task(done);
        let active_before = api.active_tasks();

        api.clear_completed_history();

        assert!(api.completed_tasks().is_empty());
        assert_eq!(api.active_tasks(), active_before);
    }

    #[test]
    fn blank_category_is_grouped_under_general() {
        let clock = ManualClock::new(start());
        let mut api = TaskApi::load(MemoryStore::new(), &clock);
        api.add_task(TaskFields::new("sweep").category(""));

        let groups = api.organized(SortMode::Creation);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category, "General");
    }

    #[test]
    fn organized_lists_higher_priority_first() {
        let clock = ManualClock::new(start());
        let mut api = TaskApi::load(MemoryStore::new(), &clock);
        api.add_task(TaskFields::new("medium").category("Home"));
        clock.advance(Duration::seconds(1));
        api.add_task(TaskFields::new("high").category("Home").priority(Priority::High));

        let groups = api.organized(SortMode::DueDate);
        let texts: Vec<&str> = groups[0].tasks.iter().map(|task| task.text.as_str()).collect();

        assert_eq!(texts, vec!["high", "medium"]);
    }

    #[test]
    fn unknown_ids_and_blank_text_change_nothing() {
        let clock = ManualClock::new(start());
        let mut api = TaskApi::load(MemoryStore::new(), &clock);
        let id = api.add_task(TaskFields::new("demo")).unwrap().id;
        let before = api.tasks().to_vec();

        assert!(api.add_task(TaskFields::new("  ")).is_none());
        assert!(api.toggle_task(id + 1).is_none());
        assert!(api.delete_task(id + 1).is_none());
        assert!(api.update_task(id, TaskFields::new("")).is_none());

        assert_eq!(api.tasks(), before.as_slice());
    }

    #[test]
    fn corrupt_records_start_empty() {
        let kv = MemoryStore::new()
            .with_entry(TASKS_KEY, "not json")
            .with_entry(ALARMED_IDS_KEY, "{}");
        let clock = ManualClock::new(start());

        let api = TaskApi::load(kv, &clock);

        assert!(api.tasks().is_empty());
        assert!(api.alarm_monitor().alarmed_ids().is_empty());
    }

    #[test]
    fn write_failures_keep_in_memory_state() {
        let clock = ManualClock::new(start());
        let mut api = TaskApi::load(ReadOnlyStore(MemoryStore::new()), &clock);

        let task = api
            .add_task(TaskFields::new("offline").due(start() + Duration::minutes(3)))
            .expect("added in memory");
        assert_eq!(api.counts().active, 1);
        assert_eq!(api.check_alarm().map(|raised| raised.id), Some(task.id));
        assert!(api.alarm_monitor().has_alarmed(task.id));
    }

    #[test]
    fn history_lists_latest_completion_first() {
        let clock = ManualClock::new(start());
        let mut api = TaskApi::load(MemoryStore::new(), &clock);
        let first = api.add_task(TaskFields::new("first")).unwrap().id;
        let second = api.add_task(TaskFields::new("second")).unwrap().id;

        api.toggle_task(second);
        clock.advance(Duration::minutes(1));
        api.toggle_task(first);

        let order: Vec<_> = api.history().into_iter().map(|task| task.id).collect();
        assert_eq!(order, vec![first, second]);
        assert_eq!(api.counts().completed, 2);
    }

    #[test]
    fn replacement_task_after_delete_still_alarms() {
        let clock = ManualClock::new(start());
        let mut api = TaskApi::load(MemoryStore::new(), &clock);
        let first = api.add_task(TaskFields::new("a")).unwrap().id;
        let soon = api
            .add_task(TaskFields::new("b").due(start() + Duration::minutes(3)))
            .unwrap()
            .id;
        assert_eq!(api.check_alarm().map(|task| task.id), Some(soon));
        api.dismiss_alarm();
        api.delete_task(soon);

        let replacement = api
            .add_task(TaskFields::new("c").due(start() + Duration::minutes(4)))
            .unwrap()
            .id;

        assert_ne!(replacement, soon);
        assert_ne!(replacement, first);
        assert_eq!(api.check_alarm().map(|task| task.id), Some(replacement));
    }

    #[test]
    fn alarmed_ids_of_deleted_tasks_are_not_reused_after_reload() {
        let clock = ManualClock::new(start());
        let now_ms = crate::clock::unix_millis(start());
        let kv = MemoryStore::new().with_entry(ALARMED_IDS_KEY, format!("[{}]", now_ms + 2));
        let mut api = TaskApi::load(kv, &clock);

        let task = api
            .add_task(TaskFields::new("fresh").due(start() + Duration::minutes(2)))
            .unwrap();

        assert_eq!(task.id, now_ms + 3);
        assert_eq!(api.check_alarm().map(|raised| raised.id), Some(task.id));
    }
}
