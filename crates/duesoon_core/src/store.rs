use crate::clock::unix_millis;
use crate::model::{Task, TaskFields, TaskId};
use time::OffsetDateTime;

/// The in-memory task collection, newest first.
///
/// Every operation is a no-op when its input is blank or its id is unknown;
/// callers learn about that through the `None`/`false` return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
    /// Highest id ever handed out or seen; never decreases.
    last_id: Option<TaskId>,
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        let last_id = tasks.iter().map(|task| task.id).max();
        Self { tasks, last_id }
    }

    /// Marks every id up to `id` as used, so `add` never issues it.
    pub fn reserve_ids_through(&mut self, id: TaskId) {
        self.last_id = self.last_id.max(Some(id));
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn active(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| !task.completed)
    }

    pub fn completed(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| task.completed)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn add(&mut self, fields: TaskFields, now: OffsetDateTime) -> Option<&Task> {
        let text = fields.normalized_text()?;
        let id = self.next_id(now)?;
        let task = Task {
            id,
            text,
            completed: false,
            priority: fields.priority,
            category: Some(fields.normalized_category()),
            due_date: fields.due_date,
            completed_at: None,
        };

        self.last_id = Some(id);
        self.tasks.insert(0, task);
        self.tasks.first()
    }

    pub fn toggle(&mut self, id: TaskId, now: OffsetDateTime) -> Option<&Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.completed = !task.completed;
        task.completed_at = task.completed.then_some(now);
        Some(&*task)
    }

    pub fn update(&mut self, id: TaskId, fields: TaskFields) -> Option<&Task> {
        let text = fields.normalized_text()?;
        let category = fields.normalized_category();
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;

        task.text = text;
        task.category = Some(category);
        task.due_date = fields.due_date;
        task.priority = fields.priority;
        Some(&*task)
    }

    pub fn delete(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Drops every completed task and returns how many went.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        before - self.tasks.len()
    }

    /// Creation time in milliseconds, bumped past every id issued so far.
    /// `None` once the id space is exhausted.
    fn next_id(&self, now: OffsetDateTime) -> Option<TaskId> {
        let candidate = unix_millis(now);
        match self.last_id {
            Some(last) if last >= candidate => {
                let next = last.checked_add(1);
                if next.is_none() {
                    tracing::warn!(last_id = last, "no task ids left");
                }
                next
            }
            _ => Some(candidate),
        }
    }
}
