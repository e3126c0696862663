//! Due-soon alarm: a periodic scan that raises at most one alarm at a time,
//! and at most once per task id for as long as the alarmed-id set survives.

use crate::model::{Task, TaskId};
use std::collections::BTreeSet;
use std::time::Duration as StdDuration;
use time::{Duration, OffsetDateTime};

/// How far ahead of a deadline a task starts to qualify.
pub const DUE_SOON_WINDOW: Duration = Duration::minutes(5);

/// Cadence the host timer is expected to drive [`AlarmMonitor::check`] at.
pub const CHECK_INTERVAL: StdDuration = StdDuration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AlarmState {
    #[default]
    Idle,
    /// Snapshot of the task taken when the alarm was raised.
    Alarming(Task),
}

#[derive(Debug, Clone, Default)]
pub struct AlarmMonitor {
    state: AlarmState,
    alarmed: BTreeSet<TaskId>,
}

impl AlarmMonitor {
    pub fn new(alarmed: BTreeSet<TaskId>) -> Self {
        Self {
            state: AlarmState::Idle,
            alarmed,
        }
    }

    pub fn state(&self) -> &AlarmState {
        &self.state
    }

    pub fn current(&self) -> Option<&Task> {
        match &self.state {
            AlarmState::Idle => None,
            AlarmState::Alarming(task) => Some(task),
        }
    }

    pub fn alarmed_ids(&self) -> &BTreeSet<TaskId> {
        &self.alarmed
    }

    pub fn has_alarmed(&self, id: TaskId) -> bool {
        self.alarmed.contains(&id)
    }

    /// Runs one check cycle and returns the task it newly alarmed, if any.
    ///
    /// Does nothing while an alarm is showing. Otherwise picks the qualifying
    /// task with the earliest due date (ties keep `tasks` order), records its
    /// id as alarmed and switches to [`AlarmState::Alarming`].
    pub fn check(&mut self, tasks: &[Task], now: OffsetDateTime) -> Option<&Task> {
        if matches!(self.state, AlarmState::Alarming(_)) {
            return None;
        }

        let upcoming = tasks
            .iter()
            .filter(|task| self.qualifies(task, now))
            .min_by_key(|task| task.due_date)?
            .clone();

        tracing::info!(task_id = upcoming.id, text = %upcoming.text, "task due soon");
        self.alarmed.insert(upcoming.id);
        self.state = AlarmState::Alarming(upcoming);
        self.current()
    }

    /// Returns to idle. The task stays in the alarmed set.
    pub fn dismiss(&mut self) -> Option<Task> {
        match std::mem::take(&mut self.state) {
            AlarmState::Idle => None,
            AlarmState::Alarming(task) => {
                tracing::info!(task_id = task.id, "alarm dismissed");
                Some(task)
            }
        }
    }

    fn qualifies(&self, task: &Task, now: OffsetDateTime) -> bool {
        if task.completed || self.alarmed.contains(&task.id) {
            return false;
        }

        match task.due_date {
            Some(due) => {
                let until_due = due - now;
                until_due > Duration::ZERO && until_due <= DUE_SOON_WINDOW
            }
            None => false,
        }
    }
}
