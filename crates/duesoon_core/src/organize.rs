use crate::model::Task;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Secondary ordering applied inside each priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Newest first.
    #[default]
    Creation,
    /// Soonest first; undated tasks last.
    DueDate,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creation => "creation",
            Self::DueDate => "due-date",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "creation" | "created" | "newest" => Ok(Self::Creation),
            "due-date" | "due" | "duedate" => Ok(Self::DueDate),
            other => Err(format!(
                "unknown sort mode '{other}' (expected creation or due-date)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskGroup {
    pub category: String,
    pub tasks: Vec<Task>,
}

/// Sorts active tasks by priority then `mode`, and groups them by category.
///
/// Groups appear in the order their first task appears in the sorted list.
pub fn organize<'a, I>(active: I, mode: SortMode) -> Vec<TaskGroup>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut sorted: Vec<&Task> = active.into_iter().collect();
    sorted.sort_by(|a, b| compare_active(a, b, mode));

    let mut groups: Vec<TaskGroup> = Vec::new();
    for task in sorted {
        let category = task.category_label();
        match groups.iter_mut().find(|group| group.category == category) {
            Some(group) => group.tasks.push(task.clone()),
            None => groups.push(TaskGroup {
                category: category.to_string(),
                tasks: vec![task.clone()],
            }),
        }
    }
    groups
}

fn compare_active(a: &Task, b: &Task, mode: SortMode) -> Ordering {
    a.priority.cmp(&b.priority).then_with(|| match mode {
        SortMode::Creation => b.id.cmp(&a.id),
        SortMode::DueDate => match (a.due_date, b.due_date) {
            (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    })
}

/// Completed tasks, most recently completed first.
///
/// Tasks with no completion stamp keep the exact position they had; the
/// stamped ones are sorted into the remaining slots.
pub fn history<'a, I>(completed: I) -> Vec<Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut ordered: Vec<Task> = completed.into_iter().cloned().collect();

    let slots: Vec<usize> = ordered
        .iter()
        .enumerate()
        .filter(|(_, task)| task.completed_at.is_some())
        .map(|(index, _)| index)
        .collect();
    let mut stamped: Vec<Task> = slots.iter().map(|&index| ordered[index].clone()).collect();
    stamped.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

    for (slot, task) in slots.into_iter().zip(stamped) {
        ordered[slot] = task;
    }
    ordered
}
