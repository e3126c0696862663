use duesoon_core::config::{Palette, category_color};
use duesoon_core::model::Task;
use duesoon_core::model::timestamp::local_offset;
use duesoon_core::organize::{SortMode, TaskGroup};
use duesoon_core::task_api::TaskCounts;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::OffsetDateTime;
use time::macros::format_description;

#[derive(Tabled)]
struct ActiveRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Due")]
    due: String,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Completed")]
    completed: String,
}

pub fn format_local(value: OffsetDateTime) -> String {
    value
        .to_offset(local_offset())
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| value.to_string())
}

fn due_cell(task: &Task, now: OffsetDateTime) -> String {
    match task.due_date {
        Some(due) if due < now => format!("{} (overdue)", format_local(due)),
        Some(due) => format_local(due),
        None => "-".to_string(),
    }
}

pub fn render_header(title: &str, counts: TaskCounts, palette: &Palette) -> String {
    format!(
        "{}\n{}",
        palette.accentize(title),
        palette.mutedize(&format!(
            "Tasks ({}) | History ({})",
            counts.active, counts.completed
        ))
    )
}

pub fn render_groups(
    groups: &[TaskGroup],
    mode: SortMode,
    now: OffsetDateTime,
    palette: &Palette,
) -> String {
    if groups.is_empty() {
        return "All tasks completed! Ready to add something new?".to_string();
    }

    let mut sections = vec![palette.mutedize(&format!("Sort by: {mode}"))];
    for group in groups {
        let rows = group.tasks.iter().map(|task| ActiveRow {
            id: task.id,
            text: task.text.clone(),
            priority: palette.priority(task.priority),
            due: due_cell(task, now),
        });
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        sections.push(format!(
            "{}\n{}",
            palette.category_heading(&group.category),
            table
        ));
    }
    sections.join("\n\n")
}

pub fn render_history(tasks: &[Task], palette: &Palette) -> String {
    if tasks.is_empty() {
        return "History is empty. Completed tasks will appear here.".to_string();
    }

    let rows = tasks.iter().map(|task| HistoryRow {
        id: task.id,
        text: task.text.clone(),
        category: palette.category(task.category_label()),
        priority: palette.priority(task.priority),
        completed: task
            .completed_at
            .map(format_local)
            .unwrap_or_else(|| "-".to_string()),
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn render_alarm(task: &Task, palette: &Palette) -> String {
    let mut lines = vec![
        palette.accentize("Task Due Soon!"),
        "The following task is due in under 5 minutes:".to_string(),
        format!("  {} ({})", task.text, task.id),
    ];
    if let Some(category) = task.category.as_deref().filter(|value| !value.trim().is_empty()) {
        lines.push(format!("  Category: {}", palette.category(category)));
    }
    if let Some(due) = task.due_date {
        lines.push(format!("  Due: {}", format_local(due)));
    }
    lines.join("\n")
}

pub fn task_json(task: &Task) -> serde_json::Value {
    let mut value = serde_json::json!(task);
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "categoryColor".to_string(),
            category_color(task.category_label()).name().into(),
        );
    }
    value
}

pub fn groups_json(groups: &[TaskGroup], mode: SortMode, counts: TaskCounts) -> serde_json::Value {
    let groups: Vec<serde_json::Value> = groups
        .iter()
        .map(|group| {
            serde_json::json!({
                "category": group.category,
                "tasks": group.tasks.iter().map(task_json).collect::<Vec<_>>(),
            })
        })
        .collect();

    serde_json::json!({
        "sort": mode,
        "counts": counts,
        "groups": groups,
    })
}

#[cfg(test)]
mod tests {
    use super::{render_alarm, render_groups, render_header, render_history, task_json};
    use duesoon_core::config::palette_for_theme;
    use duesoon_core::model::{Priority, Task};
    use duesoon_core::organize::{SortMode, TaskGroup};
    use duesoon_core::task_api::TaskCounts;
    use time::Duration;
    use time::macros::datetime;

    fn task(id: i64, text: &str) -> Task {
        Task {
            id,
            text: text.to_string(),
            completed: false,
            priority: Priority::High,
            category: Some("Work".to_string()),
            due_date: None,
            completed_at: None,
        }
    }

    #[test]
    fn header_shows_counts() {
        let palette = palette_for_theme(None);
        let rendered = render_header(
            "Ada's Todos",
            TaskCounts {
                active: 2,
                completed: 1,
            },
            &palette,
        );

        assert_eq!(rendered, "Ada's Todos\nTasks (2) | History (1)");
    }

    #[test]
    fn groups_render_category_headers_and_rows() {
        let now = datetime!(2025-12-20 09:00:00 UTC);
        let mut overdue = task(2, "late");
        overdue.due_date = Some(now - Duration::hours(1));
        let groups = vec![TaskGroup {
            category: "Work".to_string(),
            tasks: vec![task(1, "write report"), overdue],
        }];

        let rendered = render_groups(&groups, SortMode::Creation, now, &palette_for_theme(None));

        assert!(rendered.starts_with("Sort by: creation"));
        assert!(rendered.contains("WORK"));
        assert!(rendered.contains("write report"));
        assert!(rendered.contains("(overdue)"));
        assert!(rendered.contains("High"));
    }

    #[test]
    fn empty_views_have_friendly_text() {
        let now = datetime!(2025-12-20 09:00:00 UTC);
        assert!(render_groups(&[], SortMode::DueDate, now, &palette_for_theme(None))
            .starts_with("All tasks completed!"));
        assert!(render_history(&[], &palette_for_theme(None)).starts_with("History is empty."));
    }

    #[test]
    fn alarm_lists_text_and_category() {
        let rendered = render_alarm(&task(7, "Submit report"), &palette_for_theme(None));

        assert!(rendered.starts_with("Task Due Soon!"));
        assert!(rendered.contains("  Submit report (7)"));
        assert!(rendered.contains("  Category: Work"));
    }

    #[test]
    fn task_json_adds_category_color() {
        let value = task_json(&task(1, "demo"));

        assert_eq!(value["id"], 1);
        assert_eq!(value["priority"], 1);
        assert_eq!(value["categoryColor"], "orange");
    }

    #[test]
    fn themed_tables_colour_priorities() {
        let now = datetime!(2025-12-20 09:00:00 UTC);
        let mut low = task(2, "later");
        low.priority = Priority::Low;
        let groups = vec![TaskGroup {
            category: "Work".to_string(),
            tasks: vec![task(1, "urgent"), low.clone()],
        }];
        let palette = palette_for_theme(Some("noir"));

        let rendered = render_groups(&groups, SortMode::Creation, now, &palette);
        assert!(rendered.contains("\x1b[38;5;203mHigh\x1b[0m"));
        assert!(rendered.contains("\x1b[38;5;117mLow\x1b[0m"));

        low.completed = true;
        let history = render_history(&[low], &palette);
        assert!(history.contains("\x1b[38;5;117mLow\x1b[0m"));
    }

    #[test]
    fn plain_tables_have_no_escapes() {
        let now = datetime!(2025-12-20 09:00:00 UTC);
        let groups = vec![TaskGroup {
            category: "Work".to_string(),
            tasks: vec![task(1, "urgent")],
        }];

        let rendered = render_groups(&groups, SortMode::Creation, now, &palette_for_theme(None));

        assert!(!rendered.contains('\x1b'));
    }
}
