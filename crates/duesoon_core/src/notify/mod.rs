use crate::error::AppError;
use crate::model::Task;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

const DISABLE_ENV_VAR: &str = "DUESOON_DISABLE_NOTIFICATIONS";

pub const ALARM_TITLE: &str = "Task Due Soon!";

/// Delivers a raised due-soon alarm outside the terminal.
pub trait Notifier {
    fn notify(&self, task: &Task) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _task: &Task) -> Result<(), AppError> {
        Ok(())
    }
}

/// Body text shared by every platform notifier.
pub fn alarm_body(task: &Task) -> String {
    let mut body = format!("Due in under 5 minutes: {}", task.text);
    if let Some(category) = task.category.as_deref().filter(|value| !value.trim().is_empty()) {
        body.push_str(&format!("\nCategory: {category}"));
    }
    body
}

pub fn notifier_from_env() -> Box<dyn Notifier> {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Box::new(NoopNotifier);
    }

    match platform_notifier() {
        Ok(notifier) => notifier,
        Err(err) => {
            tracing::debug!(error = %err, "desktop notifications unavailable");
            Box::new(NoopNotifier)
        }
    }
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::alarm_body;
    use crate::model::{Priority, Task};

    fn task(category: Option<&str>) -> Task {
        Task {
            id: 1,
            text: "Submit report".to_string(),
            completed: false,
            priority: Priority::High,
            category: category.map(str::to_string),
            due_date: None,
            completed_at: None,
        }
    }

    #[test]
    fn alarm_body_mentions_category_when_present() {
        assert_eq!(
            alarm_body(&task(Some("Work"))),
            "Due in under 5 minutes: Submit report\nCategory: Work"
        );
    }

    #[test]
    fn alarm_body_skips_blank_category() {
        assert_eq!(
            alarm_body(&task(Some(" "))),
            "Due in under 5 minutes: Submit report"
        );
        assert_eq!(alarm_body(&task(None)), "Due in under 5 minutes: Submit report");
    }
}
