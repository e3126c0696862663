use crate::error::AppError;
use crate::model::Task;
use crate::notify::{ALARM_TITLE, Notifier};
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, task: &Task) -> Result<(), AppError> {
        let mut toast = Toast::new(Toast::POWERSHELL_APP_ID)
            .title(ALARM_TITLE)
            .text1(&task.text);

        if let Some(category) = task.category.as_deref().filter(|value| !value.trim().is_empty()) {
            toast = toast.text2(&format!("Category: {category}"));
        }

        toast.show().map_err(|err| AppError::io(err.to_string()))
    }
}
