use crate::error::AppError;
use crate::model::Task;
use crate::notify::{ALARM_TITLE, Notifier, alarm_body};
use notify_rust::{Notification, Urgency};

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, task: &Task) -> Result<(), AppError> {
        Notification::new()
            .appname("duesoon")
            .summary(ALARM_TITLE)
            .body(&alarm_body(task))
            .urgency(Urgency::Critical)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
