mod task;
pub mod timestamp;

pub use task::{DEFAULT_CATEGORY, Priority, Task, TaskFields, TaskId, category_label};
