use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

pub type TaskId = i64;

/// Category used whenever a task has none, or only whitespace.
pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::timestamp::lenient_option"
    )]
    pub due_date: Option<OffsetDateTime>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::timestamp::lenient_option"
    )]
    pub completed_at: Option<OffsetDateTime>,
}

impl Task {
    /// Category for grouping and colour-coding; blank reads as "General".
    pub fn category_label(&self) -> &str {
        category_label(self.category.as_deref())
    }

    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

pub fn category_label(category: Option<&str>) -> &str {
    match category.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => DEFAULT_CATEGORY,
    }
}

/// The four user-editable fields shared by add and update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskFields {
    pub text: String,
    pub category: Option<String>,
    pub due_date: Option<OffsetDateTime>,
    pub priority: Priority,
}

impl TaskFields {
    pub fn new<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn category<C: Into<String>>(mut self, category: C) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn due(mut self, due_date: OffsetDateTime) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Trimmed text, or `None` when there is nothing left to store.
    pub(crate) fn normalized_text(&self) -> Option<String> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub(crate) fn normalized_category(&self) -> String {
        category_label(self.category.as_deref()).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn level(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(Self::High),
            2 => Some(Self::Medium),
            3 => Some(Self::Low),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "h" | "high" => Ok(Self::High),
            "2" | "m" | "medium" => Ok(Self::Medium),
            "3" | "l" | "low" => Ok(Self::Low),
            other => Err(format!(
                "unknown priority '{other}' (expected high, medium, low or 1-3)"
            )),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

impl<'de> Deserialize<'de> for Priority {
    /// Anything other than 1, 2 or 3 (including null, 0 and strings) loads as Medium.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value
            .as_i64()
            .and_then(Priority::from_level)
            .unwrap_or_default())
    }
}
