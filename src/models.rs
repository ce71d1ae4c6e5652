use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::utils::parse_date;

/// Maximum title length in characters
pub const MAX_TITLE_LEN: usize = 100;
/// Maximum description length in characters
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Opaque task identifier, stored as a hyphenated UUID string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight characters, enough to address a task from the command line
    pub fn short(&self) -> String {
        self.0.to_string().chars().take(8).collect()
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort weight: high(3) > medium(2) > low(1)
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Cycle low -> medium -> high -> low (used by the form selector)
    pub fn raised(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn lowered(self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low => Priority::High,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            other => Err(format!("Unknown priority '{}' (expected high, medium or low)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Open,
    Completed,
}

impl Status {
    pub fn toggled(self) -> Self {
        match self {
            Status::Open => Status::Completed,
            Status::Completed => Status::Open,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate, // ISO 8601: YYYY-MM-DD
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a fresh open task from validated fields; both timestamps are `now`
    pub fn new(fields: TaskFields, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            priority: fields.priority,
            status: Status::Open,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge edited fields into the task. Id, status and creation time are kept.
    pub fn apply(&mut self, fields: TaskFields, now: DateTime<Utc>) {
        self.title = fields.title;
        self.description = fields.description;
        self.due_date = fields.due_date;
        self.priority = fields.priority;
        self.touch(now);
    }

    /// Refresh `updated_at`, never moving it backwards
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.updated_at);
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == Status::Open && self.due_date < today
    }

    /// Human readable due date relative to `today`
    pub fn due_label(&self, today: NaiveDate) -> String {
        let days = (self.due_date - today).num_days();
        let plural = |n: i64| if n.abs() > 1 { "s" } else { "" };
        match days {
            0 => "Due today".to_string(),
            1 => "Due tomorrow".to_string(),
            -1 => "Due yesterday".to_string(),
            d if d < 0 => format!("Overdue by {} day{}", -d, plural(d)),
            d if d <= 7 => format!("Due in {} day{}", d, plural(d)),
            _ => self.due_date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a task title")]
    EmptyTitle,
    #[error("Title must be at most {max} characters (got {len})")]
    TitleTooLong { max: usize, len: usize },
    #[error("Description must be at most {max} characters (got {len})")]
    DescriptionTooLong { max: usize, len: usize },
    #[error("Please select a due date")]
    MissingDueDate,
    #[error("Invalid due date '{0}' (expected YYYY-MM-DD)")]
    InvalidDueDate(String),
}

/// User-editable part of a task, as entered in a form or on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
}

/// A draft that passed validation: trimmed, within limits, with a due date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
}

impl TaskDraft {
    /// Empty draft for a new task, due the day after `today`
    pub fn new(priority: Priority, today: NaiveDate) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: today.succ_opt(),
            priority,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: Some(task.due_date),
            priority: task.priority,
        }
    }

    pub fn validate(&self) -> Result<TaskFields, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let len = title.chars().count();
        if len > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong { max: MAX_TITLE_LEN, len });
        }

        let description = self.description.trim();
        let len = description.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong { max: MAX_DESCRIPTION_LEN, len });
        }

        let due_date = self.due_date.ok_or(ValidationError::MissingDueDate)?;

        Ok(TaskFields {
            title: title.to_string(),
            description: description.to_string(),
            due_date,
            priority: self.priority,
        })
    }
}

/// Parse a due date field. Blank input means "not set".
pub fn parse_due_date(input: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    parse_date(input)
        .map(Some)
        .map_err(|_| ValidationError::InvalidDueDate(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: String::new(),
            due_date: Some(date("2024-01-05")),
            priority: Priority::High,
        }
    }

    #[test]
    fn validate_trims_title_and_description() {
        let mut d = draft("  Buy milk  ");
        d.description = "  two litres ".to_string();
        let fields = d.validate().unwrap();
        assert_eq!(fields.title, "Buy milk");
        assert_eq!(fields.description, "two litres");
        assert_eq!(fields.due_date, date("2024-01-05"));
    }

    #[rstest]
    #[case("", ValidationError::EmptyTitle)]
    #[case("   \t", ValidationError::EmptyTitle)]
    fn validate_rejects_blank_titles(#[case] title: &str, #[case] expected: ValidationError) {
        assert_eq!(draft(title).validate(), Err(expected));
    }

    #[test]
    fn validate_enforces_length_limits() {
        assert!(draft(&"a".repeat(MAX_TITLE_LEN)).validate().is_ok());
        assert_eq!(
            draft(&"a".repeat(MAX_TITLE_LEN + 1)).validate(),
            Err(ValidationError::TitleTooLong { max: MAX_TITLE_LEN, len: MAX_TITLE_LEN + 1 })
        );

        let mut d = draft("ok");
        d.description = "é".repeat(MAX_DESCRIPTION_LEN);
        assert!(d.validate().is_ok());
        d.description.push('x');
        assert!(matches!(d.validate(), Err(ValidationError::DescriptionTooLong { .. })));
    }

    #[test]
    fn validate_requires_due_date() {
        let mut d = draft("Title");
        d.due_date = None;
        assert_eq!(d.validate(), Err(ValidationError::MissingDueDate));
    }

    #[test]
    fn new_draft_defaults_to_tomorrow() {
        let d = TaskDraft::new(Priority::Medium, date("2024-02-28"));
        assert_eq!(d.due_date, Some(date("2024-02-29")));
        assert_eq!(d.priority, Priority::Medium);
    }

    #[rstest]
    #[case("", Ok(None))]
    #[case(" 2024-03-01 ", Ok(Some(date("2024-03-01"))))]
    #[case("03/01/2024", Err(ValidationError::InvalidDueDate("03/01/2024".to_string())))]
    fn parses_due_date_input(
        #[case] input: &str,
        #[case] expected: Result<Option<NaiveDate>, ValidationError>,
    ) {
        assert_eq!(parse_due_date(input), expected);
    }

    #[rstest]
    #[case("2024-01-10", "Due today")]
    #[case("2024-01-11", "Due tomorrow")]
    #[case("2024-01-09", "Due yesterday")]
    #[case("2024-01-07", "Overdue by 3 days")]
    #[case("2024-01-13", "Due in 3 days")]
    #[case("2024-01-17", "Due in 7 days")]
    #[case("2024-01-18", "2024-01-18")]
    fn due_label_is_relative_to_today(#[case] due: &str, #[case] expected: &str) {
        let now = Utc::now();
        let mut fields = draft("x").validate().unwrap();
        fields.due_date = date(due);
        let task = Task::new(fields, now);
        assert_eq!(task.due_label(date("2024-01-10")), expected);
    }

    #[test]
    fn overdue_only_applies_to_open_tasks() {
        let mut task = Task::new(draft("x").validate().unwrap(), Utc::now());
        let today = date("2024-01-06");
        assert!(task.is_overdue(today));
        task.status = Status::Completed;
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn touch_never_moves_backwards() {
        let now = Utc::now();
        let mut task = Task::new(draft("x").validate().unwrap(), now);
        task.touch(now - chrono::Duration::seconds(10));
        assert_eq!(task.updated_at, now);
        assert!(task.created_at <= task.updated_at);
    }

    #[test]
    fn priority_and_status_parse_and_cycle() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!("m".parse::<Priority>(), Ok(Priority::Medium));
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::Low.raised().raised(), Priority::High);
        assert_eq!(Priority::Low.lowered(), Priority::High);
        assert_eq!(Status::Open.toggled().toggled(), Status::Open);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let task = Task::new(draft("Buy milk").validate().unwrap(), Utc::now());
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["dueDate"], "2024-01-05");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["status"], "open");
        assert!(value["createdAt"].is_string());
        assert_eq!(value["id"], task.id.to_string());
    }
}
