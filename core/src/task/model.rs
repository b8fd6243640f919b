//! Task model definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Task status
///
/// Any status may move to any other; there is no guarded workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "ANDAMENTO")]
    InProgress,
    #[serde(rename = "FINALIZADA")]
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Pending, Self::InProgress, Self::Done];

    /// Stored code, also used when rendering a task
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDENTE",
            Self::InProgress => "ANDAMENTO",
            Self::Done => "FINALIZADA",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::InProgress => "Em andamento",
            Self::Done => "Finalizada",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::invalid("status", format!("\"{}\" is not a valid choice.", s)))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    #[serde(rename = "BAIXA")]
    Low,
    #[default]
    #[serde(rename = "MEDIA")]
    Medium,
    #[serde(rename = "ALTA")]
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "BAIXA",
            Self::Medium => "MEDIA",
            Self::High => "ALTA",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Baixa",
            Self::Medium => "Média",
            Self::High => "Alta",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| {
                Error::invalid("prioridade", format!("\"{}\" is not a valid choice.", s))
            })
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task record as owned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "data_inicio")]
    pub start_date: NaiveDate,
    #[serde(rename = "data_termino")]
    pub end_date: NaiveDate,
    pub status: TaskStatus,
    #[serde(rename = "prioridade")]
    pub priority: TaskPriority,
    #[serde(rename = "responsavel", default)]
    pub assignee: Option<String>,
    #[serde(rename = "observacoes", default)]
    pub notes: Option<String>,
    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "atualizado_em")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a record from creation input, with a fresh id and timestamps.
    ///
    /// The result is not validated; the store does that before persisting.
    pub(crate) fn from_new(new: NewTask) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            start_date: new.start_date,
            end_date: new.end_date,
            status: new.status.unwrap_or_default(),
            priority: new.priority.unwrap_or_default(),
            assignee: new.assignee,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`, always moving it forward
    pub(crate) fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::microseconds(1)
        };
    }

    /// Canonical one-line rendering: `"{titulo} - {status} - {prioridade}"`
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.title, self.status, self.priority)
    }
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Defaults to `TaskStatus::Pending`
    pub status: Option<TaskStatus>,
    /// Defaults to `TaskPriority::Medium`
    pub priority: Option<TaskPriority>,
    pub assignee: Option<String>,
    pub notes: Option<String>,
}

impl NewTask {
    /// Create input with the required fields
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            start_date,
            end_date,
            status: None,
            priority: None,
            assignee: None,
            notes: None,
        }
    }

    /// Set the status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the assignee
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Set the notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Field-level update; `None` leaves a field as it is.
///
/// `assignee` and `notes` are doubly optional: `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn assignee(mut self, assignee: Option<String>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = Some(notes);
        self
    }

    /// Write the supplied fields into `task`. Never touches id or timestamps.
    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(date) = self.start_date {
            task.start_date = date;
        }
        if let Some(date) = self.end_date {
            task.end_date = date;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(assignee) = self.assignee {
            task.assignee = assignee;
        }
        if let Some(notes) = self.notes {
            task.notes = notes;
        }
    }
}

/// Full replacement of every mutable field.
///
/// Omitted status/priority fall back to their defaults and omitted
/// assignee/notes are cleared.
impl From<NewTask> for TaskPatch {
    fn from(new: NewTask) -> Self {
        Self {
            title: Some(new.title),
            description: Some(new.description),
            start_date: Some(new.start_date),
            end_date: Some(new.end_date),
            status: Some(new.status.unwrap_or_default()),
            priority: Some(new.priority.unwrap_or_default()),
            assignee: Some(new.assignee),
            notes: Some(new.notes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> NewTask {
        NewTask::new("Write report", "Q3 summary", date(2024, 1, 1), date(2024, 1, 15))
    }

    #[test]
    fn test_defaults() {
        let task = Task::from_new(sample());
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.assignee.is_none());
        assert!(task.notes.is_none());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_render() {
        let task = Task::from_new(sample());
        assert_eq!(task.render(), "Write report - PENDENTE - MEDIA");

        let task = Task::from_new(
            sample()
                .with_status(TaskStatus::InProgress)
                .with_priority(TaskPriority::High),
        );
        assert_eq!(task.to_string(), "Write report - ANDAMENTO - ALTA");
    }

    #[test]
    fn test_status_codes_parse() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("pendente".parse::<TaskStatus>().is_err());
        assert!("DONE".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_priority_codes_parse() {
        for priority in TaskPriority::ALL {
            assert_eq!(priority.as_str().parse::<TaskPriority>().unwrap(), priority);
        }
        match "URGENTE".parse::<TaskPriority>() {
            Err(Error::Validation(errors)) => assert!(errors.has_field("prioridade")),
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(TaskStatus::InProgress.label(), "Em andamento");
        assert_eq!(TaskPriority::Medium.label(), "Média");
    }

    #[test]
    fn test_wire_format() {
        let task = Task::from_new(sample().with_assignee("Ana"));
        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(value["titulo"], "Write report");
        assert_eq!(value["data_inicio"], "2024-01-01");
        assert_eq!(value["status"], "PENDENTE");
        assert_eq!(value["prioridade"], "MEDIA");
        assert_eq!(value["responsavel"], "Ana");
        assert!(value["observacoes"].is_null());

        let back: Task = serde_json::from_value(value).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_unknown_status_is_unrepresentable() {
        let result = serde_json::from_str::<TaskStatus>("\"CANCELADA\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_touch_moves_forward() {
        let mut task = Task::from_new(sample());
        let before = task.updated_at;
        task.touch();
        assert!(task.updated_at > before);
        assert_eq!(task.created_at, before);
    }

    #[test]
    fn test_patch_apply_only_supplied_fields() {
        let mut task = Task::from_new(sample().with_assignee("Ana").with_notes("draft"));
        let id = task.id;

        TaskPatch::new()
            .status(TaskStatus::Done)
            .assignee(None)
            .apply(&mut task);

        assert_eq!(task.id, id);
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.title, "Write report");
        assert!(task.assignee.is_none());
        assert_eq!(task.notes.as_deref(), Some("draft"));
    }

    #[test]
    fn test_replacement_patch_resets_optionals() {
        let mut task = Task::from_new(
            sample()
                .with_status(TaskStatus::Done)
                .with_assignee("Ana"),
        );

        let replacement = NewTask::new("Other", "Desc", date(2024, 2, 1), date(2024, 2, 2));
        TaskPatch::from(replacement).apply(&mut task);

        assert_eq!(task.title, "Other");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.assignee.is_none());
    }
}
