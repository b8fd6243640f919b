//! Field constraints for task records

use super::model::Task;
use crate::{Result, ValidationErrors};

pub const TITLE_MAX_CHARS: usize = 100;
pub const ASSIGNEE_MAX_CHARS: usize = 100;

/// Check a complete record against every field constraint.
///
/// Runs on the record about to be stored, so the same rules cover creation
/// and the merged result of an update. All violations are collected.
/// Dates are not ordered against each other: an end date before the start
/// date is stored as given.
pub fn validate_task(task: &Task) -> Result<()> {
    let mut errors = ValidationErrors::new();

    require_text(&mut errors, "titulo", &task.title);
    max_chars(&mut errors, "titulo", &task.title, TITLE_MAX_CHARS);
    require_text(&mut errors, "descricao", &task.description);

    if let Some(assignee) = &task.assignee {
        max_chars(&mut errors, "responsavel", assignee, ASSIGNEE_MAX_CHARS);
    }

    errors.into_result()
}

fn require_text(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "This field may not be blank.");
    }
}

fn max_chars(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(
            field,
            format!("Ensure this field has no more than {} characters.", max),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NewTask;
    use crate::Error;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task_with(new: NewTask) -> Task {
        Task::from_new(new)
    }

    fn base() -> NewTask {
        NewTask::new("Title", "Description", date(2024, 1, 1), date(2024, 1, 2))
    }

    fn field_errors(task: &Task) -> ValidationErrors {
        match validate_task(task) {
            Err(Error::Validation(errors)) => errors,
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_valid_task() {
        assert!(validate_task(&task_with(base())).is_ok());
    }

    #[test]
    fn test_title_length_bound() {
        let mut new = base();
        new.title = "a".repeat(100);
        assert!(validate_task(&task_with(new.clone())).is_ok());

        new.title = "a".repeat(101);
        assert!(field_errors(&task_with(new)).has_field("titulo"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let mut new = base();
        new.title = "é".repeat(100);
        assert!(validate_task(&task_with(new)).is_ok());
    }

    #[test]
    fn test_blank_required_fields() {
        let mut new = base();
        new.title = "   ".to_string();
        new.description = String::new();

        let errors = field_errors(&task_with(new));
        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("titulo"));
        assert!(errors.has_field("descricao"));
    }

    #[test]
    fn test_assignee_bound_and_empty_allowed() {
        assert!(validate_task(&task_with(base().with_assignee(""))).is_ok());
        assert!(validate_task(&task_with(base().with_assignee("b".repeat(100)))).is_ok());

        let errors = field_errors(&task_with(base().with_assignee("b".repeat(101))));
        assert!(errors.has_field("responsavel"));
    }

    #[test]
    fn test_empty_notes_allowed() {
        assert!(validate_task(&task_with(base().with_notes(""))).is_ok());
    }

    #[test]
    fn test_dates_are_not_ordered() {
        let same_day = NewTask::new("T", "D", date(2024, 3, 1), date(2024, 3, 1));
        assert!(validate_task(&task_with(same_day)).is_ok());

        let reversed = NewTask::new("T", "D", date(2024, 3, 2), date(2024, 3, 1));
        assert!(validate_task(&task_with(reversed)).is_ok());
    }
}
