// Business-rule validation for stages, task definitions and status sets
//
// Every function collects all violated rules instead of stopping at the
// first one, and none of them touch the store.

use std::collections::HashSet;
use crate::models::{Stage, StatusCategory, StatusDefinition, TaskDefinition};

/// Validate a stage candidate against every other stage.
///
/// `others` may contain the candidate itself; entries with the same id are
/// ignored for the duplicate-name check. Inactive stages still reserve
/// their name.
pub fn validate_stage(candidate: &Stage, others: &[Stage]) -> Vec<String> {
    let mut errors = Vec::new();

    let name = candidate.name.trim();
    if name.is_empty() {
        errors.push("Stage name is required".to_string());
    }
    if candidate.display_name.trim().is_empty() {
        errors.push("Display name is required".to_string());
    }
    if !name.is_empty()
        && others.iter().any(|s| s.id != candidate.id && s.name == name)
    {
        errors.push(format!("Duplicate stage name '{}'", name));
    }
    if candidate.sort_order < 0 {
        errors.push("Sort order must be 0 or greater".to_string());
    }
    if candidate.estimated_duration_minutes < 1 {
        errors.push("Estimated duration must be at least 1 minute".to_string());
    }

    errors
}

/// Validate a task definition against the other tasks of its stage.
///
/// `siblings` is filtered to the candidate's stage here, so callers may
/// pass the full task list.
pub fn validate_task(candidate: &TaskDefinition, siblings: &[TaskDefinition]) -> Vec<String> {
    let mut errors = Vec::new();

    let name = candidate.name.trim();
    if name.is_empty() {
        errors.push("Task name is required".to_string());
    }
    if candidate.display_name.trim().is_empty() {
        errors.push("Display name is required".to_string());
    }
    if !name.is_empty()
        && siblings
            .iter()
            .any(|t| t.stage_id == candidate.stage_id && t.id != candidate.id && t.name == name)
    {
        errors.push(format!("Duplicate task name '{}' in this stage", name));
    }
    if candidate.sort_order < 0 {
        errors.push("Sort order must be 0 or greater".to_string());
    }
    if let Some(offset) = candidate.due_offset_days {
        if offset < 0 {
            errors.push("Due offset days must be 0 or greater".to_string());
        }
    }

    errors
}

/// Per-entry and uniqueness rules of a status set.
///
/// Used on its own for stages that do not require a session; those stages
/// may save any (including an empty) set of statuses.
pub fn validate_status_entries(statuses: &[StatusDefinition]) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, status) in statuses.iter().enumerate() {
        let position = index + 1;
        if status.status_value.trim().is_empty() {
            errors.push(format!("Status #{}: status value is required", position));
        }
        if status.display_name.trim().is_empty() {
            errors.push(format!("Status #{}: display name is required", position));
        }
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for status in statuses {
        let value = status.status_value.trim().to_lowercase();
        if value.is_empty() {
            continue;
        }
        if !seen.insert(value.clone()) && reported.insert(value) {
            errors.push(format!("Duplicate status value '{}'", status.status_value.trim()));
        }
    }

    errors
}

/// Full status-set rules: at least one entry, per-entry rules, unique
/// values, and both a passing and a rejecting outcome.
pub fn validate_statuses(statuses: &[StatusDefinition]) -> Vec<String> {
    if statuses.is_empty() {
        return vec!["At least one status is required".to_string()];
    }

    let mut errors = validate_status_entries(statuses);

    let has_passed = statuses.iter().any(|s| s.category == StatusCategory::Passed);
    let has_rejection = statuses
        .iter()
        .any(|s| matches!(s.category, StatusCategory::Failed | StatusCategory::Declined));

    if !has_passed {
        errors.push(format!(
            "At least one status in the '{}' ({}) category is required",
            StatusCategory::Passed.as_str(),
            StatusCategory::Passed.label()
        ));
    }
    if !has_rejection {
        errors.push(format!(
            "At least one status in the '{}' or '{}' ({}/{}) category is required",
            StatusCategory::Failed.as_str(),
            StatusCategory::Declined.as_str(),
            StatusCategory::Failed.label(),
            StatusCategory::Declined.label()
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateStageInput, CreateTaskInput};

    fn stage(id: i64, name: &str) -> Stage {
        let mut s = CreateStageInput::new(name, name).into_stage(1, 0);
        s.id = id;
        s
    }

    fn status(value: &str, category: StatusCategory) -> StatusDefinition {
        StatusDefinition::new(1, value, value, category)
    }

    #[test]
    fn test_stage_requires_name_and_display_name() {
        let mut candidate = stage(0, "");
        candidate.display_name = "  ".to_string();
        let errors = validate_stage(&candidate, &[]);
        assert_eq!(errors, vec!["Stage name is required", "Display name is required"]);
    }

    #[test]
    fn test_stage_duplicate_name_ignores_self() {
        let existing = vec![stage(1, "entry"), stage(2, "interview")];
        assert!(validate_stage(&stage(1, "entry"), &existing).is_empty());
        let errors = validate_stage(&stage(0, "entry"), &existing);
        assert_eq!(errors, vec!["Duplicate stage name 'entry'"]);
    }

    #[test]
    fn test_stage_duplicate_name_includes_inactive() {
        let mut inactive = stage(1, "entry");
        inactive.is_active = false;
        assert_eq!(validate_stage(&stage(0, "entry"), &[inactive]).len(), 1);
    }

    #[test]
    fn test_stage_numeric_bounds() {
        let mut candidate = stage(0, "entry");
        candidate.sort_order = -1;
        candidate.estimated_duration_minutes = 0;
        let errors = validate_stage(&candidate, &[]);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Sort order"));
        assert!(errors[1].contains("at least 1 minute"));
    }

    #[test]
    fn test_task_name_unique_within_stage_only() {
        let mut other_stage = CreateTaskInput::new(2, "send_invite", "Send").into_task(1, 0);
        other_stage.id = 5;
        let mut same_stage = CreateTaskInput::new(1, "collect_cv", "CV").into_task(1, 0);
        same_stage.id = 6;
        let siblings = vec![other_stage, same_stage];

        let candidate = CreateTaskInput::new(1, "send_invite", "Send").into_task(1, 0);
        assert!(validate_task(&candidate, &siblings).is_empty());

        let duplicate = CreateTaskInput::new(1, "collect_cv", "CV again").into_task(1, 0);
        assert_eq!(
            validate_task(&duplicate, &siblings),
            vec!["Duplicate task name 'collect_cv' in this stage"]
        );
    }

    #[test]
    fn test_task_collects_all_errors() {
        let mut candidate = CreateTaskInput::new(1, "", "").into_task(1, 0);
        candidate.sort_order = -2;
        candidate.due_offset_days = Some(-1);
        assert_eq!(validate_task(&candidate, &[]).len(), 4);
    }

    #[test]
    fn test_statuses_missing_rejection_category() {
        let errors = validate_statuses(&[status("pass", StatusCategory::Passed)]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("不通過/辞退"));

        let errors = validate_statuses(&[
            status("pass", StatusCategory::Passed),
            status("fail", StatusCategory::Failed),
        ]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_declined_counts_as_rejection() {
        let errors = validate_statuses(&[
            status("pass", StatusCategory::Passed),
            status("decline", StatusCategory::Declined),
        ]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_statuses_empty_set() {
        assert_eq!(validate_statuses(&[]), vec!["At least one status is required"]);
        assert!(validate_status_entries(&[]).is_empty());
    }

    #[test]
    fn test_status_values_unique_case_insensitive() {
        let errors = validate_statuses(&[
            status("Pass", StatusCategory::Passed),
            status("pass", StatusCategory::Passed),
            status("PASS", StatusCategory::Passed),
            status("fail", StatusCategory::Failed),
        ]);
        assert_eq!(errors, vec!["Duplicate status value 'pass'"]);
    }

    #[test]
    fn test_status_entries_report_position() {
        let mut blank = status("", StatusCategory::Failed);
        blank.display_name = String::new();
        let errors = validate_statuses(&[status("pass", StatusCategory::Passed), blank]);
        assert_eq!(
            errors,
            vec!["Status #2: status value is required", "Status #2: display name is required"]
        );
    }

    #[test]
    fn test_statuses_missing_both_categories() {
        let errors = validate_statuses(&[status("hold", StatusCategory::Pending)]);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("通過"));
    }
}
