use std::collections::HashSet;
use rusqlite::Connection;
use crate::error::{ConfigError, Result, ValidationErrors};
use crate::models::{StatusDefinition, UpdateStatusInput};
use crate::repo::{StageRepo, StatusRepo};
use crate::templates::{build_statuses, status_template, STATUS_TEMPLATE_NAMES};
use crate::validation::{validate_status_entries, validate_statuses};

/// Editable buffer of one stage's statuses
///
/// `original` is the last saved set and never changes between commits;
/// edits go to `current`. Unsaved changes are a plain structural
/// comparison of the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopy {
    stage_id: i64,
    original: Vec<StatusDefinition>,
    current: Vec<StatusDefinition>,
}

fn out_of_range(index: usize) -> ConfigError {
    ConfigError::not_found("Working copy entry", index)
}

impl WorkingCopy {
    pub fn new(stage_id: i64, saved: Vec<StatusDefinition>) -> Self {
        Self {
            stage_id,
            current: saved.clone(),
            original: saved,
        }
    }

    pub fn stage_id(&self) -> i64 {
        self.stage_id
    }

    pub fn statuses(&self) -> &[StatusDefinition] {
        &self.current
    }

    pub fn original(&self) -> &[StatusDefinition] {
        &self.original
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.original != self.current
    }

    /// Append an entry; it is attached to this stage and placed last.
    /// An id that is not one of this stage's saved rows is dropped.
    pub fn add(&mut self, mut status: StatusDefinition) {
        if status.id.is_some_and(|id| !self.original.iter().any(|s| s.id == Some(id))) {
            status.id = None;
        }
        status.stage_id = self.stage_id;
        status.sort_order = self.current.iter().map(|s| s.sort_order).max().unwrap_or(0) + 1;
        self.current.push(status);
    }

    pub fn update(&mut self, index: usize, input: UpdateStatusInput) -> Result<()> {
        let status = self.current.get_mut(index).ok_or_else(|| out_of_range(index))?;
        input.apply_to(status);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<StatusDefinition> {
        if index >= self.current.len() {
            return Err(out_of_range(index));
        }
        Ok(self.current.remove(index))
    }

    /// Move the entry at `from` to `to` and renumber sort orders from 1
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.current.len();
        if from >= len {
            return Err(out_of_range(from));
        }
        if to >= len {
            return Err(out_of_range(to));
        }
        let moved = self.current.remove(from);
        self.current.insert(to, moved);
        for (i, status) in self.current.iter_mut().enumerate() {
            status.sort_order = i as i64 + 1;
        }
        Ok(())
    }

    /// Replace the edits with a named template
    pub fn apply_template(&mut self, name: &str) -> Result<()> {
        let presets = status_template(name).ok_or_else(|| {
            ConfigError::Validation(ValidationErrors::single(format!(
                "Unknown status template '{}' (available: {})",
                name,
                STATUS_TEMPLATE_NAMES.join(", ")
            )))
        })?;
        self.current = build_statuses(self.stage_id, presets);
        Ok(())
    }

    /// Discard edits
    pub fn reset(&mut self) {
        self.current = self.original.clone();
    }

    pub fn position_of(&self, status_value: &str) -> Option<usize> {
        self.current
            .iter()
            .position(|s| s.status_value.eq_ignore_ascii_case(status_value))
    }
}

/// Status definitions per stage with an editable working copy
pub struct StatusRegistry<'c> {
    conn: &'c Connection,
    working: Option<WorkingCopy>,
}

impl<'c> StatusRegistry<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn, working: None }
    }

    /// Persisted statuses, for one stage or all
    pub fn list_statuses(&self, stage_id: Option<i64>) -> Result<Vec<StatusDefinition>> {
        Ok(StatusRepo::list(self.conn, stage_id)?)
    }

    /// Fetch a stage's saved statuses into a fresh working copy
    pub fn load_working_copy(&mut self, stage_id: i64) -> Result<&[StatusDefinition]> {
        if StageRepo::get_by_id(self.conn, stage_id)?.is_none() {
            return Err(ConfigError::not_found("Stage", stage_id));
        }
        let saved = StatusRepo::list(self.conn, Some(stage_id))?;
        let working = self.working.insert(WorkingCopy::new(stage_id, saved));
        Ok(working.statuses())
    }

    pub fn working_copy(&self) -> Option<&WorkingCopy> {
        self.working.as_ref()
    }

    fn working_mut(&mut self) -> Result<&mut WorkingCopy> {
        self.working.as_mut().ok_or_else(|| {
            ConfigError::Validation(ValidationErrors::single("No working copy loaded"))
        })
    }

    pub fn add_to_working_copy(&mut self, status: StatusDefinition) -> Result<()> {
        self.working_mut()?.add(status);
        Ok(())
    }

    pub fn update_in_working_copy(&mut self, index: usize, input: UpdateStatusInput) -> Result<()> {
        self.working_mut()?.update(index, input)
    }

    pub fn remove_from_working_copy(&mut self, index: usize) -> Result<StatusDefinition> {
        self.working_mut()?.remove(index)
    }

    pub fn reorder_working_copy(&mut self, from: usize, to: usize) -> Result<()> {
        self.working_mut()?.reorder(from, to)
    }

    pub fn apply_template(&mut self, name: &str) -> Result<()> {
        self.working_mut()?.apply_template(name)
    }

    pub fn reset_working_copy(&mut self) -> Result<()> {
        self.working_mut()?.reset();
        Ok(())
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.working.as_ref().map_or(false, |w| w.has_unsaved_changes())
    }

    /// Validate and persist `statuses` as the complete set for a stage.
    ///
    /// Stages that do not require a session only get the per-entry and
    /// uniqueness checks. On failure nothing is written and any loaded
    /// working copy is left as it was.
    pub fn commit_working_copy(
        &mut self,
        stage_id: i64,
        mut statuses: Vec<StatusDefinition>,
    ) -> Result<Vec<StatusDefinition>> {
        let stage = StageRepo::get_by_id(self.conn, stage_id)?
            .ok_or_else(|| ConfigError::not_found("Stage", stage_id))?;

        // Only this stage's saved rows keep their id, and each id only once
        let mut owned: HashSet<i64> = StatusRepo::list(self.conn, Some(stage_id))?
            .iter()
            .filter_map(|s| s.id)
            .collect();
        for status in &mut statuses {
            status.stage_id = stage_id;
            if status.id.is_some_and(|id| !owned.remove(&id)) {
                status.id = None;
            }
        }

        let errors = if stage.requires_session {
            validate_statuses(&statuses)
        } else {
            validate_status_entries(&statuses)
        };
        if !errors.is_empty() {
            log::warn!("Rejected statuses for stage '{}': {}", stage.name, errors.join(", "));
        }
        ConfigError::check(errors)?;

        let now = chrono::Utc::now().timestamp();
        let saved = StatusRepo::replace_for_stage(self.conn, stage_id, &statuses, now)?;
        log::info!("Saved {} status(es) for stage '{}'", saved.len(), stage.name);

        self.working = Some(WorkingCopy::new(stage_id, saved.clone()));
        Ok(saved)
    }

    /// Commit the loaded working copy
    pub fn save_working_copy(&mut self) -> Result<Vec<StatusDefinition>> {
        let working = self.working_mut()?;
        let stage_id = working.stage_id();
        let statuses = working.statuses().to_vec();
        self.commit_working_copy(stage_id, statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusCategory;

    fn status(value: &str) -> StatusDefinition {
        StatusDefinition::new(1, value, value, StatusCategory::Pending)
    }

    fn values(copy: &WorkingCopy) -> Vec<&str> {
        copy.statuses().iter().map(|s| s.status_value.as_str()).collect()
    }

    #[test]
    fn test_reorder_renumbers_from_one() {
        let mut copy = WorkingCopy::new(1, vec![status("A"), status("B"), status("C")]);
        copy.reorder(0, 2).unwrap();
        assert_eq!(values(&copy), vec!["B", "C", "A"]);
        let orders: Vec<i64> = copy.statuses().iter().map(|s| s.sort_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_reorder_out_of_range() {
        let mut copy = WorkingCopy::new(1, vec![status("A")]);
        assert!(copy.reorder(0, 1).is_err());
        assert!(copy.reorder(3, 0).is_err());
    }

    #[test]
    fn test_unsaved_changes_and_reset() {
        let mut copy = WorkingCopy::new(1, vec![status("A")]);
        assert!(!copy.has_unsaved_changes());

        copy.add(status("B"));
        assert!(copy.has_unsaved_changes());
        assert_eq!(copy.statuses()[1].sort_order, 1);

        copy.reset();
        assert!(!copy.has_unsaved_changes());
        assert_eq!(values(&copy), vec!["A"]);
    }

    #[test]
    fn test_edit_then_revert_is_not_a_change() {
        let mut copy = WorkingCopy::new(1, vec![status("A")]);
        copy.update(0, UpdateStatusInput { display_name: Some("Other".to_string()), ..Default::default() })
            .unwrap();
        assert!(copy.has_unsaved_changes());
        copy.update(0, UpdateStatusInput { display_name: Some("A".to_string()), ..Default::default() })
            .unwrap();
        assert!(!copy.has_unsaved_changes());
    }

    #[test]
    fn test_add_attaches_to_stage() {
        let mut copy = WorkingCopy::new(7, Vec::new());
        copy.add(status("A"));
        assert_eq!(copy.statuses()[0].stage_id, 7);
        assert_eq!(copy.statuses()[0].sort_order, 1);
    }

    #[test]
    fn test_add_keeps_only_ids_saved_for_this_stage() {
        let saved = StatusDefinition { id: Some(10), ..status("A") };
        let mut copy = WorkingCopy::new(1, vec![saved.clone()]);
        copy.add(StatusDefinition { id: Some(99), ..status("B") });
        copy.add(saved);
        assert_eq!(copy.statuses()[1].id, None);
        assert_eq!(copy.statuses()[2].id, Some(10));
    }

    #[test]
    fn test_remove_and_update_bounds() {
        let mut copy = WorkingCopy::new(1, vec![status("A")]);
        assert!(copy.update(1, UpdateStatusInput::default()).is_err());
        assert!(copy.remove(1).is_err());
        assert_eq!(copy.remove(0).unwrap().status_value, "A");
        assert!(copy.statuses().is_empty());
    }

    #[test]
    fn test_apply_template() {
        let mut copy = WorkingCopy::new(4, Vec::new());
        copy.apply_template("basic").unwrap();
        assert_eq!(values(&copy), vec!["passed", "failed", "declined"]);
        assert!(copy.original().is_empty());

        let err = copy.apply_template("nope").unwrap_err();
        assert!(err.to_string().contains("Unknown status template"));
        assert_eq!(copy.statuses().len(), 3);
    }

    #[test]
    fn test_position_of_ignores_case() {
        let copy = WorkingCopy::new(1, vec![status("Pass"), status("fail")]);
        assert_eq!(copy.position_of("FAIL"), Some(1));
        assert_eq!(copy.position_of("hold"), None);
    }
}
