use rusqlite::Connection;
use crate::error::{ConfigError, Result, ValidationErrors};
use crate::models::{CreateTaskInput, SortUpdate, TaskDefinition, UpdateTaskInput};
use crate::repo::{StageRepo, TaskRepo};
use crate::templates::{task_template, TASK_TEMPLATE_KEYS};
use crate::validation::validate_task;

/// In-memory view of all task definitions backed by the store
///
/// Name uniqueness is checked per stage against every task of that stage,
/// active or inactive, whether or not the stage itself is active.
pub struct TaskRegistry<'c> {
    conn: &'c Connection,
    tasks: Vec<TaskDefinition>,
}

fn checklist_order(tasks: &mut [TaskDefinition]) {
    tasks.sort_by_key(|t| (t.sort_order, t.id));
}

impl<'c> TaskRegistry<'c> {
    pub fn load(conn: &'c Connection) -> Result<Self> {
        let tasks = TaskRepo::list(conn, None)?;
        Ok(Self { conn, tasks })
    }

    /// All tasks, or only those of `stage_id`, in sort order
    pub fn list_tasks(&self, stage_id: Option<i64>) -> Vec<&TaskDefinition> {
        self.tasks
            .iter()
            .filter(|t| stage_id.map_or(true, |id| t.stage_id == id))
            .collect()
    }

    pub fn get_task(&self, id: i64) -> Result<&TaskDefinition> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ConfigError::not_found("Task", id))
    }

    pub fn find_by_name(&self, stage_id: i64, name: &str) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|t| t.stage_id == stage_id && t.name == name)
    }

    fn next_sort_order(&self, stage_id: i64) -> i64 {
        self.tasks
            .iter()
            .filter(|t| t.stage_id == stage_id)
            .map(|t| t.sort_order)
            .max()
            .map_or(1, |max| max + 1)
    }

    fn ensure_stage(&self, stage_id: i64) -> Result<()> {
        match StageRepo::get_by_id(self.conn, stage_id)? {
            Some(_) => Ok(()),
            None => Err(ConfigError::not_found("Stage", stage_id)),
        }
    }

    pub fn create_task(&mut self, input: CreateTaskInput) -> Result<TaskDefinition> {
        self.ensure_stage(input.stage_id)?;

        let now = chrono::Utc::now().timestamp();
        let next = self.next_sort_order(input.stage_id);
        let candidate = input.into_task(next, now);

        let errors = validate_task(&candidate, &self.tasks);
        if !errors.is_empty() {
            log::warn!("Rejected task '{}': {}", candidate.name, errors.join(", "));
        }
        ConfigError::check(errors)?;

        let task = TaskRepo::insert(self.conn, &candidate)?;
        self.tasks.push(task.clone());
        checklist_order(&mut self.tasks);
        Ok(task)
    }

    pub fn update_task(&mut self, id: i64, input: UpdateTaskInput) -> Result<TaskDefinition> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ConfigError::not_found("Task", id))?;
        let mut candidate = self.tasks[index].clone();
        input.apply_to(&mut candidate);
        candidate.updated_at = chrono::Utc::now().timestamp();

        let errors = validate_task(&candidate, &self.tasks);
        if !errors.is_empty() {
            log::warn!("Rejected update of task {}: {}", id, errors.join(", "));
        }
        ConfigError::check(errors)?;

        if !TaskRepo::update(self.conn, &candidate)? {
            return Err(ConfigError::not_found("Task", id));
        }
        self.tasks[index] = candidate.clone();
        checklist_order(&mut self.tasks);
        Ok(candidate)
    }

    /// Permanently remove a task definition
    pub fn delete_task(&mut self, id: i64) -> Result<()> {
        if !TaskRepo::delete(self.conn, id)? {
            return Err(ConfigError::not_found("Task", id));
        }
        self.tasks.retain(|t| t.id != id);
        log::info!("Deleted task {}", id);
        Ok(())
    }

    pub fn reorder_tasks(&mut self, updates: &[SortUpdate]) -> Result<()> {
        if let Some(bad) = updates.iter().find(|u| u.sort_order < 0) {
            return Err(ConfigError::Validation(ValidationErrors::single(format!(
                "Sort order must be 0 or greater (task {})",
                bad.id
            ))));
        }

        let now = chrono::Utc::now().timestamp();
        let missing = TaskRepo::update_sort_orders(self.conn, updates, now)?;
        if let Some(id) = missing.first() {
            return Err(ConfigError::not_found("Task", id));
        }

        for update in updates {
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == update.id) {
                task.sort_order = update.sort_order;
                task.updated_at = now;
            }
        }
        checklist_order(&mut self.tasks);
        Ok(())
    }

    /// Append the checklist template `key` to a stage.
    ///
    /// Entries whose name already exists in the stage are skipped. Returns
    /// the tasks that were created.
    pub fn apply_task_template(&mut self, stage_id: i64, key: &str) -> Result<Vec<TaskDefinition>> {
        let presets = task_template(key).ok_or_else(|| {
            ConfigError::Validation(ValidationErrors::single(format!(
                "Unknown task template '{}' (available: {})",
                key,
                TASK_TEMPLATE_KEYS.join(", ")
            )))
        })?;
        self.ensure_stage(stage_id)?;

        let now = chrono::Utc::now().timestamp();
        let mut next = self.next_sort_order(stage_id);
        let mut pending = Vec::new();
        for preset in presets {
            if self.find_by_name(stage_id, preset.name).is_some() {
                log::debug!("Skipping template task '{}': already present", preset.name);
                continue;
            }
            let task = CreateTaskInput {
                stage_id,
                name: preset.name.to_string(),
                display_name: preset.display_name.to_string(),
                description: preset.description.to_string(),
                task_kind: preset.kind,
                sort_order: Some(next),
                is_required: preset.is_required,
                due_offset_days: preset.due_offset_days,
                email_template_id: None,
            }
            .into_task(next, now);
            next += 1;
            pending.push(task);
        }

        let created = TaskRepo::insert_many(self.conn, &pending)?;
        log::info!("Applied task template '{}' to stage {}: {} task(s)", key, stage_id, created.len());
        self.tasks.extend(created.iter().cloned());
        checklist_order(&mut self.tasks);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::models::CreateStageInput;
    use crate::registry::StageRegistry;

    fn setup(conn: &Connection) -> (i64, i64) {
        let mut stages = StageRegistry::load(conn).unwrap();
        let a = stages.create_stage(CreateStageInput::new("screening", "Screening")).unwrap();
        let b = stages.create_stage(CreateStageInput::new("interview", "Interview")).unwrap();
        (a.id, b.id)
    }

    #[test]
    fn test_create_appends_within_stage() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let (a, b) = setup(&conn);
        let mut registry = TaskRegistry::load(&conn).unwrap();

        let first = registry.create_task(CreateTaskInput::new(a, "one", "One")).unwrap();
        let second = registry.create_task(CreateTaskInput::new(a, "two", "Two")).unwrap();
        let other = registry.create_task(CreateTaskInput::new(b, "one", "One")).unwrap();

        assert_eq!(first.sort_order, 1);
        assert_eq!(second.sort_order, 2);
        assert_eq!(other.sort_order, 1);
        assert_eq!(registry.list_tasks(Some(a)).len(), 2);
        assert_eq!(registry.list_tasks(None).len(), 3);
    }

    #[test]
    fn test_create_for_unknown_stage() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let mut registry = TaskRegistry::load(&conn).unwrap();
        let err = registry.create_task(CreateTaskInput::new(9, "x", "X")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { entity: "Stage", .. }));
    }

    #[test]
    fn test_inactive_task_still_reserves_name() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let (a, _) = setup(&conn);
        let mut registry = TaskRegistry::load(&conn).unwrap();
        let task = registry.create_task(CreateTaskInput::new(a, "one", "One")).unwrap();
        registry
            .update_task(task.id, UpdateTaskInput { is_active: Some(false), ..Default::default() })
            .unwrap();

        let err = registry.create_task(CreateTaskInput::new(a, "one", "Again")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_delete_is_hard_delete() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let (a, _) = setup(&conn);
        let mut registry = TaskRegistry::load(&conn).unwrap();
        let task = registry.create_task(CreateTaskInput::new(a, "one", "One")).unwrap();

        registry.delete_task(task.id).unwrap();
        assert!(registry.get_task(task.id).is_err());
        assert!(TaskRepo::get_by_id(&conn, task.id).unwrap().is_none());

        let err = registry.delete_task(task.id).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { entity: "Task", .. }));
    }

    #[test]
    fn test_reorder_tasks() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let (a, _) = setup(&conn);
        let mut registry = TaskRegistry::load(&conn).unwrap();
        let one = registry.create_task(CreateTaskInput::new(a, "one", "One")).unwrap();
        let two = registry.create_task(CreateTaskInput::new(a, "two", "Two")).unwrap();

        registry
            .reorder_tasks(&[
                SortUpdate { id: one.id, sort_order: 2 },
                SortUpdate { id: two.id, sort_order: 1 },
            ])
            .unwrap();
        let names: Vec<&str> = registry.list_tasks(Some(a)).iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["two", "one"]);

        let reloaded = TaskRegistry::load(&conn).unwrap();
        let names: Vec<&str> = reloaded.list_tasks(Some(a)).iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["two", "one"]);
    }

    #[test]
    fn test_apply_task_template_skips_existing() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let (a, _) = setup(&conn);
        let mut registry = TaskRegistry::load(&conn).unwrap();
        registry
            .create_task(CreateTaskInput::new(a, "schedule_interview", "Existing"))
            .unwrap();

        let created = registry.apply_task_template(a, "interview").unwrap();
        let names: Vec<&str> = created.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["send_confirmation", "conduct_interview", "submit_evaluation"]);
        assert_eq!(created[0].sort_order, 2);

        let again = registry.apply_task_template(a, "interview").unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_apply_unknown_task_template() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let (a, _) = setup(&conn);
        let mut registry = TaskRegistry::load(&conn).unwrap();
        let err = registry.apply_task_template(a, "lunch").unwrap_err();
        assert!(err.to_string().contains("Unknown task template 'lunch'"));
    }
}
