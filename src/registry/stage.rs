use rusqlite::Connection;
use crate::error::{ConfigError, Result, ValidationErrors};
use crate::models::{CreateStageInput, SortUpdate, Stage, UpdateStageInput};
use crate::repo::StageRepo;
use crate::validation::validate_stage;

/// In-memory view of all stages backed by the store
///
/// Holds every stage, active or not, in pipeline order. Each mutation is
/// validated against this collection, persisted, then applied in memory.
pub struct StageRegistry<'c> {
    conn: &'c Connection,
    stages: Vec<Stage>,
}

fn pipeline_order(stages: &mut [Stage]) {
    stages.sort_by_key(|s| (s.sort_order, s.id));
}

impl<'c> StageRegistry<'c> {
    /// Load all stages from the store
    pub fn load(conn: &'c Connection) -> Result<Self> {
        let stages = StageRepo::list_all(conn)?;
        Ok(Self { conn, stages })
    }

    /// All stages ordered by sort order
    pub fn list_stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Active stages ordered by sort order
    pub fn list_active_stages(&self) -> Vec<&Stage> {
        self.stages.iter().filter(|s| s.is_active).collect()
    }

    pub fn get_stage(&self, id: i64) -> Result<&Stage> {
        self.stages
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ConfigError::not_found("Stage", id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    fn next_sort_order(&self) -> i64 {
        self.stages.iter().map(|s| s.sort_order).max().map_or(1, |max| max + 1)
    }

    fn position(&self, id: i64) -> Result<usize> {
        self.stages
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| ConfigError::not_found("Stage", id))
    }

    /// Create a stage; active by default and appended when no sort order is given
    pub fn create_stage(&mut self, input: CreateStageInput) -> Result<Stage> {
        let now = chrono::Utc::now().timestamp();
        let candidate = input.into_stage(self.next_sort_order(), now);

        let errors = validate_stage(&candidate, &self.stages);
        if !errors.is_empty() {
            log::warn!("Rejected stage '{}': {}", candidate.name, errors.join(", "));
        }
        ConfigError::check(errors)?;

        let stage = StageRepo::insert(self.conn, &candidate)?;
        log::info!("Created stage '{}' (id: {})", stage.name, stage.id);
        self.stages.push(stage.clone());
        pipeline_order(&mut self.stages);
        Ok(stage)
    }

    /// Apply a partial update; the merged stage is validated as a whole
    pub fn update_stage(&mut self, id: i64, input: UpdateStageInput) -> Result<Stage> {
        let index = self.position(id)?;
        let mut candidate = self.stages[index].clone();
        input.apply_to(&mut candidate);
        candidate.updated_at = chrono::Utc::now().timestamp();

        let errors = validate_stage(&candidate, &self.stages);
        if !errors.is_empty() {
            log::warn!("Rejected update of stage {}: {}", id, errors.join(", "));
        }
        ConfigError::check(errors)?;

        if !StageRepo::update(self.conn, &candidate)? {
            return Err(ConfigError::not_found("Stage", id));
        }
        self.stages[index] = candidate.clone();
        pipeline_order(&mut self.stages);
        Ok(candidate)
    }

    /// Soft-delete: clear the active flag. Repeating the call is a no-op.
    pub fn delete_stage(&mut self, id: i64) -> Result<()> {
        let index = self.position(id)?;
        if !self.stages[index].is_active {
            return Ok(());
        }
        let now = chrono::Utc::now().timestamp();
        if !StageRepo::set_active(self.conn, id, false, now)? {
            return Err(ConfigError::not_found("Stage", id));
        }
        let stage = &mut self.stages[index];
        stage.is_active = false;
        stage.updated_at = now;
        log::info!("Deactivated stage '{}' (id: {})", stage.name, id);
        Ok(())
    }

    /// Reactivate a soft-deleted stage
    pub fn restore_stage(&mut self, id: i64) -> Result<Stage> {
        let index = self.position(id)?;
        if !self.stages[index].is_active {
            let now = chrono::Utc::now().timestamp();
            if !StageRepo::set_active(self.conn, id, true, now)? {
                return Err(ConfigError::not_found("Stage", id));
            }
            let stage = &mut self.stages[index];
            stage.is_active = true;
            stage.updated_at = now;
        }
        Ok(self.stages[index].clone())
    }

    /// Bulk-apply new sort orders. Duplicate sort orders are allowed;
    /// ties keep creation order.
    pub fn reorder_stages(&mut self, updates: &[SortUpdate]) -> Result<()> {
        if let Some(bad) = updates.iter().find(|u| u.sort_order < 0) {
            return Err(ConfigError::Validation(ValidationErrors::single(format!(
                "Sort order must be 0 or greater (stage {})",
                bad.id
            ))));
        }

        let now = chrono::Utc::now().timestamp();
        let missing = StageRepo::update_sort_orders(self.conn, updates, now)?;
        if let Some(id) = missing.first() {
            return Err(ConfigError::not_found("Stage", id));
        }

        for update in updates {
            if let Some(stage) = self.stages.iter_mut().find(|s| s.id == update.id) {
                stage.sort_order = update.sort_order;
                stage.updated_at = now;
            }
        }
        pipeline_order(&mut self.stages);
        log::info!("Reordered {} stage(s)", updates.len());
        Ok(())
    }
}
