use rusqlite::{Connection, OptionalExtension, Result};
use crate::models::{SortUpdate, TaskDefinition, TaskRow};

/// Task definition repository for database operations
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task definition and return it with the assigned id
    pub fn insert(conn: &Connection, task: &TaskDefinition) -> Result<TaskDefinition> {
        let row = TaskRow::from_model(task);
        conn.execute(
            "INSERT INTO stage_tasks (stage_id, name, display_name, description, task_type,
                    sort_order, is_required, is_active, due_days_offset, email_template_id,
                    created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                row.stage_id,
                row.name,
                row.display_name,
                row.description,
                row.task_type,
                row.sort_order,
                row.is_required,
                row.is_active,
                row.due_days_offset,
                row.email_template_id,
                row.created_at,
                row.updated_at,
            ],
        )?;

        let id = conn.last_insert_rowid();
        log::debug!("Inserted task '{}' for stage {} (id: {})", task.name, task.stage_id, id);
        Ok(TaskDefinition { id, ..task.clone() })
    }

    /// Write every mutable column of an existing task. Returns false if no row matched.
    pub fn update(conn: &Connection, task: &TaskDefinition) -> Result<bool> {
        let row = TaskRow::from_model(task);
        let updated = conn.execute(
            "UPDATE stage_tasks SET name = ?1, display_name = ?2, description = ?3, task_type = ?4,
                    sort_order = ?5, is_required = ?6, is_active = ?7, due_days_offset = ?8,
                    email_template_id = ?9, updated_at = ?10
             WHERE id = ?11",
            rusqlite::params![
                row.name,
                row.display_name,
                row.description,
                row.task_type,
                row.sort_order,
                row.is_required,
                row.is_active,
                row.due_days_offset,
                row.email_template_id,
                row.updated_at,
                row.id,
            ],
        )?;
        Ok(updated > 0)
    }

    /// Permanently delete a task. Returns false if no row matched.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM stage_tasks WHERE id = ?1", [id])?;
        log::debug!("Deleted task id={} ({} row(s))", id, deleted);
        Ok(deleted > 0)
    }

    /// Get task by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<TaskDefinition>> {
        let sql = format!("SELECT {} FROM stage_tasks WHERE id = ?1", TaskRow::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let row = stmt.query_row([id], TaskRow::read).optional()?;
        match row {
            Some(row) => Ok(Some(row.into_model()?)),
            None => Ok(None),
        }
    }

    /// List tasks, optionally restricted to one stage.
    /// Ordered by sort order within stage.
    pub fn list(conn: &Connection, stage_id: Option<i64>) -> Result<Vec<TaskDefinition>> {
        let mut tasks = Vec::new();
        match stage_id {
            Some(stage_id) => {
                let sql = format!(
                    "SELECT {} FROM stage_tasks WHERE stage_id = ?1 ORDER BY sort_order, id",
                    TaskRow::COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                for row in stmt.query_map([stage_id], TaskRow::read)? {
                    tasks.push(row?.into_model()?);
                }
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM stage_tasks ORDER BY sort_order, id",
                    TaskRow::COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                for row in stmt.query_map([], TaskRow::read)? {
                    tasks.push(row?.into_model()?);
                }
            }
        }
        Ok(tasks)
    }

    /// Apply new sort orders in one transaction.
    /// Returns the ids that did not match any row; nothing is written in that case.
    pub fn update_sort_orders(conn: &Connection, updates: &[SortUpdate], now: i64) -> Result<Vec<i64>> {
        let tx = conn.unchecked_transaction()?;
        let mut missing = Vec::new();
        for update in updates {
            let changed = tx.execute(
                "UPDATE stage_tasks SET sort_order = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![update.sort_order, now, update.id],
            )?;
            if changed == 0 {
                missing.push(update.id);
            }
        }
        if missing.is_empty() {
            tx.commit()?;
        } else {
            tx.rollback()?;
        }
        Ok(missing)
    }

    /// Insert several tasks atomically
    pub fn insert_many(conn: &Connection, tasks: &[TaskDefinition]) -> Result<Vec<TaskDefinition>> {
        let tx = conn.unchecked_transaction()?;
        let mut saved = Vec::with_capacity(tasks.len());
        for task in tasks {
            saved.push(Self::insert(&tx, task)?);
        }
        tx.commit()?;
        Ok(saved)
    }
}
