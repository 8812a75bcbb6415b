use rusqlite::{Connection, OptionalExtension, Result};
use crate::models::{SortUpdate, Stage, StageRow};

/// Stage repository for database operations
///
/// Maps `Stage` models onto the `selection_stages` table through
/// [`StageRow`]. Rows are never deleted; deactivation is an update.
pub struct StageRepo;

impl StageRepo {
    /// Insert a stage and return it with the assigned id
    pub fn insert(conn: &Connection, stage: &Stage) -> Result<Stage> {
        let row = StageRow::from_model(stage)?;
        conn.execute(
            "INSERT INTO selection_stages (name, display_name, description, stage_group, sort_order,
                    is_active, color_scheme, icon, estimated_duration_minutes, requires_session,
                    session_formats, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                row.name,
                row.display_name,
                row.description,
                row.stage_group,
                row.sort_order,
                row.is_active,
                row.color_scheme,
                row.icon,
                row.estimated_duration_minutes,
                row.requires_session,
                row.session_formats,
                row.created_at,
                row.updated_at,
            ],
        )?;

        let id = conn.last_insert_rowid();
        log::debug!("Inserted stage '{}' (id: {})", stage.name, id);
        Ok(Stage { id, ..stage.clone() })
    }

    /// Write every column of an existing stage. Returns false if no row matched.
    pub fn update(conn: &Connection, stage: &Stage) -> Result<bool> {
        let row = StageRow::from_model(stage)?;
        let updated = conn.execute(
            "UPDATE selection_stages SET name = ?1, display_name = ?2, description = ?3,
                    stage_group = ?4, sort_order = ?5, is_active = ?6, color_scheme = ?7,
                    icon = ?8, estimated_duration_minutes = ?9, requires_session = ?10,
                    session_formats = ?11, updated_at = ?12
             WHERE id = ?13",
            rusqlite::params![
                row.name,
                row.display_name,
                row.description,
                row.stage_group,
                row.sort_order,
                row.is_active,
                row.color_scheme,
                row.icon,
                row.estimated_duration_minutes,
                row.requires_session,
                row.session_formats,
                row.updated_at,
                row.id,
            ],
        )?;
        log::debug!("Updated stage id={} ({} row(s))", stage.id, updated);
        Ok(updated > 0)
    }

    /// Set the active flag. Returns false if no row matched.
    pub fn set_active(conn: &Connection, id: i64, active: bool, now: i64) -> Result<bool> {
        let updated = conn.execute(
            "UPDATE selection_stages SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            rusqlite::params![if active { 1 } else { 0 }, now, id],
        )?;
        Ok(updated > 0)
    }

    /// Get stage by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Stage>> {
        let sql = format!("SELECT {} FROM selection_stages WHERE id = ?1", StageRow::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let row = stmt.query_row([id], StageRow::read).optional()?;
        match row {
            Some(row) => Ok(Some(row.into_model()?)),
            None => Ok(None),
        }
    }

    /// List all stages ordered by sort order, ties by insertion order
    pub fn list_all(conn: &Connection) -> Result<Vec<Stage>> {
        let sql = format!(
            "SELECT {} FROM selection_stages ORDER BY sort_order, id",
            StageRow::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], StageRow::read)?;

        let mut stages = Vec::new();
        for row in rows {
            stages.push(row?.into_model()?);
        }
        Ok(stages)
    }

    /// Apply new sort orders in one transaction.
    /// Returns the ids that did not match any row; nothing is written in that case.
    pub fn update_sort_orders(conn: &Connection, updates: &[SortUpdate], now: i64) -> Result<Vec<i64>> {
        let tx = conn.unchecked_transaction()?;
        let mut missing = Vec::new();
        for update in updates {
            let changed = tx.execute(
                "UPDATE selection_stages SET sort_order = ?1, updated_at = ?2 WHERE id = ?3",
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
}
