use rusqlite::{Connection, Result};
use crate::models::{StatusDefinition, StatusRow};

/// Status definition repository for database operations
///
/// Statuses are written per stage as a whole set: [`StatusRepo::replace_for_stage`]
/// deletes the stage's rows and inserts the new set in one transaction.
pub struct StatusRepo;

impl StatusRepo {
    /// List statuses, optionally restricted to one stage
    pub fn list(conn: &Connection, stage_id: Option<i64>) -> Result<Vec<StatusDefinition>> {
        let mut statuses = Vec::new();
        match stage_id {
            Some(stage_id) => {
                let sql = format!(
                    "SELECT {} FROM stage_statuses WHERE stage_id = ?1 ORDER BY sort_order, id",
                    StatusRow::COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                for row in stmt.query_map([stage_id], StatusRow::read)? {
                    statuses.push(row?.into_model()?);
                }
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM stage_statuses ORDER BY stage_id, sort_order, id",
                    StatusRow::COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                for row in stmt.query_map([], StatusRow::read)? {
                    statuses.push(row?.into_model()?);
                }
            }
        }
        Ok(statuses)
    }

    /// Replace every status of a stage with `statuses`.
    ///
    /// Entries keep their id when they have one; new entries get one from
    /// the store. Each entry is attached to `stage_id` regardless of its own
    /// `stage_id`. Returns the stored set in sort order.
    pub fn replace_for_stage(
        conn: &Connection,
        stage_id: i64,
        statuses: &[StatusDefinition],
        now: i64,
    ) -> Result<Vec<StatusDefinition>> {
        let tx = conn.unchecked_transaction()?;

        let removed = tx.execute("DELETE FROM stage_statuses WHERE stage_id = ?1", [stage_id])?;

        for status in statuses {
            let row = StatusRow::from_model(status);
            tx.execute(
                "INSERT INTO stage_statuses (id, stage_id, status_value, display_name, status_category,
                        color_scheme, sort_order, is_active, is_final, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    row.id,
                    stage_id,
                    row.status_value.trim(),
                    row.display_name.trim(),
                    row.status_category,
                    row.color_scheme,
                    row.sort_order,
                    row.is_active,
                    row.is_final,
                    now,
                    now,
                ],
            )?;
        }

        tx.commit()?;
        log::debug!(
            "Replaced statuses for stage {}: {} removed, {} inserted",
            stage_id,
            removed,
            statuses.len()
        );

        Self::list(conn, Some(stage_id))
    }
}
