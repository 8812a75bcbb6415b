// Configuration summary, health score, export and integrity check

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::models::Stage;
use crate::repo::{StageRepo, StatusRepo, TaskRepo};
use crate::validation::{validate_status_entries, validate_statuses};

/// Schema version written into every export
pub const SYSTEM_VERSION: &str = "1.0.0";

/// Counts across the three tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_stages: i64,
    pub active_stages: i64,
    pub total_tasks: i64,
    pub total_statuses: i64,
    pub last_updated: DateTime<Utc>,
}

/// Derived configuration health
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationStatus {
    pub is_configured: bool,
    pub score: u32,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Aggregate counts in a single read. `last_updated` falls back to now
/// when nothing has been stored yet.
pub fn get_summary(conn: &Connection) -> Result<Summary> {
    let (total_stages, active_stages, total_tasks, total_statuses, last_ts): (i64, i64, i64, i64, Option<i64>) =
        conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM selection_stages),
                (SELECT COUNT(*) FROM selection_stages WHERE is_active = 1),
                (SELECT COUNT(*) FROM stage_tasks),
                (SELECT COUNT(*) FROM stage_statuses),
                (SELECT MAX(ts) FROM (
                    SELECT MAX(updated_at) AS ts FROM selection_stages
                    UNION ALL SELECT MAX(updated_at) FROM stage_tasks
                    UNION ALL SELECT MAX(updated_at) FROM stage_statuses
                ))",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )?;

    let last_updated = last_ts
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or_else(Utc::now);

    Ok(Summary {
        total_stages,
        active_stages,
        total_tasks,
        total_statuses,
        last_updated,
    })
}

const STAGE_POINTS: u32 = 40;
const TASK_POINTS: u32 = 30;
const STATUS_POINTS: u32 = 30;
const PIPELINE_BONUS: u32 = 10;
const BONUS_STAGE_COUNT: i64 = 5;
const CONFIGURED_THRESHOLD: u32 = 70;

/// Score the summary out of 100
pub fn compute_status(summary: &Summary) -> ConfigurationStatus {
    let mut score = 0;
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if summary.active_stages > 0 {
        score += STAGE_POINTS;
    } else {
        issues.push("No active selection stages are configured".to_string());
        recommendations.push("Create at least one stage with `senko stages add` or run `senko init`".to_string());
    }

    if summary.total_tasks > 0 {
        score += TASK_POINTS;
    } else {
        issues.push("No stage tasks are defined".to_string());
        recommendations.push("Add checklist tasks with `senko tasks add` or `senko tasks template`".to_string());
    }

    if summary.total_statuses > 0 {
        score += STATUS_POINTS;
    } else {
        issues.push("No stage statuses are defined".to_string());
        recommendations.push("Define outcome statuses with `senko statuses template`".to_string());
    }

    if summary.active_stages >= BONUS_STAGE_COUNT {
        score += PIPELINE_BONUS;
    }
    let score = score.min(100);

    ConfigurationStatus {
        is_configured: score >= CONFIGURED_THRESHOLD,
        score,
        issues,
        recommendations,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    pub selection_stages: Vec<Stage>,
    pub summary: Summary,
}

/// Downloadable configuration snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub export_date: DateTime<Utc>,
    pub system_version: String,
    pub data: ExportData,
}

impl ExportDocument {
    /// `system_config_<YYYY-MM-DD>.json`, dated by the export time
    pub fn file_name(&self) -> String {
        format!("system_config_{}.json", self.export_date.format("%Y-%m-%d"))
    }

    /// Two-space indented JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Snapshot all stages plus the summary
pub fn export_configuration(conn: &Connection) -> Result<ExportDocument> {
    let selection_stages = StageRepo::list_all(conn)?;
    let summary = get_summary(conn)?;
    Ok(ExportDocument {
        export_date: Utc::now(),
        system_version: SYSTEM_VERSION.to_string(),
        data: ExportData { selection_stages, summary },
    })
}

/// Write the export into `dir` and return the file path
pub fn write_export(dir: &Path, doc: &ExportDocument) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(doc.file_name());
    let mut json = doc.to_json()?;
    json.push('\n');
    std::fs::write(&path, json)?;
    log::info!("Exported configuration to {}", path.display());
    Ok(path)
}

/// Outcome of the integrity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validate every active stage's status set and look for loose ends.
/// Read-only.
pub fn perform_integrity_check(conn: &Connection) -> Result<IntegrityReport> {
    let stages = StageRepo::list_all(conn)?;
    let tasks = TaskRepo::list(conn, None)?;
    let statuses = StatusRepo::list(conn, None)?;

    let mut tasks_by_stage: HashMap<i64, usize> = HashMap::new();
    for task in tasks.iter().filter(|t| t.is_active) {
        *tasks_by_stage.entry(task.stage_id).or_default() += 1;
    }
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !stages.iter().any(|s| s.is_active) {
        errors.push("No active stages are configured".to_string());
    }

    for stage in &stages {
        let stage_statuses: Vec<_> = statuses
            .iter()
            .filter(|s| s.stage_id == stage.id)
            .cloned()
            .collect();
        let task_count = tasks.iter().filter(|t| t.stage_id == stage.id).count();

        if !stage.is_active {
            if task_count > 0 || !stage_statuses.is_empty() {
                warnings.push(format!(
                    "{}: stage is inactive but still has {} task(s) and {} status(es)",
                    stage.display_name,
                    task_count,
                    stage_statuses.len()
                ));
            }
            continue;
        }

        let violations = if stage.requires_session {
            validate_statuses(&stage_statuses)
        } else {
            validate_status_entries(&stage_statuses)
        };
        for violation in violations {
            errors.push(format!("{}: {}", stage.display_name, violation));
        }

        if tasks_by_stage.get(&stage.id).copied().unwrap_or(0) == 0 {
            warnings.push(format!("{}: no active tasks defined", stage.display_name));
        }
    }

    let active: Vec<&Stage> = stages.iter().filter(|s| s.is_active).collect();
    for pair in active.windows(2) {
        if pair[0].sort_order == pair[1].sort_order {
            warnings.push(format!(
                "Stages '{}' and '{}' share sort order {}",
                pair[0].name, pair[1].name, pair[0].sort_order
            ));
        }
    }

    Ok(IntegrityReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    })
}
