// Storage row mapping
//
// Each entity has a row struct mirroring its table columns one-to-one.
// `from_model` / `into_model` are the only place where enums become text,
// booleans become integers and session formats become JSON.

use rusqlite::Row;
use super::{
    ColorScheme, SessionFormat, Stage, StageGroup, StatusCategory, StatusDefinition, TaskDefinition,
    TaskKind,
};

/// A stored value that does not map back onto the model
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("unknown {column} value '{value}'")]
    UnknownValue { column: &'static str, value: String },
    #[error("malformed JSON in {column}: {source}")]
    Json {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl From<RowError> for rusqlite::Error {
    fn from(err: RowError) -> Self {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
    }
}

fn unknown(column: &'static str, value: &str) -> RowError {
    RowError::UnknownValue { column, value: value.to_string() }
}

fn flag(value: bool) -> i64 {
    if value { 1 } else { 0 }
}

/// Row of the `selection_stages` table
#[derive(Debug, Clone, PartialEq)]
pub struct StageRow {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub stage_group: String,
    pub sort_order: i64,
    pub is_active: i64,
    pub color_scheme: String,
    pub icon: Option<String>,
    pub estimated_duration_minutes: i64,
    pub requires_session: i64,
    pub session_formats: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl StageRow {
    pub const COLUMNS: &'static str = "id, name, display_name, description, stage_group, sort_order, \
        is_active, color_scheme, icon, estimated_duration_minutes, requires_session, \
        session_formats, created_at, updated_at";

    pub fn read(row: &Row) -> rusqlite::Result<Self> {
        Ok(StageRow {
            id: row.get(0)?,
            name: row.get(1)?,
            display_name: row.get(2)?,
            description: row.get(3)?,
            stage_group: row.get(4)?,
            sort_order: row.get(5)?,
            is_active: row.get(6)?,
            color_scheme: row.get(7)?,
            icon: row.get(8)?,
            estimated_duration_minutes: row.get(9)?,
            requires_session: row.get(10)?,
            session_formats: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    pub fn from_model(stage: &Stage) -> Result<Self, RowError> {
        let formats: Vec<&str> = stage.session_formats.iter().map(|f| f.as_str()).collect();
        let session_formats = serde_json::to_string(&formats)
            .map_err(|source| RowError::Json { column: "session_formats", source })?;
        Ok(StageRow {
            id: stage.id,
            name: stage.name.clone(),
            display_name: stage.display_name.clone(),
            description: stage.description.clone(),
            stage_group: stage.stage_group.as_str().to_string(),
            sort_order: stage.sort_order,
            is_active: flag(stage.is_active),
            color_scheme: stage.color_scheme.as_str().to_string(),
            icon: stage.icon.clone(),
            estimated_duration_minutes: stage.estimated_duration_minutes,
            requires_session: flag(stage.requires_session),
            session_formats,
            created_at: stage.created_at,
            updated_at: stage.updated_at,
        })
    }

    pub fn into_model(self) -> Result<Stage, RowError> {
        let stage_group = StageGroup::from_str(&self.stage_group)
            .ok_or_else(|| unknown("stage_group", &self.stage_group))?;
        let color_scheme = ColorScheme::from_str(&self.color_scheme)
            .ok_or_else(|| unknown("color_scheme", &self.color_scheme))?;
        let raw_formats: Vec<String> = if self.session_formats.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&self.session_formats)
                .map_err(|source| RowError::Json { column: "session_formats", source })?
        };
        let session_formats = raw_formats
            .iter()
            .map(|f| SessionFormat::from_str(f).ok_or_else(|| unknown("session_formats", f)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Stage {
            id: self.id,
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            stage_group,
            sort_order: self.sort_order,
            is_active: self.is_active != 0,
            color_scheme,
            icon: self.icon,
            estimated_duration_minutes: self.estimated_duration_minutes,
            requires_session: self.requires_session != 0,
            session_formats,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row of the `stage_tasks` table
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub id: i64,
    pub stage_id: i64,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub task_type: String,
    pub sort_order: i64,
    pub is_required: i64,
    pub is_active: i64,
    pub due_days_offset: Option<i64>,
    pub email_template_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TaskRow {
    pub const COLUMNS: &'static str = "id, stage_id, name, display_name, description, task_type, \
        sort_order, is_required, is_active, due_days_offset, email_template_id, created_at, updated_at";

    pub fn read(row: &Row) -> rusqlite::Result<Self> {
        Ok(TaskRow {
            id: row.get(0)?,
            stage_id: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            description: row.get(4)?,
            task_type: row.get(5)?,
            sort_order: row.get(6)?,
            is_required: row.get(7)?,
            is_active: row.get(8)?,
            due_days_offset: row.get(9)?,
            email_template_id: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    pub fn from_model(task: &TaskDefinition) -> Self {
        TaskRow {
            id: task.id,
            stage_id: task.stage_id,
            name: task.name.clone(),
            display_name: task.display_name.clone(),
            description: task.description.clone(),
            task_type: task.task_kind.as_str().to_string(),
            sort_order: task.sort_order,
            is_required: flag(task.is_required),
            is_active: flag(task.is_active),
            due_days_offset: task.due_offset_days,
            email_template_id: task.email_template_id.clone(),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }

    pub fn into_model(self) -> Result<TaskDefinition, RowError> {
        let task_kind = TaskKind::from_str(&self.task_type)
            .ok_or_else(|| unknown("task_type", &self.task_type))?;
        Ok(TaskDefinition {
            id: self.id,
            stage_id: self.stage_id,
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            task_kind,
            sort_order: self.sort_order,
            is_required: self.is_required != 0,
            is_active: self.is_active != 0,
            due_offset_days: self.due_days_offset,
            email_template_id: self.email_template_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row of the `stage_statuses` table
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub id: Option<i64>,
    pub stage_id: i64,
    pub status_value: String,
    pub display_name: String,
    pub status_category: String,
    pub color_scheme: String,
    pub sort_order: i64,
    pub is_active: i64,
    pub is_final: i64,
}

impl StatusRow {
    pub const COLUMNS: &'static str = "id, stage_id, status_value, display_name, status_category, \
        color_scheme, sort_order, is_active, is_final";

    pub fn read(row: &Row) -> rusqlite::Result<Self> {
        Ok(StatusRow {
            id: Some(row.get(0)?),
            stage_id: row.get(1)?,
            status_value: row.get(2)?,
            display_name: row.get(3)?,
            status_category: row.get(4)?,
            color_scheme: row.get(5)?,
            sort_order: row.get(6)?,
            is_active: row.get(7)?,
            is_final: row.get(8)?,
        })
    }

    pub fn from_model(status: &StatusDefinition) -> Self {
        StatusRow {
            id: status.id,
            stage_id: status.stage_id,
            status_value: status.status_value.clone(),
            display_name: status.display_name.clone(),
            status_category: status.category.as_str().to_string(),
            color_scheme: status.color_scheme.as_str().to_string(),
            sort_order: status.sort_order,
            is_active: flag(status.is_active),
            is_final: flag(status.is_final),
        }
    }

    pub fn into_model(self) -> Result<StatusDefinition, RowError> {
        let category = StatusCategory::from_str(&self.status_category)
            .ok_or_else(|| unknown("status_category", &self.status_category))?;
        let color_scheme = ColorScheme::from_str(&self.color_scheme)
            .ok_or_else(|| unknown("color_scheme", &self.color_scheme))?;
        Ok(StatusDefinition {
            id: self.id,
            stage_id: self.stage_id,
            status_value: self.status_value,
            display_name: self.display_name,
            category,
            color_scheme,
            sort_order: self.sort_order,
            is_active: self.is_active != 0,
            is_final: self.is_final != 0,
        })
    }
}
