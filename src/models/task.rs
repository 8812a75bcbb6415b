use serde::{Deserialize, Serialize};

/// Kind of checklist item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Email,
    Document,
    #[default]
    General,
    Interview,
    Evaluation,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Email => "email",
            TaskKind::Document => "document",
            TaskKind::General => "general",
            TaskKind::Interview => "interview",
            TaskKind::Evaluation => "evaluation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "email" => Some(TaskKind::Email),
            "document" => Some(TaskKind::Document),
            "general" => Some(TaskKind::General),
            "interview" => Some(TaskKind::Interview),
            "evaluation" => Some(TaskKind::Evaluation),
            _ => None,
        }
    }
}

/// Task definition model
///
/// A checklist item owned by exactly one stage. Unlike stages, task
/// definitions are removed outright on delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: i64,
    pub stage_id: i64,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub task_kind: TaskKind,
    pub sort_order: i64,
    pub is_required: bool,
    pub is_active: bool,
    /// Days after stage entry the task is due
    pub due_offset_days: Option<i64>,
    pub email_template_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating a task definition
#[derive(Debug, Clone, Default)]
pub struct CreateTaskInput {
    pub stage_id: i64,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub task_kind: TaskKind,
    pub sort_order: Option<i64>,
    pub is_required: bool,
    pub due_offset_days: Option<i64>,
    pub email_template_id: Option<String>,
}

impl CreateTaskInput {
    pub fn new(stage_id: i64, name: &str, display_name: &str) -> Self {
        Self {
            stage_id,
            name: name.to_string(),
            display_name: display_name.to_string(),
            ..Default::default()
        }
    }

    pub fn into_task(self, sort_order: i64, now: i64) -> TaskDefinition {
        TaskDefinition {
            id: 0,
            stage_id: self.stage_id,
            name: self.name.trim().to_string(),
            display_name: self.display_name.trim().to_string(),
            description: self.description.trim().to_string(),
            task_kind: self.task_kind,
            sort_order: self.sort_order.unwrap_or(sort_order),
            is_required: self.is_required,
            is_active: true,
            due_offset_days: self.due_offset_days,
            email_template_id: self.email_template_id.filter(|t| !t.trim().is_empty()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a task definition
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskInput {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub task_kind: Option<TaskKind>,
    pub sort_order: Option<i64>,
    pub is_required: Option<bool>,
    pub is_active: Option<bool>,
    pub due_offset_days: Option<Option<i64>>,
    pub email_template_id: Option<Option<String>>,
}

impl UpdateTaskInput {
    pub fn apply_to(self, task: &mut TaskDefinition) {
        if let Some(name) = self.name {
            task.name = name.trim().to_string();
        }
        if let Some(display_name) = self.display_name {
            task.display_name = display_name.trim().to_string();
        }
        if let Some(description) = self.description {
            task.description = description.trim().to_string();
        }
        if let Some(kind) = self.task_kind {
            task.task_kind = kind;
        }
        if let Some(sort_order) = self.sort_order {
            task.sort_order = sort_order;
        }
        if let Some(required) = self.is_required {
            task.is_required = required;
        }
        if let Some(active) = self.is_active {
            task.is_active = active;
        }
        if let Some(offset) = self.due_offset_days {
            task.due_offset_days = offset;
        }
        if let Some(template) = self.email_template_id {
            task.email_template_id = template.filter(|t| !t.trim().is_empty());
        }
    }
}
