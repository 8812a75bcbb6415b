use serde::{Deserialize, Serialize};
use super::ColorScheme;

/// Outcome category of a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    Passed,
    Failed,
    Pending,
    Declined,
    Cancelled,
}

impl StatusCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Passed => "passed",
            StatusCategory::Failed => "failed",
            StatusCategory::Pending => "pending",
            StatusCategory::Declined => "declined",
            StatusCategory::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "passed" => Some(StatusCategory::Passed),
            "failed" => Some(StatusCategory::Failed),
            "pending" => Some(StatusCategory::Pending),
            "declined" => Some(StatusCategory::Declined),
            "cancelled" | "canceled" => Some(StatusCategory::Cancelled),
            _ => None,
        }
    }

    /// Label shown to HR staff
    pub fn label(&self) -> &'static str {
        match self {
            StatusCategory::Passed => "通過",
            StatusCategory::Failed => "不通過",
            StatusCategory::Pending => "保留",
            StatusCategory::Declined => "辞退",
            StatusCategory::Cancelled => "キャンセル",
        }
    }

    pub fn default_color(&self) -> ColorScheme {
        match self {
            StatusCategory::Passed => ColorScheme::Green,
            StatusCategory::Failed => ColorScheme::Red,
            StatusCategory::Pending => ColorScheme::Yellow,
            StatusCategory::Declined => ColorScheme::Gray,
            StatusCategory::Cancelled => ColorScheme::Gray,
        }
    }

    /// Whether the candidate leaves the pipeline with this outcome
    pub fn ends_progression(&self) -> bool {
        matches!(self, Self::Failed | Self::Declined | Self::Cancelled)
    }
}

/// Status definition model
///
/// `id` is `None` for entries that exist only in a working copy and have
/// not been committed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDefinition {
    pub id: Option<i64>,
    pub stage_id: i64,
    pub status_value: String,
    pub display_name: String,
    pub category: StatusCategory,
    pub color_scheme: ColorScheme,
    pub sort_order: i64,
    pub is_active: bool,
    /// No further stage progression once this status is set
    pub is_final: bool,
}

impl StatusDefinition {
    pub fn new(stage_id: i64, status_value: &str, display_name: &str, category: StatusCategory) -> Self {
        Self {
            id: None,
            stage_id,
            status_value: status_value.to_string(),
            display_name: display_name.to_string(),
            category,
            color_scheme: category.default_color(),
            sort_order: 0,
            is_active: true,
            is_final: category.ends_progression(),
        }
    }
}

/// Partial edit of a working-copy entry
#[derive(Debug, Clone, Default)]
pub struct UpdateStatusInput {
    pub status_value: Option<String>,
    pub display_name: Option<String>,
    pub category: Option<StatusCategory>,
    pub color_scheme: Option<ColorScheme>,
    pub is_active: Option<bool>,
    pub is_final: Option<bool>,
}

impl UpdateStatusInput {
    pub fn apply_to(self, status: &mut StatusDefinition) {
        if let Some(value) = self.status_value {
            status.status_value = value.trim().to_string();
        }
        if let Some(display_name) = self.display_name {
            status.display_name = display_name.trim().to_string();
        }
        if let Some(category) = self.category {
            status.category = category;
        }
        if let Some(color) = self.color_scheme {
            status.color_scheme = color;
        }
        if let Some(active) = self.is_active {
            status.is_active = active;
        }
        if let Some(is_final) = self.is_final {
            status.is_final = is_final;
        }
    }
}
