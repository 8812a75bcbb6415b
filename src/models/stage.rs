use serde::{Deserialize, Serialize};

/// Pipeline grouping for a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StageGroup {
    Screening,
    Event,
    Interview,
    Offer,
    #[default]
    Other,
}

impl StageGroup {
    pub const ALL: [StageGroup; 5] = [
        StageGroup::Screening,
        StageGroup::Event,
        StageGroup::Interview,
        StageGroup::Offer,
        StageGroup::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageGroup::Screening => "Screening",
            StageGroup::Event => "Event",
            StageGroup::Interview => "Interview",
            StageGroup::Offer => "Offer",
            StageGroup::Other => "Other",
        }
    }

    /// Case-insensitive parse
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|g| g.as_str().eq_ignore_ascii_case(s))
    }
}

/// Display color used by stages and statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
    Purple,
    Gray,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 7] = [
        ColorScheme::Blue,
        ColorScheme::Green,
        ColorScheme::Yellow,
        ColorScheme::Orange,
        ColorScheme::Red,
        ColorScheme::Purple,
        ColorScheme::Gray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Blue => "blue",
            ColorScheme::Green => "green",
            ColorScheme::Yellow => "yellow",
            ColorScheme::Orange => "orange",
            ColorScheme::Red => "red",
            ColorScheme::Purple => "purple",
            ColorScheme::Gray => "gray",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

/// How a stage session is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionFormat {
    InPerson,
    Online,
    Hybrid,
}

impl SessionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionFormat::InPerson => "in_person",
            SessionFormat::Online => "online",
            SessionFormat::Hybrid => "hybrid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "in_person" => Some(SessionFormat::InPerson),
            "online" => Some(SessionFormat::Online),
            "hybrid" => Some(SessionFormat::Hybrid),
            _ => None,
        }
    }
}

/// Drop repeated formats while keeping first-seen order
pub fn dedup_formats(formats: Vec<SessionFormat>) -> Vec<SessionFormat> {
    let mut out: Vec<SessionFormat> = Vec::with_capacity(formats.len());
    for f in formats {
        if !out.contains(&f) {
            out.push(f);
        }
    }
    out
}

/// Stage model
///
/// One step of a selection pipeline. Stages are never physically removed:
/// deletion clears `is_active` because tasks and statuses reference the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub stage_group: StageGroup,
    pub sort_order: i64,
    pub is_active: bool,
    pub color_scheme: ColorScheme,
    pub icon: Option<String>,
    pub estimated_duration_minutes: i64,
    pub requires_session: bool,
    pub session_formats: Vec<SessionFormat>,
    pub created_at: i64,
    pub updated_at: i64,
}

pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Input for creating a stage
#[derive(Debug, Clone, Default)]
pub struct CreateStageInput {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub stage_group: StageGroup,
    /// Appended after the last stage when omitted
    pub sort_order: Option<i64>,
    pub color_scheme: Option<ColorScheme>,
    pub icon: Option<String>,
    pub estimated_duration_minutes: Option<i64>,
    pub requires_session: Option<bool>,
    pub session_formats: Option<Vec<SessionFormat>>,
}

impl CreateStageInput {
    pub fn new(name: &str, display_name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            ..Default::default()
        }
    }

    /// Build an unsaved stage (id 0) from this input
    pub fn into_stage(self, sort_order: i64, now: i64) -> Stage {
        Stage {
            id: 0,
            name: self.name.trim().to_string(),
            display_name: self.display_name.trim().to_string(),
            description: self.description.filter(|d| !d.trim().is_empty()),
            stage_group: self.stage_group,
            sort_order: self.sort_order.unwrap_or(sort_order),
            is_active: true,
            color_scheme: self.color_scheme.unwrap_or_default(),
            icon: self.icon.filter(|i| !i.trim().is_empty()),
            estimated_duration_minutes: self
                .estimated_duration_minutes
                .unwrap_or(DEFAULT_DURATION_MINUTES),
            requires_session: self.requires_session.unwrap_or(true),
            session_formats: dedup_formats(
                self.session_formats.unwrap_or_else(|| vec![SessionFormat::Online]),
            ),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a stage; `None` leaves a field unchanged.
/// Nested options clear the field when set to `Some(None)`.
#[derive(Debug, Clone, Default)]
pub struct UpdateStageInput {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<Option<String>>,
    pub stage_group: Option<StageGroup>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
    pub color_scheme: Option<ColorScheme>,
    pub icon: Option<Option<String>>,
    pub estimated_duration_minutes: Option<i64>,
    pub requires_session: Option<bool>,
    pub session_formats: Option<Vec<SessionFormat>>,
}

impl UpdateStageInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.display_name.is_none()
            && self.description.is_none()
            && self.stage_group.is_none()
            && self.sort_order.is_none()
            && self.is_active.is_none()
            && self.color_scheme.is_none()
            && self.icon.is_none()
            && self.estimated_duration_minutes.is_none()
            && self.requires_session.is_none()
            && self.session_formats.is_none()
    }

    pub fn apply_to(self, stage: &mut Stage) {
        if let Some(name) = self.name {
            stage.name = name.trim().to_string();
        }
        if let Some(display_name) = self.display_name {
            stage.display_name = display_name.trim().to_string();
        }
        if let Some(description) = self.description {
            stage.description = description.filter(|d| !d.trim().is_empty());
        }
        if let Some(group) = self.stage_group {
            stage.stage_group = group;
        }
        if let Some(sort_order) = self.sort_order {
            stage.sort_order = sort_order;
        }
        if let Some(active) = self.is_active {
            stage.is_active = active;
        }
        if let Some(color) = self.color_scheme {
            stage.color_scheme = color;
        }
        if let Some(icon) = self.icon {
            stage.icon = icon.filter(|i| !i.trim().is_empty());
        }
        if let Some(minutes) = self.estimated_duration_minutes {
            stage.estimated_duration_minutes = minutes;
        }
        if let Some(requires) = self.requires_session {
            stage.requires_session = requires;
        }
        if let Some(formats) = self.session_formats {
            stage.session_formats = dedup_formats(formats);
        }
    }
}

/// New sort position for one entity in a bulk reorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortUpdate {
    pub id: i64,
    pub sort_order: i64,
}
