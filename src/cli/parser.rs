// CLI parsing utilities for `field=value` arguments

use crate::models::{
    ColorScheme, CreateStageInput, CreateTaskInput, SessionFormat, StageGroup, StatusCategory,
    StatusDefinition, TaskKind, UpdateStageInput, UpdateStatusInput, UpdateTaskInput,
};
use crate::utils::fuzzy::closest_match;

/// Field token error
#[derive(Debug, PartialEq, Eq)]
pub enum FieldParseError {
    InvalidFieldName {
        field: String,
        suggestion: String,
    },
    ReadOnlyField {
        field: String,
        hint: String,
    },
    UnknownFieldToken {
        token: String,
    },
    NotAFieldToken {
        token: String,
    },
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
    MissingField {
        field: String,
    },
}

impl std::fmt::Display for FieldParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldParseError::InvalidFieldName { field, suggestion } => {
                write!(f, "Unrecognized field name '{}'\n  Did you mean '{}'?", field, suggestion)
            }
            FieldParseError::ReadOnlyField { field, hint } => {
                write!(f, "Field '{}' cannot be modified directly.\n  {}", field, hint)
            }
            FieldParseError::UnknownFieldToken { token } => {
                write!(f, "Unrecognized field token '{}'", token)
            }
            FieldParseError::NotAFieldToken { token } => {
                write!(f, "Expected field=value, got '{}'\n  Quote values that contain spaces, e.g. display=\"一次 面接\".", token)
            }
            FieldParseError::InvalidValue { field, value, expected } => {
                write!(f, "Invalid value '{}' for {}. Expected {}.", value, field, expected)
            }
            FieldParseError::MissingField { field } => {
                write!(f, "Field '{}' is required", field)
            }
        }
    }
}

impl std::error::Error for FieldParseError {}

/// Fields accepted by `stages add`
pub const STAGE_FIELDS: &[&str] = &[
    "name",
    "display",
    "description",
    "group",
    "sort",
    "color",
    "icon",
    "duration",
    "session",
    "formats",
];

/// Fields accepted by `stages modify`
pub const STAGE_MODIFY_FIELDS: &[&str] = &[
    "name",
    "display",
    "description",
    "group",
    "sort",
    "color",
    "icon",
    "duration",
    "session",
    "formats",
    "active",
];

pub const TASK_FIELDS: &[&str] = &[
    "name",
    "display",
    "description",
    "kind",
    "sort",
    "required",
    "due",
    "email_template",
];

pub const TASK_MODIFY_FIELDS: &[&str] = &[
    "name",
    "display",
    "description",
    "kind",
    "sort",
    "required",
    "due",
    "email_template",
    "active",
];

pub const STATUS_FIELDS: &[&str] = &["value", "display", "category", "color", "active", "final"];

/// Fields that exist on records but are never set from the command line
const READ_ONLY_FIELDS: &[&str] = &["id", "created", "updated", "stage"];

fn read_only_hint(field: &str) -> String {
    match field.to_lowercase().as_str() {
        "id" => "IDs are assigned automatically and cannot be changed.".to_string(),
        "created" => "Created timestamp is set automatically and cannot be changed.".to_string(),
        "updated" => "Updated timestamp is maintained automatically.".to_string(),
        "stage" => "Tasks and statuses stay with the stage they were created in.".to_string(),
        _ => "This field is read-only.".to_string(),
    }
}

/// Split `field=value` tokens, checking every field against `allowed`.
///
/// An empty value (`field=`) is kept as an empty string; optional fields
/// treat it, like `none`, as "clear".
pub fn parse_field_tokens(args: &[String], allowed: &[&str]) -> Result<Vec<(String, String)>, FieldParseError> {
    let mut fields = Vec::new();
    for token in args {
        let (field, value) = token.split_once('=').ok_or_else(|| FieldParseError::NotAFieldToken {
            token: token.clone(),
        })?;
        let field = field.trim().to_lowercase();

        if READ_ONLY_FIELDS.contains(&field.as_str()) {
            return Err(FieldParseError::ReadOnlyField {
                hint: read_only_hint(&field),
                field,
            });
        }
        if allowed.contains(&field.as_str()) {
            fields.push((field, value.to_string()));
            continue;
        }
        return Err(match closest_match(&field, allowed, 3) {
            Some(suggestion) => FieldParseError::InvalidFieldName {
                field,
                suggestion: suggestion.to_string(),
            },
            None => FieldParseError::UnknownFieldToken { token: token.clone() },
        });
    }
    Ok(fields)
}

fn is_clear(value: &str) -> bool {
    value.trim().is_empty() || value.trim().eq_ignore_ascii_case("none")
}

fn optional_text(value: &str) -> Option<String> {
    if is_clear(value) {
        None
    } else {
        Some(value.trim().to_string())
    }
}

fn invalid(field: &str, value: &str, expected: impl Into<String>) -> FieldParseError {
    FieldParseError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.into(),
    }
}

pub fn parse_bool(field: &str, value: &str) -> Result<bool, FieldParseError> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "on" | "1" => Ok(true),
        "no" | "n" | "false" | "off" | "0" => Ok(false),
        _ => Err(invalid(field, value, "yes or no")),
    }
}

fn parse_int(field: &str, value: &str) -> Result<i64, FieldParseError> {
    value.trim().parse::<i64>().map_err(|_| invalid(field, value, "a whole number"))
}

fn parse_group(value: &str) -> Result<StageGroup, FieldParseError> {
    StageGroup::from_str(value.trim()).ok_or_else(|| {
        let names: Vec<&str> = StageGroup::ALL.iter().map(|g| g.as_str()).collect();
        invalid("group", value, format!("one of {}", names.join(", ")))
    })
}

fn parse_color(value: &str) -> Result<ColorScheme, FieldParseError> {
    ColorScheme::from_str(value.trim()).ok_or_else(|| {
        let names: Vec<&str> = ColorScheme::ALL.iter().map(|c| c.as_str()).collect();
        invalid("color", value, format!("one of {}", names.join(", ")))
    })
}

/// Comma-separated session formats; empty or `none` means no formats
pub fn parse_formats(value: &str) -> Result<Vec<SessionFormat>, FieldParseError> {
    if is_clear(value) {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|part| {
            SessionFormat::from_str(part.trim())
                .ok_or_else(|| invalid("formats", part, "in_person, online or hybrid"))
        })
        .collect()
}

fn parse_kind(value: &str) -> Result<TaskKind, FieldParseError> {
    TaskKind::from_str(value.trim())
        .ok_or_else(|| invalid("kind", value, "email, document, general, interview or evaluation"))
}

fn parse_category(value: &str) -> Result<StatusCategory, FieldParseError> {
    StatusCategory::from_str(value.trim())
        .ok_or_else(|| invalid("category", value, "passed, failed, pending, declined or cancelled"))
}

/// Parse `stages add` arguments; `name` and `display` are required
pub fn parse_stage_create(args: &[String]) -> Result<CreateStageInput, FieldParseError> {
    let mut input = CreateStageInput::default();
    let mut has_name = false;
    let mut has_display = false;

    for (field, value) in parse_field_tokens(args, STAGE_FIELDS)? {
        match field.as_str() {
            "name" => {
                input.name = value;
                has_name = true;
            }
            "display" => {
                input.display_name = value;
                has_display = true;
            }
            "description" => input.description = optional_text(&value),
            "group" => input.stage_group = parse_group(&value)?,
            "sort" => input.sort_order = Some(parse_int("sort", &value)?),
            "color" => input.color_scheme = Some(parse_color(&value)?),
            "icon" => input.icon = optional_text(&value),
            "duration" => input.estimated_duration_minutes = Some(parse_int("duration", &value)?),
            "session" => input.requires_session = Some(parse_bool("session", &value)?),
            "formats" => input.session_formats = Some(parse_formats(&value)?),
            _ => {}
        }
    }

    if !has_name {
        return Err(FieldParseError::MissingField { field: "name".to_string() });
    }
    if !has_display {
        return Err(FieldParseError::MissingField { field: "display".to_string() });
    }
    Ok(input)
}

/// Parse `stages modify` arguments into a partial update
pub fn parse_stage_update(args: &[String]) -> Result<UpdateStageInput, FieldParseError> {
    let mut input = UpdateStageInput::default();
    for (field, value) in parse_field_tokens(args, STAGE_MODIFY_FIELDS)? {
        match field.as_str() {
            "name" => input.name = Some(value),
            "display" => input.display_name = Some(value),
            "description" => input.description = Some(optional_text(&value)),
            "group" => input.stage_group = Some(parse_group(&value)?),
            "sort" => input.sort_order = Some(parse_int("sort", &value)?),
            "color" => input.color_scheme = Some(parse_color(&value)?),
            "icon" => input.icon = Some(optional_text(&value)),
            "duration" => input.estimated_duration_minutes = Some(parse_int("duration", &value)?),
            "session" => input.requires_session = Some(parse_bool("session", &value)?),
            "formats" => input.session_formats = Some(parse_formats(&value)?),
            "active" => input.is_active = Some(parse_bool("active", &value)?),
            _ => {}
        }
    }
    Ok(input)
}

fn parse_due(value: &str) -> Result<Option<i64>, FieldParseError> {
    if is_clear(value) {
        Ok(None)
    } else {
        parse_int("due", value).map(Some)
    }
}

/// Parse `tasks add` arguments for `stage_id`
pub fn parse_task_create(stage_id: i64, args: &[String]) -> Result<CreateTaskInput, FieldParseError> {
    let mut input = CreateTaskInput { stage_id, ..Default::default() };
    let mut has_name = false;
    let mut has_display = false;

    for (field, value) in parse_field_tokens(args, TASK_FIELDS)? {
        match field.as_str() {
            "name" => {
                input.name = value;
                has_name = true;
            }
            "display" => {
                input.display_name = value;
                has_display = true;
            }
            "description" => input.description = value,
            "kind" => input.task_kind = parse_kind(&value)?,
            "sort" => input.sort_order = Some(parse_int("sort", &value)?),
            "required" => input.is_required = parse_bool("required", &value)?,
            "due" => input.due_offset_days = parse_due(&value)?,
            "email_template" => input.email_template_id = optional_text(&value),
            _ => {}
        }
    }

    if !has_name {
        return Err(FieldParseError::MissingField { field: "name".to_string() });
    }
    if !has_display {
        return Err(FieldParseError::MissingField { field: "display".to_string() });
    }
    Ok(input)
}

pub fn parse_task_update(args: &[String]) -> Result<UpdateTaskInput, FieldParseError> {
    let mut input = UpdateTaskInput::default();
    for (field, value) in parse_field_tokens(args, TASK_MODIFY_FIELDS)? {
        match field.as_str() {
            "name" => input.name = Some(value),
            "display" => input.display_name = Some(value),
            "description" => input.description = Some(value),
            "kind" => input.task_kind = Some(parse_kind(&value)?),
            "sort" => input.sort_order = Some(parse_int("sort", &value)?),
            "required" => input.is_required = Some(parse_bool("required", &value)?),
            "due" => input.due_offset_days = Some(parse_due(&value)?),
            "email_template" => input.email_template_id = Some(optional_text(&value)),
            "active" => input.is_active = Some(parse_bool("active", &value)?),
            _ => {}
        }
    }
    Ok(input)
}

/// Parse status fields into a partial edit
pub fn parse_status_update(args: &[String]) -> Result<UpdateStatusInput, FieldParseError> {
    let mut input = UpdateStatusInput::default();
    for (field, value) in parse_field_tokens(args, STATUS_FIELDS)? {
        match field.as_str() {
            "value" => input.status_value = Some(value),
            "display" => input.display_name = Some(value),
            "category" => input.category = Some(parse_category(&value)?),
            "color" => input.color_scheme = Some(parse_color(&value)?),
            "active" => input.is_active = Some(parse_bool("active", &value)?),
            "final" => input.is_final = Some(parse_bool("final", &value)?),
            _ => {}
        }
    }
    Ok(input)
}

/// Build a new status for `statuses add`.
///
/// `value` and `category` are required; the display name defaults to the
/// category label and color/finality follow the category unless given.
pub fn parse_status_create(stage_id: i64, args: &[String]) -> Result<StatusDefinition, FieldParseError> {
    let input = parse_status_update(args)?;
    let value = input
        .status_value
        .clone()
        .ok_or_else(|| FieldParseError::MissingField { field: "value".to_string() })?;
    let category = input
        .category
        .ok_or_else(|| FieldParseError::MissingField { field: "category".to_string() })?;
    let display = input
        .display_name
        .clone()
        .unwrap_or_else(|| category.label().to_string());

    let mut status = StatusDefinition::new(stage_id, value.trim(), display.trim(), category);
    input.apply_to(&mut status);
    Ok(status)
}
