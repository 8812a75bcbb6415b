// Output formatting utilities

use std::collections::HashMap;
use std::io::IsTerminal;
use chrono::{Local, TimeZone};
use crate::models::{ColorScheme, Stage, StatusDefinition, TaskDefinition};
use crate::summary::{ConfigurationStatus, IntegrityReport, Summary};

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_YELLOW: &str = "\x1b[33m";
const ANSI_FG_BLUE: &str = "\x1b[34m";
const ANSI_FG_MAGENTA: &str = "\x1b[35m";
const ANSI_FG_BRIGHT_BLACK: &str = "\x1b[90m";
const ANSI_FG_ORANGE: &str = "\x1b[38;5;208m";

/// Map a stage or status color to its ANSI foreground code
fn color_scheme_to_fg(color: ColorScheme) -> &'static str {
    match color {
        ColorScheme::Blue => ANSI_FG_BLUE,
        ColorScheme::Green => ANSI_FG_GREEN,
        ColorScheme::Yellow => ANSI_FG_YELLOW,
        ColorScheme::Orange => ANSI_FG_ORANGE,
        ColorScheme::Red => ANSI_FG_RED,
        ColorScheme::Purple => ANSI_FG_MAGENTA,
        ColorScheme::Gray => ANSI_FG_BRIGHT_BLACK,
    }
}

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, falling back to the COLUMNS environment
/// variable and then to 120.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

fn colorize(text: &str, color: ColorScheme, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", color_scheme_to_fg(color), text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Format timestamp for display
pub fn format_timestamp(ts: i64) -> String {
    Local.timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6)
}

/// Terminal cell width; CJK characters take two cells
pub fn display_width(text: &str) -> usize {
    text.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

/// Cut `text` to at most `width` cells, marking the cut with ".."
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    if width <= 2 {
        return ".".repeat(width);
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = if is_wide(c) { 2 } else { 1 };
        if used + w > width - 2 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str("..");
    out
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{}{}", text, " ".repeat(fill))
}

struct Column {
    label: &'static str,
    min_width: usize,
    /// Shrinks to fit the terminal
    flexible: bool,
}

const fn col(label: &'static str, min_width: usize, flexible: bool) -> Column {
    Column { label, min_width, flexible }
}

/// A cell with an optional color applied after padding
struct Cell {
    text: String,
    color: Option<ColorScheme>,
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell { text, color: None }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell { text: text.to_string(), color: None }
    }
}

fn colored(text: impl Into<String>, color: ColorScheme) -> Cell {
    Cell { text: text.into(), color: Some(color) }
}

/// Lay out a table within `max_width` cells
fn render_table(columns: &[Column], rows: &[Vec<Cell>], max_width: usize, is_tty: bool) -> String {
    let mut widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|r| display_width(&r[i].text))
                .chain(std::iter::once(display_width(c.label)))
                .max()
                .unwrap_or(0)
        })
        .collect();

    // One space between columns
    let total = |widths: &[usize]| widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
    let mut overflow = total(&widths).saturating_sub(max_width);
    for (i, column) in columns.iter().enumerate() {
        if overflow == 0 {
            break;
        }
        if column.flexible {
            let room = widths[i].saturating_sub(column.min_width);
            let cut = room.min(overflow);
            widths[i] -= cut;
            overflow -= cut;
        }
    }

    let mut output = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| pad(&truncate_to_width(c.label, *w), *w))
        .collect();
    output.push_str(bold_if_tty(header.join(" ").trim_end(), is_tty).as_str());
    output.push('\n');
    output.push_str(&"-".repeat(total(&widths)));
    output.push('\n');

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| {
                let text = pad(&truncate_to_width(&cell.text, *w), *w);
                match cell.color {
                    Some(color) => colorize(&text, color, is_tty),
                    None => text,
                }
            })
            .collect();
        output.push_str(line.join(" ").trim_end());
        output.push('\n');
    }
    output
}

/// Stage list with per-stage task and status counts
pub fn format_stage_table(
    stages: &[&Stage],
    task_counts: &HashMap<i64, usize>,
    status_counts: &HashMap<i64, usize>,
    max_width: usize,
    is_tty: bool,
) -> String {
    if stages.is_empty() {
        return "No stages found.\n".to_string();
    }
    let columns = [
        col("ID", 2, false),
        col("Sort", 4, false),
        col("Name", 8, true),
        col("Display", 8, true),
        col("Group", 5, false),
        col("Min", 3, false),
        col("Session", 7, false),
        col("Formats", 7, true),
        col("Tasks", 5, false),
        col("Statuses", 8, false),
        col("State", 5, false),
    ];
    let rows: Vec<Vec<Cell>> = stages
        .iter()
        .map(|s| {
            let formats: Vec<&str> = s.session_formats.iter().map(|f| f.as_str()).collect();
            vec![
                s.id.to_string().into(),
                s.sort_order.to_string().into(),
                s.name.as_str().into(),
                colored(s.display_name.as_str(), s.color_scheme),
                s.stage_group.as_str().into(),
                s.estimated_duration_minutes.to_string().into(),
                yes_no(s.requires_session).into(),
                formats.join(",").into(),
                task_counts.get(&s.id).copied().unwrap_or(0).to_string().into(),
                status_counts.get(&s.id).copied().unwrap_or(0).to_string().into(),
                if s.is_active { "active".into() } else { colored("inactive", ColorScheme::Gray) },
            ]
        })
        .collect();
    render_table(&columns, &rows, max_width, is_tty)
}

pub fn format_task_table(
    tasks: &[&TaskDefinition],
    stage_names: &HashMap<i64, String>,
    max_width: usize,
    is_tty: bool,
) -> String {
    if tasks.is_empty() {
        return "No tasks found.\n".to_string();
    }
    let columns = [
        col("ID", 2, false),
        col("Stage", 5, true),
        col("Sort", 4, false),
        col("Name", 8, true),
        col("Display", 8, true),
        col("Kind", 4, false),
        col("Req", 3, false),
        col("Due", 3, false),
        col("Active", 6, false),
    ];
    let rows: Vec<Vec<Cell>> = tasks
        .iter()
        .map(|t| {
            let stage = stage_names
                .get(&t.stage_id)
                .cloned()
                .unwrap_or_else(|| format!("[{}]", t.stage_id));
            let due = t.due_offset_days.map(|d| format!("+{}d", d)).unwrap_or_default();
            vec![
                t.id.to_string().into(),
                stage.into(),
                t.sort_order.to_string().into(),
                t.name.as_str().into(),
                t.display_name.as_str().into(),
                t.task_kind.as_str().into(),
                yes_no(t.is_required).into(),
                due.into(),
                yes_no(t.is_active).into(),
            ]
        })
        .collect();
    render_table(&columns, &rows, max_width, is_tty)
}

pub fn format_status_table(statuses: &[StatusDefinition], max_width: usize, is_tty: bool) -> String {
    if statuses.is_empty() {
        return "No statuses defined.\n".to_string();
    }
    let columns = [
        col("#", 1, false),
        col("Value", 5, true),
        col("Display", 7, true),
        col("Category", 8, false),
        col("Final", 5, false),
        col("Active", 6, false),
    ];
    let rows: Vec<Vec<Cell>> = statuses
        .iter()
        .enumerate()
        .map(|(i, s)| {
            vec![
                (i + 1).to_string().into(),
                s.status_value.as_str().into(),
                colored(s.display_name.as_str(), s.color_scheme),
                format!("{} {}", s.category.as_str(), s.category.label()).into(),
                yes_no(s.is_final).into(),
                yes_no(s.is_active).into(),
            ]
        })
        .collect();
    render_table(&columns, &rows, max_width, is_tty)
}

/// Detailed view of one stage with its checklist and statuses
pub fn format_stage_detail(
    stage: &Stage,
    tasks: &[&TaskDefinition],
    statuses: &[StatusDefinition],
    max_width: usize,
    is_tty: bool,
) -> String {
    let mut output = String::new();

    let header = format!("Stage {}: {} ({})", stage.id, stage.display_name, stage.name);
    output.push_str(&bold_if_tty(&header, is_tty));
    output.push('\n');
    output.push_str(&"=".repeat(display_width(&header).max(60)));
    output.push_str("\n\n");

    if let Some(description) = &stage.description {
        output.push_str("Description:\n");
        output.push_str(&format!("  {}\n\n", description));
    }

    let formats: Vec<&str> = stage.session_formats.iter().map(|f| f.as_str()).collect();
    output.push_str("Attributes:\n");
    output.push_str(&format!("  Group:       {}\n", stage.stage_group.as_str()));
    output.push_str(&format!("  Sort order:  {}\n", stage.sort_order));
    output.push_str(&format!("  Active:      {}\n", yes_no(stage.is_active)));
    output.push_str(&format!("  Color:       {}\n", colorize(stage.color_scheme.as_str(), stage.color_scheme, is_tty)));
    output.push_str(&format!("  Icon:        {}\n", stage.icon.as_deref().unwrap_or("(none)")));
    output.push_str(&format!("  Duration:    {} min\n", stage.estimated_duration_minutes));
    output.push_str(&format!("  Session:     {}\n", yes_no(stage.requires_session)));
    if formats.is_empty() {
        output.push_str("  Formats:     (none)\n");
    } else {
        output.push_str(&format!("  Formats:     {}\n", formats.join(", ")));
    }
    output.push_str(&format!("  Created:     {}\n", format_timestamp(stage.created_at)));
    output.push_str(&format!("  Updated:     {}\n\n", format_timestamp(stage.updated_at)));

    output.push_str(&format!("Tasks ({}):\n", tasks.len()));
    if tasks.is_empty() {
        output.push_str("  (none)\n");
    }
    for task in tasks {
        let mut line = format!("  {}. {} ({}, {})", task.sort_order, task.display_name, task.name, task.task_kind.as_str());
        if task.is_required {
            line.push_str(" [required]");
        }
        if let Some(days) = task.due_offset_days {
            line.push_str(&format!(" due +{}d", days));
        }
        if !task.is_active {
            line.push_str(" [inactive]");
        }
        output.push_str(&truncate_to_width(&line, max_width));
        output.push('\n');
    }
    output.push('\n');

    output.push_str(&format!("Statuses ({}):\n", statuses.len()));
    if statuses.is_empty() {
        output.push_str("  (none)\n");
    }
    for status in statuses {
        let line = format!(
            "  {} = {} [{}]{}",
            status.status_value,
            status.display_name,
            status.category.label(),
            if status.is_final { " final" } else { "" }
        );
        output.push_str(&colorize(&truncate_to_width(&line, max_width), status.color_scheme, is_tty));
        output.push('\n');
    }
    output
}

/// Counts, score and advice
pub fn format_summary(summary: &Summary, status: &ConfigurationStatus, is_tty: bool) -> String {
    let mut output = String::new();
    output.push_str(&bold_if_tty("=== Configuration Summary ===", is_tty));
    output.push('\n');
    output.push_str(&format!("Stages:        {} ({} active)\n", summary.total_stages, summary.active_stages));
    output.push_str(&format!("Tasks:         {}\n", summary.total_tasks));
    output.push_str(&format!("Statuses:      {}\n", summary.total_statuses));
    output.push_str(&format!(
        "Last updated:  {}\n\n",
        format_timestamp(summary.last_updated.timestamp())
    ));

    let score_color = if status.is_configured {
        ColorScheme::Green
    } else if status.score > 0 {
        ColorScheme::Yellow
    } else {
        ColorScheme::Red
    };
    output.push_str(&format!(
        "Score:         {}/100 ({})\n",
        colorize(&status.score.to_string(), score_color, is_tty),
        if status.is_configured { "configured" } else { "incomplete" }
    ));

    if !status.issues.is_empty() {
        output.push_str("\nIssues:\n");
        for issue in &status.issues {
            output.push_str(&format!("  - {}\n", issue));
        }
    }
    if !status.recommendations.is_empty() {
        output.push_str("\nRecommendations:\n");
        for recommendation in &status.recommendations {
            output.push_str(&format!("  - {}\n", recommendation));
        }
    }
    output
}

pub fn format_integrity_report(report: &IntegrityReport, is_tty: bool) -> String {
    let mut output = String::new();
    if report.is_valid {
        output.push_str(&colorize("Configuration is valid.", ColorScheme::Green, is_tty));
    } else {
        output.push_str(&colorize(
            &format!("Configuration has {} error(s).", report.errors.len()),
            ColorScheme::Red,
            is_tty,
        ));
    }
    output.push('\n');

    if !report.errors.is_empty() {
        output.push_str("\nErrors:\n");
        for error in &report.errors {
            output.push_str(&format!("  - {}\n", error));
        }
    }
    if !report.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &report.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }
    output
}
