use std::collections::HashMap;
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use rusqlite::Connection;
use crate::cli::abbrev;
use crate::cli::error::{parse_sort_pairs, user_error, validate_id, validate_position};
use crate::cli::output::{
    format_integrity_report, format_stage_detail, format_stage_table, format_status_table,
    format_summary, format_task_table, get_terminal_width, is_tty,
};
use crate::cli::parser::{
    parse_stage_create, parse_stage_update, parse_status_create, parse_status_update,
    parse_task_create, parse_task_update, FieldParseError,
};
use crate::config::Config;
use crate::db::DbConnection;
use crate::error::ConfigError;
use crate::models::{CreateStageInput, SortUpdate, Stage};
use crate::registry::{StageRegistry, StatusRegistry, TaskRegistry};
use crate::summary::{compute_status, export_configuration, get_summary, perform_integrity_check, write_export};
use crate::templates::DEFAULT_PIPELINE;
use crate::utils::fuzzy;
use crate::validation::{validate_status_entries, validate_statuses};

#[derive(Parser)]
#[command(name = "senko")]
#[command(about = "Selection process configuration ledger - stages, task checklists and outcome statuses")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Selection stage commands
    Stages {
        #[command(subcommand)]
        subcommand: StageCommands,
    },
    /// Stage task checklist commands
    Tasks {
        #[command(subcommand)]
        subcommand: TaskCommands,
    },
    /// Stage outcome status commands
    Statuses {
        #[command(subcommand)]
        subcommand: StatusCommands,
    },
    /// Show configuration counts, score and recommendations
    Summary {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Run the integrity check over all stages (exit 1 when invalid)
    Check {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Export the configuration as system_config_<date>.json
    Export {
        /// Target directory (defaults to export.dir from the rc file, then the current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Print the document instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Seed the default selection pipeline into an empty store
    Init,
}

#[derive(Subcommand)]
pub enum StageCommands {
    /// List stages in pipeline order
    List {
        /// Include inactive stages
        #[arg(long)]
        all: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show a stage with its tasks and statuses
    Show {
        /// Stage ID or name
        stage: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Create a stage (e.g. name=first_interview display=一次面接 group=interview)
    Add {
        /// Field tokens: name, display, description, group, sort, color, icon, duration, session, formats
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Modify stage fields
    Modify {
        /// Stage ID or name
        stage: String,
        /// Field tokens (field=value; an empty value clears optional fields)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Deactivate a stage (it is kept for history)
    Delete {
        /// Stage ID or name
        stage: String,
    },
    /// Reactivate a deleted stage
    Restore {
        /// Stage ID or name
        stage: String,
    },
    /// Set sort orders in one step (e.g. briefing=1 offer=6)
    Reorder {
        /// <stage>=<order> pairs
        #[arg(required = true)]
        pairs: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List task definitions
    List {
        /// Only tasks of this stage (ID or name)
        stage: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Add a task to a stage (e.g. name=send_guide display=案内送付 kind=email)
    Add {
        /// Stage ID or name
        stage: String,
        /// Field tokens: name, display, description, kind, sort, required, due, email_template
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Modify task fields
    Modify {
        /// Task ID
        task_id: String,
        /// Field tokens (field=value)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Permanently delete a task definition
    Delete {
        /// Task ID
        task_id: String,
    },
    /// Set sort orders in one step (e.g. 4=1 7=2)
    Reorder {
        /// <task id>=<order> pairs
        #[arg(required = true)]
        pairs: Vec<String>,
    },
    /// Append a built-in checklist to a stage
    Template {
        /// Stage ID or name
        stage: String,
        /// document_screening, aptitude_test, interview, final_interview, briefing or offer
        key: String,
    },
}

#[derive(Subcommand)]
pub enum StatusCommands {
    /// List statuses of one stage or all stages
    List {
        /// Stage ID or name
        stage: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Add a status (e.g. value=pending category=pending display=保留)
    Add {
        /// Stage ID or name
        stage: String,
        /// Field tokens: value, display, category, color, active, final
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Modify a status
    Modify {
        /// Stage ID or name
        stage: String,
        /// Status value
        value: String,
        /// Field tokens (field=value)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Remove a status
    Remove {
        /// Stage ID or name
        stage: String,
        /// Status value
        value: String,
    },
    /// Move a status to a position (1 = first)
    Move {
        /// Stage ID or name
        stage: String,
        /// Status value
        value: String,
        /// New position
        position: String,
    },
    /// Replace a stage's statuses with a built-in set
    Template {
        /// Stage ID or name
        stage: String,
        /// basic, interview, document or event
        name: String,
    },
    /// Check a stage's saved statuses without changing them
    Validate {
        /// Stage ID or name
        stage: String,
    },
}

pub fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    // Expand command abbreviations before clap sees them
    let args = match abbrev::expand_command_abbreviations(args) {
        Ok(expanded) => expanded,
        Err(e) => user_error(&e),
    };

    let clap_args = std::iter::once("senko".to_string())
        .chain(args)
        .collect::<Vec<_>>();
    let cli = match Cli::try_parse_from(clap_args) {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed
            e.print()?;
            if e.use_stderr() {
                std::process::exit(1);
            }
            return Ok(());
        }
    };

    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Stages { subcommand } => handle_stages(subcommand),
        Commands::Tasks { subcommand } => handle_tasks(subcommand),
        Commands::Statuses { subcommand } => handle_statuses(subcommand),
        Commands::Summary { json } => handle_summary(json),
        Commands::Check { json } => handle_check(json),
        Commands::Export { dir, stdout } => handle_export(dir, stdout),
        Commands::Init => handle_init(),
    }
}

fn connect() -> Result<Connection> {
    DbConnection::connect().context("Failed to connect to database")
}

/// Unwrap field parsing or exit with the parse message
fn fields<T>(parsed: std::result::Result<T, FieldParseError>) -> T {
    parsed.unwrap_or_else(|e| user_error(&e.to_string()))
}

/// Generate the not-found message for a stage name, with near matches
fn stage_not_found_error(registry: &StageRegistry<'_>, name: &str) -> ! {
    let names: Vec<&str> = registry.list_stages().iter().map(|s| s.name.as_str()).collect();
    let matches = fuzzy::find_near_matches(name, &names, 3);

    if matches.is_empty() {
        user_error(&format!("Stage '{}' not found. To list stages: senko stages list --all", name));
    } else {
        let match_names: Vec<String> = matches.iter().map(|(name, _)| format!("'{}'", name)).collect();
        user_error(&format!("Stage '{}' not found. Did you mean {}?", name, match_names.join(", ")));
    }
}

/// Look up a stage by ID or by name
fn resolve_stage<'r>(registry: &'r StageRegistry<'_>, token: &str) -> Result<&'r Stage> {
    if let Ok(id) = token.parse::<i64>() {
        return Ok(registry.get_stage(id)?);
    }
    match registry.find_by_name(token) {
        Some(stage) => Ok(stage),
        None => stage_not_found_error(registry, token),
    }
}

fn count_by_stage(stage_ids: impl Iterator<Item = i64>) -> HashMap<i64, usize> {
    let mut counts = HashMap::new();
    for id in stage_ids {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

fn handle_stages(cmd: StageCommands) -> Result<()> {
    let conn = connect()?;
    let mut registry = StageRegistry::load(&conn)?;

    match cmd {
        StageCommands::List { all, json } => {
            let stages: Vec<&Stage> = if all {
                registry.list_stages().iter().collect()
            } else {
                registry.list_active_stages()
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&stages)?);
                return Ok(());
            }

            let tasks = TaskRegistry::load(&conn)?;
            let task_counts = count_by_stage(tasks.list_tasks(None).iter().map(|t| t.stage_id));
            let statuses = StatusRegistry::new(&conn).list_statuses(None)?;
            let status_counts = count_by_stage(statuses.iter().map(|s| s.stage_id));
            print!(
                "{}",
                format_stage_table(&stages, &task_counts, &status_counts, get_terminal_width(), is_tty())
            );
            Ok(())
        }
        StageCommands::Show { stage, json } => {
            let stage = resolve_stage(&registry, &stage)?;
            let tasks = TaskRegistry::load(&conn)?;
            let stage_tasks = tasks.list_tasks(Some(stage.id));
            let statuses = StatusRegistry::new(&conn).list_statuses(Some(stage.id))?;

            if json {
                let value = serde_json::json!({
                    "stage": stage,
                    "tasks": stage_tasks,
                    "statuses": statuses,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print!(
                    "{}",
                    format_stage_detail(stage, &stage_tasks, &statuses, get_terminal_width(), is_tty())
                );
            }
            Ok(())
        }
        StageCommands::Add { args } => {
            if args.is_empty() {
                user_error("Stage fields are required, e.g. name=first_interview display=一次面接");
            }
            let input = fields(parse_stage_create(&args));
            let stage = registry.create_stage(input)?;
            println!("Created stage '{}' (id: {})", stage.name, stage.id);
            Ok(())
        }
        StageCommands::Modify { stage, args } => {
            let id = resolve_stage(&registry, &stage)?.id;
            let input = fields(parse_stage_update(&args));
            if input.is_empty() {
                user_error("No modifications given. Use field=value, e.g. display=一次面接");
            }
            let stage = registry.update_stage(id, input)?;
            println!("Modified stage '{}' (id: {})", stage.name, stage.id);
            Ok(())
        }
        StageCommands::Delete { stage } => {
            let (id, name, was_active) = {
                let stage = resolve_stage(&registry, &stage)?;
                (stage.id, stage.name.clone(), stage.is_active)
            };
            registry.delete_stage(id)?;
            if was_active {
                println!("Deactivated stage '{}' (id: {})", name, id);
            } else {
                println!("Stage '{}' (id: {}) is already inactive", name, id);
            }
            Ok(())
        }
        StageCommands::Restore { stage } => {
            let id = resolve_stage(&registry, &stage)?.id;
            let stage = registry.restore_stage(id)?;
            println!("Restored stage '{}' (id: {})", stage.name, stage.id);
            Ok(())
        }
        StageCommands::Reorder { pairs } => {
            let pairs = parse_sort_pairs(&pairs, "Stage").unwrap_or_else(|e| user_error(&e));
            let mut updates = Vec::with_capacity(pairs.len());
            for (key, sort_order) in pairs {
                let id = resolve_stage(&registry, &key)?.id;
                updates.push(SortUpdate { id, sort_order });
            }
            registry.reorder_stages(&updates)?;
            println!("Reordered {} stage(s)", updates.len());
            Ok(())
        }
    }
}

fn handle_tasks(cmd: TaskCommands) -> Result<()> {
    let conn = connect()?;
    let stages = StageRegistry::load(&conn)?;
    let mut registry = TaskRegistry::load(&conn)?;

    match cmd {
        TaskCommands::List { stage, json } => {
            let stage_id = match stage {
                Some(token) => Some(resolve_stage(&stages, &token)?.id),
                None => None,
            };
            let tasks = registry.list_tasks(stage_id);

            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
                return Ok(());
            }
            let stage_names: HashMap<i64, String> = stages
                .list_stages()
                .iter()
                .map(|s| (s.id, s.name.clone()))
                .collect();
            print!("{}", format_task_table(&tasks, &stage_names, get_terminal_width(), is_tty()));
            Ok(())
        }
        TaskCommands::Add { stage, args } => {
            let stage = resolve_stage(&stages, &stage)?;
            if args.is_empty() {
                user_error("Task fields are required, e.g. name=send_guide display=案内送付");
            }
            let input = fields(parse_task_create(stage.id, &args));
            let task = registry.create_task(input)?;
            println!("Created task '{}' (id: {}) in stage '{}'", task.name, task.id, stage.name);
            Ok(())
        }
        TaskCommands::Modify { task_id, args } => {
            let id = validate_id(&task_id, "Task").unwrap_or_else(|e| user_error(&e));
            if args.is_empty() {
                user_error("No modifications given. Use field=value, e.g. required=yes");
            }
            let input = fields(parse_task_update(&args));
            let task = registry.update_task(id, input)?;
            println!("Modified task '{}' (id: {})", task.name, task.id);
            Ok(())
        }
        TaskCommands::Delete { task_id } => {
            let id = validate_id(&task_id, "Task").unwrap_or_else(|e| user_error(&e));
            let name = registry.get_task(id)?.name.clone();
            registry.delete_task(id)?;
            println!("Deleted task '{}' (id: {})", name, id);
            Ok(())
        }
        TaskCommands::Reorder { pairs } => {
            let pairs = parse_sort_pairs(&pairs, "Task").unwrap_or_else(|e| user_error(&e));
            let updates = pairs
                .into_iter()
                .map(|(key, sort_order)| {
                    let id = validate_id(&key, "Task").unwrap_or_else(|e| user_error(&e));
                    SortUpdate { id, sort_order }
                })
                .collect::<Vec<_>>();
            registry.reorder_tasks(&updates)?;
            println!("Reordered {} task(s)", updates.len());
            Ok(())
        }
        TaskCommands::Template { stage, key } => {
            let stage = resolve_stage(&stages, &stage)?;
            let created = registry.apply_task_template(stage.id, &key)?;
            if created.is_empty() {
                println!("All tasks from template '{}' already exist in stage '{}'", key, stage.name);
            } else {
                println!(
                    "Added {} task(s) from template '{}' to stage '{}'",
                    created.len(),
                    key,
                    stage.name
                );
            }
            Ok(())
        }
    }
}

/// Index of `value` in the loaded working copy, or exit listing what exists
fn status_index(registry: &StatusRegistry<'_>, stage: &Stage, value: &str) -> usize {
    let Some(working) = registry.working_copy() else {
        user_error(&format!("No statuses loaded for stage '{}'", stage.name));
    };
    if let Some(index) = working.position_of(value) {
        return index;
    }
    let existing: Vec<&str> = working.statuses().iter().map(|s| s.status_value.as_str()).collect();
    if existing.is_empty() {
        user_error(&format!("Stage '{}' has no statuses. To start from a template: senko statuses template {} basic", stage.name, stage.name));
    }
    user_error(&format!(
        "Status '{}' not found in stage '{}'. Existing: {}",
        value,
        stage.name,
        existing.join(", ")
    ));
}

fn handle_statuses(cmd: StatusCommands) -> Result<()> {
    let conn = connect()?;
    let stages = StageRegistry::load(&conn)?;
    let mut registry = StatusRegistry::new(&conn);
    let width = get_terminal_width();
    let tty = is_tty();

    match cmd {
        StatusCommands::List { stage: Some(token), json } => {
            let stage = resolve_stage(&stages, &token)?;
            let statuses = registry.list_statuses(Some(stage.id))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                print!("{}", format_status_table(&statuses, width, tty));
            }
            Ok(())
        }
        StatusCommands::List { stage: None, json } => {
            let statuses = registry.list_statuses(None)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
                return Ok(());
            }
            for (i, stage) in stages.list_active_stages().into_iter().enumerate() {
                let own: Vec<_> = statuses.iter().filter(|s| s.stage_id == stage.id).cloned().collect();
                if i > 0 {
                    println!();
                }
                println!("{} ({})", stage.display_name, stage.name);
                print!("{}", format_status_table(&own, width, tty));
            }
            Ok(())
        }
        StatusCommands::Add { stage, args } => {
            let stage = resolve_stage(&stages, &stage)?;
            if args.is_empty() {
                user_error("Status fields are required, e.g. value=pending category=pending");
            }
            let status = fields(parse_status_create(stage.id, &args));
            let value = status.status_value.clone();
            registry.load_working_copy(stage.id)?;
            registry.add_to_working_copy(status)?;
            let saved = registry.save_working_copy()?;
            println!("Added status '{}' to stage '{}' ({} status(es))", value, stage.name, saved.len());
            Ok(())
        }
        StatusCommands::Modify { stage, value, args } => {
            let stage = resolve_stage(&stages, &stage)?;
            if args.is_empty() {
                user_error("No modifications given. Use field=value, e.g. display=通過");
            }
            let input = fields(parse_status_update(&args));
            registry.load_working_copy(stage.id)?;
            let index = status_index(&registry, stage, &value);
            registry.update_in_working_copy(index, input)?;
            if !registry.has_unsaved_changes() {
                println!("Status '{}' in stage '{}' is unchanged", value, stage.name);
                return Ok(());
            }
            registry.save_working_copy()?;
            println!("Modified status '{}' in stage '{}'", value, stage.name);
            Ok(())
        }
        StatusCommands::Remove { stage, value } => {
            let stage = resolve_stage(&stages, &stage)?;
            registry.load_working_copy(stage.id)?;
            let index = status_index(&registry, stage, &value);
            let removed = registry.remove_from_working_copy(index)?;
            registry.save_working_copy()?;
            println!("Removed status '{}' from stage '{}'", removed.status_value, stage.name);
            Ok(())
        }
        StatusCommands::Move { stage, value, position } => {
            let stage = resolve_stage(&stages, &stage)?;
            let to = validate_position(&position).unwrap_or_else(|e| user_error(&e));
            registry.load_working_copy(stage.id)?;
            let from = status_index(&registry, stage, &value);
            registry.reorder_working_copy(from, to)?;
            registry.save_working_copy()?;
            println!("Moved status '{}' to position {} in stage '{}'", value, to + 1, stage.name);
            Ok(())
        }
        StatusCommands::Template { stage, name } => {
            let stage = resolve_stage(&stages, &stage)?;
            registry.load_working_copy(stage.id)?;
            registry.apply_template(&name)?;
            if !registry.has_unsaved_changes() {
                println!("Stage '{}' already uses status template '{}'", stage.name, name);
                return Ok(());
            }
            let saved = registry.save_working_copy()?;
            println!(
                "Applied status template '{}' to stage '{}' ({} status(es))",
                name,
                stage.name,
                saved.len()
            );
            Ok(())
        }
        StatusCommands::Validate { stage } => {
            let stage = resolve_stage(&stages, &stage)?;
            let statuses = registry.list_statuses(Some(stage.id))?;
            let errors = if stage.requires_session {
                validate_statuses(&statuses)
            } else {
                validate_status_entries(&statuses)
            };
            ConfigError::check(errors)?;
            println!("Statuses for stage '{}' are valid ({} status(es))", stage.name, statuses.len());
            Ok(())
        }
    }
}

fn handle_summary(json: bool) -> Result<()> {
    let conn = connect()?;
    let summary = get_summary(&conn)?;
    let status = compute_status(&summary);

    if json {
        let value = serde_json::json!({
            "summary": summary,
            "status": status,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", format_summary(&summary, &status, is_tty()));
    }
    Ok(())
}

fn handle_check(json: bool) -> Result<()> {
    let conn = connect()?;
    let report = perform_integrity_check(&conn)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_integrity_report(&report, is_tty()));
    }
    if !report.is_valid {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_export(dir: Option<PathBuf>, stdout: bool) -> Result<()> {
    let conn = connect()?;
    let doc = export_configuration(&conn)?;

    if stdout {
        println!("{}", doc.to_json()?);
        return Ok(());
    }

    let dir = match dir {
        Some(dir) => dir,
        None => Config::load()?.export_dir(),
    };
    let path = write_export(&dir, &doc)
        .with_context(|| format!("Failed to write export to {}", dir.display()))?;
    println!("Exported configuration to {}", path.display());
    Ok(())
}

/// Seed `DEFAULT_PIPELINE`; returns (stages, tasks, statuses) created
fn seed_default_pipeline(conn: &Connection) -> Result<(usize, usize, usize)> {
    let mut stages = StageRegistry::load(conn)?;
    let mut tasks = TaskRegistry::load(conn)?;
    let mut statuses = StatusRegistry::new(conn);
    let (mut task_count, mut status_count) = (0, 0);

    for preset in DEFAULT_PIPELINE {
        let stage = stages.create_stage(CreateStageInput {
            stage_group: preset.group,
            estimated_duration_minutes: Some(preset.duration_minutes),
            requires_session: Some(preset.requires_session),
            session_formats: Some(preset.formats.to_vec()),
            ..CreateStageInput::new(preset.name, preset.display_name)
        })?;
        task_count += tasks.apply_task_template(stage.id, preset.task_template)?.len();

        if let Some(template) = preset.status_template {
            statuses.load_working_copy(stage.id)?;
            statuses.apply_template(template)?;
            status_count += statuses.save_working_copy()?.len();
        }
        log::debug!("Seeded stage '{}'", stage.name);
    }
    Ok((DEFAULT_PIPELINE.len(), task_count, status_count))
}

fn handle_init() -> Result<()> {
    let conn = connect()?;
    let existing = StageRegistry::load(&conn)?.list_stages().len();
    if existing > 0 {
        user_error(&format!(
            "Stage configuration already exists ({} stage(s)). init only seeds an empty store.",
            existing
        ));
    }

    let (stages, tasks, statuses) = seed_default_pipeline(&conn)?;
    println!(
        "Initialized default pipeline: {} stages, {} tasks, {} statuses",
        stages, tasks, statuses
    );
    Ok(())
}
