// End-to-end tests for the senko command line
// Each test runs the binary against a fresh temporary HOME

use acceptance_framework::*;
use predicates::prelude::*;

// ============================================================================
// init / summary / check / export
// ============================================================================

#[test]
fn e2e_init_seeds_default_pipeline() {
    let ctx = AcceptanceTestContext::new();
    let mut when = WhenBuilder::new(&ctx);
    when.execute_success(&["init"]);

    let then = ThenBuilder::new(&ctx, when.result());
    then.stdout_contains("Initialized default pipeline: 6 stages, 20 tasks, 22 statuses")
        .active_stage_order_is(&[
            "briefing",
            "document_screening",
            "aptitude_test",
            "first_interview",
            "final_interview",
            "offer",
        ])
        .task_count_is("first_interview", 4)
        .status_values_are("offer", &["passed", "failed", "declined"]);

    // A second init refuses to touch existing configuration
    let mut when = WhenBuilder::new(&ctx);
    when.execute(&["init"]);
    ThenBuilder::new(&ctx, when.result())
        .exit_code_is(1)
        .stderr_contains("already exists");
}

#[test]
fn e2e_summary_after_init() {
    let ctx = AcceptanceTestContext::new();
    let mut when = WhenBuilder::new(&ctx);
    when.execute_success(&["init"]);
    when.execute_success(&["summary"]);

    ThenBuilder::new(&ctx, when.result())
        .stdout_contains("Stages:        6 (6 active)")
        .stdout_contains("Score:         100/100 (configured)");

    when.execute_success(&["summary", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&when.stdout()).unwrap();
    assert_eq!(value["summary"]["total_tasks"], 20);
    assert_eq!(value["status"]["is_configured"], true);
}

#[test]
fn e2e_summary_on_empty_store_recommends_next_steps() {
    let ctx = AcceptanceTestContext::new();
    ctx.cmd().args(["summary"]).assert()
        .success()
        .stdout(predicate::str::contains("Score:         0/100 (incomplete)"))
        .stdout(predicate::str::contains("senko init"));
}

#[test]
fn e2e_check_exit_codes() {
    let ctx = AcceptanceTestContext::new();
    ctx.cmd().args(["check"]).assert()
        .code(1)
        .stdout(predicate::str::contains("Configuration has 1 error(s)."))
        .stdout(predicate::str::contains("No active stages are configured"));

    ctx.cmd().args(["init"]).assert().success();
    ctx.cmd().args(["check"]).assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid."));

    let output = ctx.cmd().args(["check", "--json"]).output().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["is_valid"], true);
}

#[test]
fn e2e_export_writes_dated_file() {
    let ctx = AcceptanceTestContext::new();
    ctx.cmd().args(["init"]).assert().success();

    let out_dir = ctx.temp_dir().path().join("exports");
    ctx.cmd().args(["export", "--dir", out_dir.to_str().unwrap()]).assert()
        .success()
        .stdout(predicate::str::contains("Exported configuration to"));

    let files: Vec<_> = std::fs::read_dir(&out_dir).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("system_config_") && name.ends_with(".json"), "{}", name);

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(value["system_version"], "1.0.0");
    assert_eq!(value["data"]["selection_stages"].as_array().unwrap().len(), 6);
}

#[test]
fn e2e_export_to_stdout() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    given.stage_exists("entry", "Entry");

    let output = ctx.cmd().args(["export", "--stdout"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["data"]["selection_stages"][0]["name"], "entry");
    assert_eq!(value["data"]["summary"]["active_stages"], 1);
}

// ============================================================================
// stages
// ============================================================================

#[test]
fn e2e_stage_lifecycle() {
    let ctx = AcceptanceTestContext::new();
    let mut when = WhenBuilder::new(&ctx);

    when.execute_success(&["stages", "add", "name=entry", "display=エントリー", "group=screening", "session=no"]);
    ThenBuilder::new(&ctx, when.result()).stdout_contains("Created stage 'entry'");
    let stage = ctx.stage("entry");
    assert!(!stage.requires_session);
    assert_eq!(stage.stage_group.as_str(), "Screening");

    when.execute_success(&["stages", "modify", "entry", "duration=15", "description=Web entry"]);
    let stage = ctx.stage("entry");
    assert_eq!(stage.estimated_duration_minutes, 15);
    assert_eq!(stage.description.as_deref(), Some("Web entry"));

    when.execute_success(&["stages", "delete", "entry"]);
    ThenBuilder::new(&ctx, when.result())
        .stdout_contains("Deactivated stage 'entry'")
        .stage_is_active("entry", false);

    // Deleting again is fine
    when.execute_success(&["stages", "delete", "entry"]);
    ThenBuilder::new(&ctx, when.result()).stdout_contains("already inactive");

    when.execute_success(&["stages", "list"]);
    ThenBuilder::new(&ctx, when.result()).stdout_contains("No stages found.");

    when.execute_success(&["stages", "restore", &stage.id.to_string()]);
    ThenBuilder::new(&ctx, when.result())
        .stdout_contains("Restored stage 'entry'")
        .stage_is_active("entry", true);
}

#[test]
fn e2e_stage_duplicate_name_rejected() {
    let ctx = AcceptanceTestContext::new();
    GivenBuilder::new(&ctx).stage_exists("entry", "Entry");

    ctx.cmd().args(["stages", "add", "name=entry", "display=Again"]).assert()
        .code(1)
        .stderr(predicate::str::contains("Duplicate stage name 'entry'"));
}

#[test]
fn e2e_stage_reorder() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    given.stage_exists("a", "A");
    given.stage_exists("b", "B");
    given.stage_exists("c", "C");

    let mut when = WhenBuilder::new(&ctx);
    when.execute_success(&["stages", "reorder", "c=1", "a=2", "b=3"]);
    ThenBuilder::new(&ctx, when.result())
        .stdout_contains("Reordered 3 stage(s)")
        .active_stage_order_is(&["c", "a", "b"]);

    // An unknown stage applies nothing
    when.execute(&["stages", "reorder", "a=9", "zzz=1"]);
    ThenBuilder::new(&ctx, when.result())
        .exit_code_is(1)
        .active_stage_order_is(&["c", "a", "b"]);
}

#[test]
fn e2e_stage_show_json() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let id = given.stage_exists("first_interview", "一次面接");
    given.task_exists(id, "schedule");
    given.statuses_from_template(id, "basic");

    let output = ctx.cmd().args(["stages", "show", "first_interview", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["stage"]["display_name"], "一次面接");
    assert_eq!(value["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(value["statuses"].as_array().unwrap().len(), 3);

    ctx.cmd().args(["stages", "show", id.to_string().as_str()]).assert()
        .success()
        .stdout(predicate::str::contains("Tasks (1):"))
        .stdout(predicate::str::contains("Statuses (3):"));
}

// ============================================================================
// tasks
// ============================================================================

#[test]
fn e2e_task_commands() {
    let ctx = AcceptanceTestContext::new();
    let stage_id = GivenBuilder::new(&ctx).stage_exists("first_interview", "一次面接");
    let mut when = WhenBuilder::new(&ctx);

    when.execute_success(&["tasks", "add", "first_interview", "name=prep", "display=準備", "kind=document", "due=2"]);
    ThenBuilder::new(&ctx, when.result())
        .stdout_contains("Created task 'prep'")
        .task_count_is("first_interview", 1);
    let task = ctx.tasks(stage_id).remove(0);
    assert_eq!(task.due_offset_days, Some(2));

    when.execute_success(&["tasks", "modify", &task.id.to_string(), "required=yes", "due=none"]);
    let task = ctx.tasks(stage_id).remove(0);
    assert!(task.is_required);
    assert_eq!(task.due_offset_days, None);

    when.execute_success(&["tasks", "template", "first_interview", "interview"]);
    ThenBuilder::new(&ctx, when.result())
        .stdout_contains("Added 4 task(s)")
        .task_count_is("first_interview", 5);

    when.execute_success(&["tasks", "template", "first_interview", "interview"]);
    ThenBuilder::new(&ctx, when.result()).stdout_contains("already exist");

    when.execute_success(&["tasks", "delete", &task.id.to_string()]);
    ThenBuilder::new(&ctx, when.result())
        .stdout_contains(&format!("Deleted task 'prep' (id: {})", task.id))
        .task_count_is("first_interview", 4);

    when.execute(&["tasks", "delete", &task.id.to_string()]);
    ThenBuilder::new(&ctx, when.result())
        .exit_code_is(1)
        .stderr_contains("not found");
}

#[test]
fn e2e_task_name_unique_per_stage() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let first = given.stage_exists("first", "First");
    given.stage_exists("second", "Second");
    given.task_exists(first, "schedule");

    ctx.cmd().args(["tasks", "add", "second", "name=schedule", "display=日程調整"]).assert().success();
    ctx.cmd().args(["tasks", "add", "first", "name=schedule", "display=日程調整"]).assert()
        .code(1)
        .stderr(predicate::str::contains("Duplicate task name"));
}

#[test]
fn e2e_task_reorder() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let stage_id = given.stage_exists("first", "First");
    let a = given.task_exists(stage_id, "a");
    let b = given.task_exists(stage_id, "b");

    let (first, second) = (format!("{}=2", a), format!("{}=1", b));
    ctx.cmd().args(["tasks", "reorder", first.as_str(), second.as_str()]).assert()
        .success()
        .stdout(predicate::str::contains("Reordered 2 task(s)"));
    let names: Vec<String> = ctx.tasks(stage_id).into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["b", "a"]);
}

// ============================================================================
// statuses
// ============================================================================

#[test]
fn e2e_status_template_and_edits() {
    let ctx = AcceptanceTestContext::new();
    GivenBuilder::new(&ctx).stage_exists("first_interview", "一次面接");
    let mut when = WhenBuilder::new(&ctx);

    when.execute_success(&["statuses", "template", "first_interview", "interview"]);
    ThenBuilder::new(&ctx, when.result())
        .stdout_contains("(6 status(es))")
        .status_values_are(
            "first_interview",
            &["passed", "failed", "pending", "cancelled", "declined", "no_show"],
        );

    when.execute_success(&["statuses", "move", "first_interview", "pending", "1"]);
    ThenBuilder::new(&ctx, when.result()).status_values_are(
        "first_interview",
        &["pending", "passed", "failed", "cancelled", "declined", "no_show"],
    );

    when.execute_success(&["statuses", "remove", "first_interview", "no_show"]);
    when.execute_success(&["statuses", "add", "first_interview", "value=on_hold", "category=pending"]);
    when.execute_success(&["statuses", "modify", "first_interview", "on_hold", "display=検討中"]);
    ThenBuilder::new(&ctx, when.result()).status_values_are(
        "first_interview",
        &["pending", "passed", "failed", "cancelled", "declined", "on_hold"],
    );
    let stage = ctx.stage("first_interview");
    let on_hold = ctx.statuses(stage.id).pop().unwrap();
    assert_eq!(on_hold.display_name, "検討中");

    when.execute_success(&["statuses", "validate", "first_interview"]);
    ThenBuilder::new(&ctx, when.result()).stdout_contains("are valid");
}

#[test]
fn e2e_status_commit_rejected_keeps_store() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let id = given.stage_exists("first_interview", "一次面接");
    given.statuses_from_template(id, "basic");

    // Removing the only passing status would leave an incomplete set
    let mut when = WhenBuilder::new(&ctx);
    when.execute(&["statuses", "remove", "first_interview", "passed"]);
    ThenBuilder::new(&ctx, when.result())
        .exit_code_is(1)
        .stderr_contains("Validation failed")
        .status_values_are("first_interview", &["passed", "failed", "declined"]);
}

#[test]
fn e2e_status_add_to_fresh_interview_stage_needs_complete_set() {
    let ctx = AcceptanceTestContext::new();
    GivenBuilder::new(&ctx).stage_exists("first_interview", "一次面接");

    ctx.cmd().args(["statuses", "add", "first_interview", "value=passed", "category=passed"]).assert()
        .code(1)
        .stderr(predicate::str::contains("不通過/辞退"));
}

#[test]
fn e2e_status_add_to_sessionless_stage() {
    let ctx = AcceptanceTestContext::new();
    GivenBuilder::new(&ctx).sessionless_stage_exists("aptitude_test", "適性検査");

    ctx.cmd().args(["statuses", "add", "aptitude_test", "value=taken", "category=pending"]).assert()
        .success()
        .stdout(predicate::str::contains("Added status 'taken'"));
    let stage = ctx.stage("aptitude_test");
    let statuses = ctx.statuses(stage.id);
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].display_name, "保留");
}

#[test]
fn e2e_status_validate_reports_incomplete_set() {
    let ctx = AcceptanceTestContext::new();
    GivenBuilder::new(&ctx).stage_exists("first_interview", "一次面接");

    ctx.cmd().args(["statuses", "validate", "first_interview"]).assert()
        .code(1)
        .stderr(predicate::str::contains("At least one status is required"));
}

#[test]
fn e2e_status_unknown_value_lists_existing() {
    let ctx = AcceptanceTestContext::new();
    let given = GivenBuilder::new(&ctx);
    let id = given.stage_exists("offer", "内定");
    given.statuses_from_template(id, "basic");

    ctx.cmd().args(["statuses", "remove", "offer", "maybe"]).assert()
        .code(1)
        .stderr(predicate::str::contains("Existing: passed, failed, declined"));
}

// ============================================================================
// abbreviations and help
// ============================================================================

#[test]
fn e2e_command_abbreviations() {
    let ctx = AcceptanceTestContext::new();
    GivenBuilder::new(&ctx).stage_exists("entry", "エントリー");

    ctx.cmd().args(["stag", "l"]).assert()
        .success()
        .stdout(predicate::str::contains("entry"));
    ctx.cmd().args(["su"]).assert()
        .success()
        .stdout(predicate::str::contains("Configuration Summary"));
    ctx.cmd().args(["st", "list"]).assert()
        .code(1)
        .stderr(predicate::str::contains("Ambiguous command 'st'"));
}

#[test]
fn e2e_no_arguments_prints_help() {
    let ctx = AcceptanceTestContext::new();
    ctx.cmd().assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
    ctx.cmd().args(["--version"]).assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
