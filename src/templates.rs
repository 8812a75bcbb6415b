// Built-in presets: status sets, per-stage task checklists and the
// default pipeline used by `senko init`.

use crate::models::{SessionFormat, StageGroup, StatusCategory, StatusDefinition, TaskKind};

/// One entry of a status template
#[derive(Debug, Clone, Copy)]
pub struct StatusPreset {
    pub value: &'static str,
    pub display_name: &'static str,
    pub category: StatusCategory,
}

const fn preset(value: &'static str, display_name: &'static str, category: StatusCategory) -> StatusPreset {
    StatusPreset { value, display_name, category }
}

const BASIC_STATUSES: &[StatusPreset] = &[
    preset("passed", "通過", StatusCategory::Passed),
    preset("failed", "不通過", StatusCategory::Failed),
    preset("declined", "辞退", StatusCategory::Declined),
];

const INTERVIEW_STATUSES: &[StatusPreset] = &[
    preset("passed", "通過", StatusCategory::Passed),
    preset("failed", "不通過", StatusCategory::Failed),
    preset("pending", "保留", StatusCategory::Pending),
    preset("cancelled", "キャンセル", StatusCategory::Cancelled),
    preset("declined", "辞退", StatusCategory::Declined),
    preset("no_show", "欠席", StatusCategory::Cancelled),
];

const DOCUMENT_STATUSES: &[StatusPreset] = &[
    preset("passed", "書類通過", StatusCategory::Passed),
    preset("failed", "書類不通過", StatusCategory::Failed),
    preset("pending", "確認中", StatusCategory::Pending),
];

const EVENT_STATUSES: &[StatusPreset] = &[
    preset("attended", "参加", StatusCategory::Passed),
    preset("absent", "欠席", StatusCategory::Failed),
    preset("cancelled", "キャンセル", StatusCategory::Cancelled),
    preset("declined", "辞退", StatusCategory::Declined),
];

pub const STATUS_TEMPLATE_NAMES: &[&str] = &["basic", "interview", "document", "event"];

/// Look up a status template by name
pub fn status_template(name: &str) -> Option<&'static [StatusPreset]> {
    match name.to_lowercase().as_str() {
        "basic" => Some(BASIC_STATUSES),
        "interview" => Some(INTERVIEW_STATUSES),
        "document" => Some(DOCUMENT_STATUSES),
        "event" => Some(EVENT_STATUSES),
        _ => None,
    }
}

/// Materialize a status template for a stage, numbered from 1
pub fn build_statuses(stage_id: i64, presets: &[StatusPreset]) -> Vec<StatusDefinition> {
    presets
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut status = StatusDefinition::new(stage_id, p.value, p.display_name, p.category);
            status.sort_order = i as i64 + 1;
            status
        })
        .collect()
}

/// One entry of a task checklist template
#[derive(Debug, Clone, Copy)]
pub struct TaskPreset {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub kind: TaskKind,
    pub is_required: bool,
    pub due_offset_days: Option<i64>,
}

const DOCUMENT_SCREENING_TASKS: &[TaskPreset] = &[
    TaskPreset { name: "confirm_receipt", display_name: "書類受領確認", description: "Confirm the application documents arrived", kind: TaskKind::Email, is_required: true, due_offset_days: Some(1) },
    TaskPreset { name: "review_documents", display_name: "書類選考", description: "Review CV and entry sheet", kind: TaskKind::Document, is_required: true, due_offset_days: Some(7) },
    TaskPreset { name: "notify_result", display_name: "結果連絡", description: "Send the screening result", kind: TaskKind::Email, is_required: true, due_offset_days: Some(10) },
];

const APTITUDE_TEST_TASKS: &[TaskPreset] = &[
    TaskPreset { name: "send_test_guide", display_name: "受検案内送付", description: "Send test URL and deadline", kind: TaskKind::Email, is_required: true, due_offset_days: Some(0) },
    TaskPreset { name: "check_completion", display_name: "受検確認", description: "Check that the test was taken", kind: TaskKind::General, is_required: true, due_offset_days: Some(7) },
    TaskPreset { name: "evaluate_score", display_name: "結果評価", description: "Evaluate the score against the threshold", kind: TaskKind::Evaluation, is_required: true, due_offset_days: Some(9) },
];

const INTERVIEW_TASKS: &[TaskPreset] = &[
    TaskPreset { name: "schedule_interview", display_name: "日程調整", description: "Agree an interview slot", kind: TaskKind::Email, is_required: true, due_offset_days: Some(3) },
    TaskPreset { name: "send_confirmation", display_name: "確定連絡", description: "Send the confirmed time and location", kind: TaskKind::Email, is_required: true, due_offset_days: Some(5) },
    TaskPreset { name: "conduct_interview", display_name: "面接実施", description: "", kind: TaskKind::Interview, is_required: true, due_offset_days: None },
    TaskPreset { name: "submit_evaluation", display_name: "評価入力", description: "Interviewer submits the evaluation sheet", kind: TaskKind::Evaluation, is_required: true, due_offset_days: Some(1) },
];

const FINAL_INTERVIEW_TASKS: &[TaskPreset] = &[
    TaskPreset { name: "schedule_interview", display_name: "日程調整", description: "Agree a slot with the executive panel", kind: TaskKind::Email, is_required: true, due_offset_days: Some(3) },
    TaskPreset { name: "share_history", display_name: "選考履歴共有", description: "Share earlier evaluations with the panel", kind: TaskKind::Document, is_required: false, due_offset_days: Some(4) },
    TaskPreset { name: "conduct_interview", display_name: "最終面接実施", description: "", kind: TaskKind::Interview, is_required: true, due_offset_days: None },
    TaskPreset { name: "decide_offer", display_name: "内定判断", description: "Record the hiring decision", kind: TaskKind::Evaluation, is_required: true, due_offset_days: Some(2) },
];

const BRIEFING_TASKS: &[TaskPreset] = &[
    TaskPreset { name: "send_invitation", display_name: "案内送付", description: "Invite candidates to the briefing", kind: TaskKind::Email, is_required: true, due_offset_days: Some(0) },
    TaskPreset { name: "send_reminder", display_name: "リマインド送付", description: "Remind registered participants the day before", kind: TaskKind::Email, is_required: false, due_offset_days: None },
    TaskPreset { name: "record_attendance", display_name: "出欠記録", description: "", kind: TaskKind::General, is_required: true, due_offset_days: None },
];

const OFFER_TASKS: &[TaskPreset] = &[
    TaskPreset { name: "send_offer_letter", display_name: "内定通知送付", description: "", kind: TaskKind::Email, is_required: true, due_offset_days: Some(1) },
    TaskPreset { name: "collect_acceptance", display_name: "承諾書回収", description: "Collect the signed acceptance form", kind: TaskKind::Document, is_required: true, due_offset_days: Some(14) },
    TaskPreset { name: "follow_up", display_name: "フォロー面談", description: "", kind: TaskKind::Interview, is_required: false, due_offset_days: None },
];

pub const TASK_TEMPLATE_KEYS: &[&str] = &[
    "document_screening",
    "aptitude_test",
    "interview",
    "final_interview",
    "briefing",
    "offer",
];

/// Look up the task checklist for a stage archetype
pub fn task_template(key: &str) -> Option<&'static [TaskPreset]> {
    match key.to_lowercase().as_str() {
        "document_screening" => Some(DOCUMENT_SCREENING_TASKS),
        "aptitude_test" => Some(APTITUDE_TEST_TASKS),
        "interview" => Some(INTERVIEW_TASKS),
        "final_interview" => Some(FINAL_INTERVIEW_TASKS),
        "briefing" => Some(BRIEFING_TASKS),
        "offer" => Some(OFFER_TASKS),
        _ => None,
    }
}

/// A stage of the default pipeline
#[derive(Debug, Clone, Copy)]
pub struct StagePreset {
    pub name: &'static str,
    pub display_name: &'static str,
    pub group: StageGroup,
    pub duration_minutes: i64,
    pub requires_session: bool,
    pub formats: &'static [SessionFormat],
    pub task_template: &'static str,
    pub status_template: Option<&'static str>,
}

pub const DEFAULT_PIPELINE: &[StagePreset] = &[
    StagePreset { name: "briefing", display_name: "会社説明会", group: StageGroup::Event, duration_minutes: 90, requires_session: true, formats: &[SessionFormat::InPerson, SessionFormat::Online], task_template: "briefing", status_template: Some("event") },
    StagePreset { name: "document_screening", display_name: "書類選考", group: StageGroup::Screening, duration_minutes: 30, requires_session: false, formats: &[], task_template: "document_screening", status_template: Some("document") },
    StagePreset { name: "aptitude_test", display_name: "適性検査", group: StageGroup::Screening, duration_minutes: 60, requires_session: false, formats: &[], task_template: "aptitude_test", status_template: None },
    StagePreset { name: "first_interview", display_name: "一次面接", group: StageGroup::Interview, duration_minutes: 60, requires_session: true, formats: &[SessionFormat::Online], task_template: "interview", status_template: Some("interview") },
    StagePreset { name: "final_interview", display_name: "最終面接", group: StageGroup::Interview, duration_minutes: 60, requires_session: true, formats: &[SessionFormat::InPerson], task_template: "final_interview", status_template: Some("interview") },
    StagePreset { name: "offer", display_name: "内定", group: StageGroup::Offer, duration_minutes: 30, requires_session: false, formats: &[], task_template: "offer", status_template: Some("basic") },
];
