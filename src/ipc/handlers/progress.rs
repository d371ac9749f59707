use crate::ipc::helpers::{
    commit, get_optional_str, get_payload, get_required_str, now_rfc3339, require_workspace,
    respond, today, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::SkillStatus;
use crate::progress::{self, QualityKey, StudentProgress};
use crate::schedule;
use crate::store::{ConditioningInput, PhysicalInput};
use chrono::NaiveDate;
use serde_json::json;

/// Form values arrive as numbers or numeric strings.
fn get_measure(params: &serde_json::Value, key: &str) -> Result<f64, HandlerErr> {
    let value = match params.get(key) {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| HandlerErr::bad_params(format!("{key} must be a number")))
}

fn get_count(params: &serde_json::Value, key: &str) -> Result<u32, HandlerErr> {
    let value = match params.get(key) {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    value.ok_or_else(|| HandlerErr::bad_params(format!("{key} must be a whole number")))
}

/// `date` param when given, else today.
fn assessment_date(params: &serde_json::Value) -> Result<NaiveDate, HandlerErr> {
    match get_optional_str(params, "date") {
        Some(raw) => Ok(schedule::parse_date(&raw)?),
        None => today(params),
    }
}

fn progress_overview(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    Ok(json!(progress::progress_overview(&state.store.students)))
}

fn progress_get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let id = get_required_str(params, "studentId")?;
    let Some(student) = state.store.student(&id) else {
        return Err(HandlerErr::new("not_found", format!("student not found: {id}")));
    };
    let skills = if student.skill_achievements.is_empty() {
        progress::default_skill_achievements()
    } else {
        student.skill_achievements.clone()
    };
    Ok(json!({
        "summary": StudentProgress::of(student),
        "physicalAssessments": student.physical_assessments,
        "conditioningTests": student.conditioning_tests,
        "skills": skills,
    }))
}

fn progress_add_physical(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let input = PhysicalInput {
        weight: get_measure(params, "weight")?,
        height: get_measure(params, "height")?,
        waist_circumference: get_measure(params, "waistCircumference")?,
    };
    let date = assessment_date(params)?;
    let (assessment, ops) = state.store.add_physical_assessment(&student_id, input, date)?;
    commit(state, ops)?;
    Ok(json!({ "assessment": assessment }))
}

fn progress_add_conditioning(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let input = ConditioningInput {
        push_ups: get_count(params, "pushUps")?,
        pull_ups: get_count(params, "pullUps")?,
        sit_ups: get_count(params, "sitUps")?,
        vertical_jump: get_measure(params, "verticalJump")?,
        horizontal_jump: get_measure(params, "horizontalJump")?,
    };
    let date = assessment_date(params)?;
    let (test, ops) = state.store.add_conditioning_test(&student_id, input, date)?;
    commit(state, ops)?;
    Ok(json!({ "test": test }))
}

fn progress_set_skill_status(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let skill_id = get_required_str(params, "skillId")?;
    let status: SkillStatus = get_payload(params, "status")?;
    let (skill, ops) = state
        .store
        .set_skill_status(&student_id, &skill_id, status, &now_rfc3339())?;
    commit(state, ops)?;
    Ok(json!({ "skill": skill }))
}

fn progress_toggle_quality(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let skill_id = get_required_str(params, "skillId")?;
    let key: QualityKey = get_payload(params, "quality")?;
    let (skill, ops) = state
        .store
        .toggle_skill_quality(&student_id, &skill_id, key, &now_rfc3339())?;
    commit(state, ops)?;
    Ok(json!({ "skill": skill }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "progress.overview" => progress_overview(state),
        "progress.get" => progress_get(state, p),
        "progress.skills" => Ok(json!({ "skills": progress::default_skill_achievements() })),
        "progress.addPhysicalAssessment" => progress_add_physical(state, p),
        "progress.addConditioningTest" => progress_add_conditioning(state, p),
        "progress.setSkillStatus" => progress_set_skill_status(state, p),
        "progress.toggleSkillQuality" => progress_toggle_quality(state, p),
        _ => return None,
    };
    Some(respond(req, result))
}
