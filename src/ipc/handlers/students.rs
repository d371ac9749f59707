use crate::ipc::helpers::{
    commit, get_optional_str, get_payload, get_required_str, require_workspace, respond,
    HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Student, StudentStatus};
use serde_json::json;
use uuid::Uuid;

fn students_list(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let status: Option<StudentStatus> = match params.get("status") {
        Some(v) if !v.is_null() => Some(get_payload(params, "status")?),
        _ => None,
    };
    let search = get_optional_str(params, "search").map(|q| q.to_lowercase());
    let students: Vec<&Student> = state
        .store
        .students
        .iter()
        .filter(|s| status.map_or(true, |st| s.status == st))
        .filter(|s| match &search {
            Some(q) => s.name.to_lowercase().contains(q.as_str()),
            None => true,
        })
        .collect();
    Ok(json!({ "students": students }))
}

fn students_get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let id = get_required_str(params, "studentId")?;
    match state.store.student(&id) {
        Some(s) => Ok(json!({ "student": s })),
        None => Err(HandlerErr::new("not_found", format!("student not found: {id}"))),
    }
}

fn students_create(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let mut raw = params
        .get("student")
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing student"))?;
    if !raw.is_object() {
        return Err(HandlerErr::bad_params("student must be an object"));
    }
    // Id is optional on create.
    if raw.get("id").and_then(|v| v.as_str()).map_or(true, |s| s.trim().is_empty()) {
        raw["id"] = json!(format!("stu-{}", Uuid::new_v4()));
    }
    let student: Student = get_payload(&json!({ "student": raw }), "student")?;
    if student.name.trim().is_empty() {
        return Err(HandlerErr::bad_params("student name must not be empty"));
    }
    let ops = state.store.add_student(student.clone())?;
    commit(state, ops)?;
    Ok(json!({ "student": student }))
}

fn students_update(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let student: Student = get_payload(params, "student")?;
    let ops = state.store.update_student(student.clone())?;
    commit(state, ops)?;
    Ok(json!({ "student": student }))
}

fn students_delete(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let id = get_required_str(params, "studentId")?;
    let ops = state.store.delete_student(&id)?;
    commit(state, ops)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "students.list" => students_list(state, p),
        "students.get" => students_get(state, p),
        "students.create" => students_create(state, p),
        "students.update" => students_update(state, p),
        "students.delete" => students_delete(state, p),
        _ => return None,
    };
    Some(respond(req, result))
}
