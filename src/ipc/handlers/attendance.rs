use crate::ipc::helpers::{
    commit, get_date, get_required_str, require_workspace, respond, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::AttendanceStatus;
use serde_json::json;

fn attendance_get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let date = get_date(params, "date")?;
    Ok(json!({
        "date": date,
        "statuses": state.store.attendance_for_date(date),
    }))
}

fn attendance_set(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let date = get_date(params, "date")?;
    let student_id = get_required_str(params, "studentId")?;
    let raw = get_required_str(params, "status")?;
    let Some(status) = AttendanceStatus::parse(&raw) else {
        return Err(HandlerErr {
            code: "bad_params",
            message: "status must be one of: none, present, absent, late".to_string(),
            details: Some(json!({ "status": raw })),
        });
    };
    let ops = state.store.set_attendance(date, &student_id, status);
    commit(state, ops)?;
    Ok(json!({ "ok": true, "status": status }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.get" => attendance_get(state, &req.params),
        "attendance.set" => attendance_set(state, &req.params),
        _ => return None,
    };
    Some(respond(req, result))
}
