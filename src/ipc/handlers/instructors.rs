use crate::ipc::helpers::{
    commit, get_payload, get_required_str, get_weekday, require_workspace, respond, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Instructor;
use crate::schedule::lookup_slot;
use serde_json::json;
use uuid::Uuid;

fn instructors_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    Ok(json!({ "instructors": state.store.instructors }))
}

fn instructors_create(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let mut raw = params
        .get("instructor")
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing instructor"))?;
    if !raw.is_object() {
        return Err(HandlerErr::bad_params("instructor must be an object"));
    }
    if raw.get("id").and_then(|v| v.as_str()).map_or(true, |s| s.trim().is_empty()) {
        raw["id"] = json!(format!("inst-{}", Uuid::new_v4()));
    }
    let instructor: Instructor = get_payload(&json!({ "instructor": raw }), "instructor")?;
    if instructor.name.trim().is_empty() {
        return Err(HandlerErr::bad_params("instructor name must not be empty"));
    }
    let id = instructor.id.clone();
    let ops = state.store.add_instructor(instructor)?;
    commit(state, ops)?;
    Ok(json!({ "instructor": state.store.instructor(&id) }))
}

fn instructors_update(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let instructor: Instructor = get_payload(params, "instructor")?;
    let id = instructor.id.clone();
    let ops = state.store.update_instructor(instructor)?;
    commit(state, ops)?;
    Ok(json!({ "instructor": state.store.instructor(&id) }))
}

fn instructors_delete(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let id = get_required_str(params, "instructorId")?;
    let ops = state.store.delete_instructor(&id)?;
    commit(state, ops)?;
    Ok(json!({ "ok": true }))
}

fn instructors_assign_slot(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let id = get_required_str(params, "instructorId")?;
    let slot_id = get_required_str(params, "slotId")?;
    // `day` defaults to the weekday encoded in the slot id.
    let day = match params.get("day") {
        Some(_) => get_weekday(params, "day")?,
        None => lookup_slot(&slot_id)
            .map(|(day, _)| day)
            .ok_or_else(|| HandlerErr::bad_params(format!("unknown slot: {slot_id}")))?,
    };
    let (instructor, ops) = state.store.assign_instructor_slot(&id, day, &slot_id)?;
    let changed = !ops.is_empty();
    if changed {
        commit(state, ops)?;
    }
    Ok(json!({ "instructor": instructor, "changed": changed }))
}

fn instructors_remove_slot(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let id = get_required_str(params, "instructorId")?;
    let index = params
        .get("index")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| HandlerErr::bad_params("missing index"))?;
    let (instructor, ops) = state.store.remove_instructor_slot(&id, index as usize)?;
    commit(state, ops)?;
    Ok(json!({ "instructor": instructor }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "instructors.list" => instructors_list(state),
        "instructors.create" => instructors_create(state, p),
        "instructors.update" => instructors_update(state, p),
        "instructors.delete" => instructors_delete(state, p),
        "instructors.assignSlot" => instructors_assign_slot(state, p),
        "instructors.removeSlot" => instructors_remove_slot(state, p),
        _ => return None,
    };
    Some(respond(req, result))
}
