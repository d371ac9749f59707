//! Class schedule, per-date rosters and the roster drag-and-drop.

use crate::error::DomainError;
use crate::ipc::helpers::{
    commit, get_date, get_id_list, get_optional_str, get_required_str, get_weekday, now_rfc3339,
    rejected, require_workspace, respond, today, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::schedule::{
    find_slot, schedule_for_date, schedule_for_day, weekly_slot_count, WeekdayKey,
    CAPACITY_PER_CLASS,
};
use crate::store::{ordered_slot_ids, QuickAdd};
use crate::summary;
use chrono::NaiveDate;
use serde_json::json;
use tracing::debug;

fn require_slot_on(date: NaiveDate, slot_id: &str) -> Result<(), HandlerErr> {
    let day = WeekdayKey::for_date(date);
    if find_slot(day, slot_id).is_none() {
        return Err(DomainError::UnknownSlot {
            slot_id: slot_id.to_string(),
            day: day.to_string(),
        }
        .into());
    }
    Ok(())
}

fn schedule_day(params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let day = if params.get("date").is_some() {
        WeekdayKey::for_date(get_date(params, "date")?)
    } else {
        get_weekday(params, "day")?
    };
    Ok(json!({
        "day": day,
        "label": day.label(),
        "slots": schedule_for_day(day),
    }))
}

fn weekly_roster_get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let day = get_weekday(params, "day")?;
    let base = state.store.weekly_roster.get(&day);
    let slots: Vec<serde_json::Value> = schedule_for_day(day)
        .into_iter()
        .map(|slot| {
            let ids = base.and_then(|b| b.get(&slot.id)).cloned().unwrap_or_default();
            json!({ "slotId": slot.id, "time": slot.time, "ageGroup": slot.age_group, "studentIds": ids })
        })
        .collect();
    Ok(json!({ "day": day, "slots": slots }))
}

fn weekly_roster_set(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let day = get_weekday(params, "day")?;
    let slot_id = get_required_str(params, "slotId")?;
    let ids = get_id_list(params, "studentIds")?;
    state.store.set_weekly_roster(day, &slot_id, ids)?;
    commit(state, Vec::new())?;
    Ok(json!({ "ok": true }))
}

fn daily_get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let date = get_date(params, "date")?;
    let store = &state.store;
    let roster = store.assignments_for_date(date);
    let attendance = store.attendance_for_date(date);
    let notes = store.class_notes_for_date(date);

    let slots: Vec<serde_json::Value> = schedule_for_date(date)
        .into_iter()
        .map(|slot| {
            let ids = roster.get(&slot.id).cloned().unwrap_or_default();
            let students: Vec<serde_json::Value> = ids
                .iter()
                .map(|id| match store.student(id) {
                    Some(s) => json!({
                        "id": s.id,
                        "name": s.name,
                        "isTrial": s.is_trial,
                        "paymentStatus": s.payment_status,
                        "photoUrl": s.photo_url,
                    }),
                    None => json!({ "id": id, "name": null }),
                })
                .collect();
            json!({
                "slotId": slot.id,
                "time": slot.time,
                "ageGroup": slot.age_group,
                "studentIds": ids,
                "students": students,
                "count": ids.len(),
                "capacity": CAPACITY_PER_CLASS,
                "note": notes.get(&slot.id),
            })
        })
        .collect();

    Ok(json!({
        "date": date,
        "day": WeekdayKey::for_date(date),
        "hasOverride": store.has_override(date),
        "slotOrder": ordered_slot_ids(date, &roster),
        "slots": slots,
        "attendance": attendance,
        "summary": summary::daily_summary(store, date),
    }))
}

fn daily_set_assignment(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let date = get_date(params, "date")?;
    let slot_id = get_required_str(params, "slotId")?;
    let ids = get_id_list(params, "studentIds")?;
    require_slot_on(date, &slot_id)?;
    let ops = state.store.set_assignment(date, &slot_id, ids);
    commit(state, ops)?;
    Ok(json!({ "ok": true }))
}

fn daily_move_student(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let date = get_date(params, "date")?;
    let student_id = get_required_str(params, "studentId")?;
    let from = get_required_str(params, "fromSlotId")?;
    let to = get_required_str(params, "toSlotId")?;
    require_slot_on(date, &to)?;
    let ops = state.store.move_student(date, &student_id, &from, &to)?;
    commit(state, ops)?;
    Ok(json!({ "ok": true }))
}

fn daily_drag_start(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let active = get_required_str(params, "activeId")?;
    state.roster_drag.start(active);
    Ok(json!({ "activeId": state.roster_drag.active() }))
}

/// Resolves the drop against the date's roster. Unresolvable drops and full targets
/// come back as `applied: false` rather than errors.
fn daily_drag_end(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let date = get_date(params, "date")?;
    let session = state.roster_drag.finish();
    let Some(active) = get_optional_str(params, "activeId").or(session) else {
        return Ok(json!({ "applied": false, "reason": "no_active" }));
    };
    let over = get_optional_str(params, "overId");
    match state.store.apply_roster_drop(date, &active, over.as_deref()) {
        Ok((plan, ops)) => {
            commit(state, ops)?;
            Ok(json!({ "applied": true, "plan": plan }))
        }
        Err(reason) => {
            debug!(active = %active, over = ?over, reason = reason.as_str(), "roster drop ignored");
            Ok(rejected(reason))
        }
    }
}

fn daily_quick_add(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let date = get_date(params, "date")?;
    let slot_id = get_required_str(params, "slotId")?;
    let name = get_required_str(params, "name")?;
    let age = params
        .get("age")
        .and_then(|v| v.as_u64())
        .filter(|a| (1..=120).contains(a))
        .ok_or_else(|| HandlerErr::bad_params("age must be a number between 1 and 120"))?;
    let input = QuickAdd {
        name,
        age: age as u32,
        parent_contact: get_optional_str(params, "parentContact").unwrap_or_default(),
        is_trial: params.get("isTrial").and_then(|v| v.as_bool()).unwrap_or(false),
    };
    let as_of = today(params)?;
    let (student, ops) = state.store.quick_add_student(date, &slot_id, input, as_of)?;
    commit(state, ops)?;
    Ok(json!({ "student": student }))
}

fn daily_transfer(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let date = get_date(params, "date")?;
    let student_id = get_required_str(params, "studentId")?;
    let target_day = get_weekday(params, "targetDay")?;
    let target_slot = get_required_str(params, "targetSlotId")?;
    let (entry, ops) =
        state
            .store
            .transfer_student(date, &student_id, target_day, &target_slot, &now_rfc3339())?;
    commit(state, ops)?;
    Ok(json!({ "transfer": entry }))
}

fn daily_transfer_log(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let items: Vec<serde_json::Value> = state
        .store
        .transfer_log
        .iter()
        .map(|t| {
            json!({
                "studentId": t.student_id,
                "studentName": state.store.student(&t.student_id).map(|s| s.name.clone()),
                "targetDay": t.target_day,
                "targetDayLabel": t.target_day.label(),
                "targetTime": t.target_time,
                "targetAgeGroup": t.target_age_group,
                "movedAt": t.moved_at,
            })
        })
        .collect();
    Ok(json!({ "items": items }))
}

fn daily_set_note(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let date = get_date(params, "date")?;
    let slot_id = get_required_str(params, "slotId")?;
    let content = get_required_str(params, "content")?;
    require_slot_on(date, &slot_id)?;
    let note = state
        .store
        .set_class_note(date, &slot_id, &content, &now_rfc3339())?;
    commit(state, Vec::new())?;
    Ok(json!({ "note": note }))
}

fn weekly_occupancy(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let date = get_date(params, "date")?;
    Ok(json!({
        "days": summary::weekly_occupancy(&state.store, date),
        "weeklyCapacity": weekly_slot_count() * CAPACITY_PER_CLASS,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "schedule.day" => schedule_day(p),
        "schedule.weeklyRoster.get" => weekly_roster_get(state, p),
        "schedule.weeklyRoster.set" => weekly_roster_set(state, p),
        "daily.get" => daily_get(state, p),
        "daily.setAssignment" => daily_set_assignment(state, p),
        "daily.moveStudent" => daily_move_student(state, p),
        "daily.dragStart" => daily_drag_start(state, p),
        "daily.dragEnd" => daily_drag_end(state, p),
        "daily.quickAdd" => daily_quick_add(state, p),
        "daily.transfer" => daily_transfer(state, p),
        "daily.transferLog" => daily_transfer_log(state),
        "daily.setNote" => daily_set_note(state, p),
        "weekly.occupancy" => weekly_occupancy(state, p),
        _ => return None,
    };
    Some(respond(req, result))
}
