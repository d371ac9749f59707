use crate::events::{month_cells, ColumnId};
use crate::ipc::helpers::{
    commit, get_date, get_optional_str, get_required_str, rejected, require_workspace, respond,
    HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::schedule::parse_month;
use serde_json::json;
use tracing::debug;

fn events_board(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let columns: Vec<serde_json::Value> = ColumnId::ALL
        .iter()
        .map(|c| {
            json!({
                "id": c,
                "title": c.title(),
                "tasks": state.store.events.column(*c),
            })
        })
        .collect();
    Ok(json!({ "columns": columns }))
}

fn events_add_task(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let raw = get_required_str(params, "columnId")?;
    let column = ColumnId::parse(&raw)
        .ok_or_else(|| HandlerErr::bad_params(format!("unknown column: {raw}")))?;
    let title = get_required_str(params, "title")?;
    let date = get_date(params, "date")?;
    let task = state.store.events.add_task(column, &title, date)?;
    commit(state, Vec::new())?;
    Ok(json!({ "task": task }))
}

fn events_drag_start(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let active = get_required_str(params, "activeId")?;
    state.event_drag.start(active);
    Ok(json!({ "activeId": state.event_drag.active() }))
}

fn events_drag_end(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let session = state.event_drag.finish();
    let Some(active) = get_optional_str(params, "activeId").or(session) else {
        return Ok(json!({ "applied": false, "reason": "no_active" }));
    };
    let over = get_optional_str(params, "overId");
    match state.store.events.apply_drop(&active, over.as_deref()) {
        Ok(plan) => {
            commit(state, Vec::new())?;
            Ok(json!({ "applied": true, "plan": plan }))
        }
        Err(reason) => {
            debug!(active = %active, over = ?over, reason = reason.as_str(), "event drop ignored");
            Ok(rejected(reason))
        }
    }
}

fn events_calendar(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let month = get_required_str(params, "month")?;
    let (year, m) = parse_month(&month)?;
    let by_date = state.store.events.events_by_date();
    let cells: Vec<serde_json::Value> = month_cells(year, m)?
        .into_iter()
        .map(|cell| {
            let events = cell
                .iso
                .and_then(|d| by_date.get(&d))
                .cloned()
                .unwrap_or_default();
            json!({ "iso": cell.iso, "day": cell.day, "events": events })
        })
        .collect();
    Ok(json!({ "month": month.trim(), "cells": cells }))
}

fn events_for_date(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let date = get_date(params, "date")?;
    Ok(json!({ "date": date, "events": state.store.events.events_for_date(date) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "events.board" => events_board(state),
        "events.addTask" => events_add_task(state, p),
        "events.dragStart" => events_drag_start(state, p),
        "events.dragEnd" => events_drag_end(state, p),
        "events.calendar" => events_calendar(state, p),
        "events.forDate" => events_for_date(state, p),
        _ => return None,
    };
    Some(respond(req, result))
}
