use chrono::{Local, NaiveDate};
use serde_json::json;
use tracing::warn;

use crate::db;
use crate::dnd::DropRejection;
use crate::error::DomainError;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::schedule::{self, WeekdayKey};
use crate::store::DashboardState;
use crate::sync::SyncOp;

#[derive(Debug)]
pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<DomainError> for HandlerErr {
    fn from(e: DomainError) -> Self {
        HandlerErr::new(e.code(), e.to_string())
    }
}

pub fn respond(req: &Request, result: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    }
}

pub fn require_workspace(state: &AppState) -> Result<(), HandlerErr> {
    if state.db.is_none() {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    }
    Ok(())
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

pub fn get_date(params: &serde_json::Value, key: &str) -> Result<NaiveDate, HandlerErr> {
    let raw = get_required_str(params, key)?;
    Ok(schedule::parse_date(&raw)?)
}

pub fn get_weekday(params: &serde_json::Value, key: &str) -> Result<WeekdayKey, HandlerErr> {
    let raw = get_required_str(params, key)?;
    WeekdayKey::parse(&raw).ok_or_else(|| DomainError::UnknownWeekday(raw).into())
}

pub fn get_id_list(params: &serde_json::Value, key: &str) -> Result<Vec<String>, HandlerErr> {
    let Some(arr) = params.get(key).and_then(|v| v.as_array()) else {
        return Err(HandlerErr::bad_params(format!("missing {}", key)));
    };
    arr.iter()
        .map(|v| {
            v.as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| HandlerErr::bad_params(format!("{} must be an array of strings", key)))
        })
        .collect()
}

pub fn get_payload<T: serde::de::DeserializeOwned>(
    params: &serde_json::Value,
    key: &str,
) -> Result<T, HandlerErr> {
    let Some(v) = params.get(key) else {
        return Err(HandlerErr::bad_params(format!("missing {}", key)));
    };
    serde_json::from_value(v.clone()).map_err(|e| HandlerErr {
        code: "bad_params",
        message: format!("invalid {}: {}", key, e),
        details: None,
    })
}

/// `today` param when given (tests pin it), else the local calendar date.
pub fn today(params: &serde_json::Value) -> Result<NaiveDate, HandlerErr> {
    match get_optional_str(params, "today") {
        Some(raw) => Ok(schedule::parse_date(&raw)?),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Persists the dashboard blob, then hands `ops` to the sync queue.
/// Local persistence failing is an error; remote delivery never is.
/// On a failed write the in-memory store is reloaded from the last blob
/// that did land, so memory never runs ahead of disk.
pub fn commit(state: &mut AppState, ops: Vec<SyncOp>) -> Result<(), HandlerErr> {
    let Some(conn) = state.db.as_ref() else {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    };
    let saved = serde_json::to_value(&state.store)
        .map_err(anyhow::Error::from)
        .and_then(|blob| db::save_blob(conn, db::STORAGE_KEY, &blob));
    if let Err(e) = saved {
        match persisted_store(conn) {
            Ok(previous) => state.store = previous,
            Err(reload) => {
                warn!(error = %reload, "could not reload dashboard state after failed write")
            }
        }
        return Err(HandlerErr::new("db_write_failed", e.to_string()));
    }
    if let Some(sync) = state.sync.as_ref() {
        sync.enqueue_all(ops);
    }
    Ok(())
}

fn persisted_store(conn: &rusqlite::Connection) -> anyhow::Result<DashboardState> {
    match db::load_blob(conn, db::STORAGE_KEY)? {
        Some(v) => Ok(serde_json::from_value(v)?),
        None => Ok(DashboardState::default()),
    }
}

pub fn rejected(reason: DropRejection) -> serde_json::Value {
    json!({ "applied": false, "reason": reason.as_str() })
}
