use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{commit, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::DashboardState;
use crate::sync::{OfflineRemote, RemoteStore, SqliteRemote, SyncQueue};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "remote": state.sync.as_ref().map(|s| s.remote().name()),
        }),
    )
}

/// Falls back to offline when the remote file cannot be opened; the workspace
/// stays usable either way.
fn open_remote(path: Option<&Path>) -> Arc<dyn RemoteStore> {
    let Some(path) = path else {
        return Arc::new(OfflineRemote);
    };
    match SqliteRemote::open(path) {
        Ok(remote) => {
            info!(path = %remote.path().display(), "remote store opened");
            Arc::new(remote)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "remote unavailable; running offline");
            Arc::new(OfflineRemote)
        }
    }
}

fn load_store(conn: &rusqlite::Connection) -> Result<DashboardState, HandlerErr> {
    let blob = db::load_blob(conn, db::STORAGE_KEY)
        .map_err(|e| HandlerErr::new("db_open_failed", format!("{e:?}")))?;
    match blob {
        Some(v) => serde_json::from_value(v).map_err(|e| {
            HandlerErr::new("db_open_failed", format!("stored dashboard state is invalid: {e}"))
        }),
        None => Ok(DashboardState::default()),
    }
}

/// Opens `path` as the active workspace and starts a fresh sync queue.
pub fn open_workspace(
    state: &mut AppState,
    path: &Path,
    remote_path: Option<&Path>,
) -> Result<serde_json::Value, HandlerErr> {
    let conn = db::open_db(path).map_err(|e| HandlerErr::new("db_open_failed", format!("{e:?}")))?;
    let mut store = load_store(&conn)?;

    // Dropping the old queue drains it. Pending writes must reach the remote
    // before the snapshot is taken.
    state.sync = None;

    let remote = open_remote(remote_path);
    let mut hydrated = None;
    match remote.load_snapshot() {
        Ok(snapshot) => hydrated = Some(store.hydrate(snapshot)),
        Err(e) => warn!(remote = remote.name(), error = %e, "remote hydration failed; keeping local state"),
    }
    let queue = SyncQueue::start(remote, state.config.sync_queue_capacity)
        .map_err(|e| HandlerErr::new("db_open_failed", format!("failed to start sync worker: {e}")))?;

    state.store = store;
    state.db = Some(conn);
    state.workspace = Some(path.to_path_buf());
    state.sync = Some(queue);
    state.roster_drag.finish();
    state.event_drag.finish();
    if hydrated.is_some() {
        // Persist what came down from the remote so the next start is warm.
        commit(state, Vec::new())?;
    }

    info!(
        workspace = %path.display(),
        students = state.store.students.len(),
        "workspace selected"
    );
    Ok(json!({
        "workspacePath": path.to_string_lossy(),
        "remote": state.sync.as_ref().map(|s| s.remote().name()),
        "hydrated": hydrated,
    }))
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };
    let remote_path = req
        .params
        .get("remotePath")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .or_else(|| state.config.remote_db.clone());

    match open_workspace(state, &path, remote_path.as_deref()) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
