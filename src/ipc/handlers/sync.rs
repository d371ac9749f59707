use crate::ipc::helpers::{commit, require_workspace, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_FLUSH_TIMEOUT_MS: u64 = 5_000;

fn flush_timeout(params: &serde_json::Value) -> Duration {
    let ms = params
        .get("timeoutMs")
        .and_then(|v| v.as_u64())
        .unwrap_or(DEFAULT_FLUSH_TIMEOUT_MS);
    Duration::from_millis(ms)
}

/// Re-reads the remote and lets it win wherever it has data.
/// Queued local writes are delivered first so the pull cannot undo them.
fn sync_pull(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let Some(queue) = state.sync.as_ref() else {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    };
    let remote = queue.remote().name();
    if !queue.flush(flush_timeout(params)) {
        warn!(remote, "queued remote writes did not drain; skipping pull");
        return Ok(json!({
            "pulled": false,
            "remote": remote,
            "error": "queued remote writes did not drain",
            "stats": queue.stats(),
        }));
    }
    let snapshot = match queue.remote().load_snapshot() {
        Ok(s) => s,
        Err(e) => {
            warn!(remote, error = %e, "remote pull failed; keeping local state");
            return Ok(json!({ "pulled": false, "remote": remote, "error": e.to_string() }));
        }
    };
    let summary = state.store.hydrate(snapshot);
    commit(state, Vec::new())?;
    info!(remote, students = summary.students, instructors = summary.instructors, "pulled remote state");
    Ok(json!({ "pulled": true, "remote": remote, "summary": summary }))
}

fn sync_status(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let Some(queue) = state.sync.as_ref() else {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    };
    Ok(json!({
        "remote": queue.remote().name(),
        "capacity": queue.capacity(),
        "stats": queue.stats(),
    }))
}

fn sync_flush(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let Some(queue) = state.sync.as_ref() else {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    };
    let drained = queue.flush(flush_timeout(params));
    Ok(json!({ "drained": drained, "stats": queue.stats() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "sync.pull" => sync_pull(state, &req.params),
        "sync.status" => sync_status(state),
        "sync.flush" => sync_flush(state, &req.params),
        _ => return None,
    };
    Some(respond(req, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db;
    use crate::ipc::handlers::core::open_workspace;
    use crate::model::{Instructor, Student};
    use crate::sync::{AppStateKey, RemoteError, RemoteSnapshot, RemoteStore, SqliteRemote, SyncQueue};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// Sqlite remote whose student upserts take a while to land.
    struct SlowUpserts(SqliteRemote);

    impl RemoteStore for SlowUpserts {
        fn name(&self) -> &'static str {
            "slow"
        }
        fn upsert_student(&self, s: &Student) -> Result<(), RemoteError> {
            std::thread::sleep(Duration::from_millis(200));
            self.0.upsert_student(s)
        }
        fn delete_student(&self, id: &str) -> Result<(), RemoteError> {
            self.0.delete_student(id)
        }
        fn upsert_instructor(&self, i: &Instructor) -> Result<(), RemoteError> {
            self.0.upsert_instructor(i)
        }
        fn delete_instructor(&self, id: &str) -> Result<(), RemoteError> {
            self.0.delete_instructor(id)
        }
        fn save_app_state(&self, key: AppStateKey, data: &serde_json::Value) -> Result<(), RemoteError> {
            self.0.save_app_state(key, data)
        }
        fn load_snapshot(&self) -> Result<RemoteSnapshot, RemoteError> {
            self.0.load_snapshot()
        }
    }

    fn student(id: &str) -> Student {
        serde_json::from_value(json!({ "id": id, "name": id })).unwrap()
    }

    fn temp_dir(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    /// Workspace at `dir/ws` whose queue writes slowly to a remote seeded with `remote-1`.
    fn state_with_slow_remote(dir: &Path) -> (AppState, PathBuf) {
        let remote_path = dir.join("remote.sqlite3");
        let seed = SqliteRemote::open(&remote_path).unwrap();
        seed.upsert_student(&student("remote-1")).unwrap();

        let ws = dir.join("ws");
        let mut state = AppState::new(Config::default());
        state.db = Some(db::open_db(&ws).unwrap());
        state.workspace = Some(ws);
        state.sync = Some(SyncQueue::start(Arc::new(SlowUpserts(seed)), 8).unwrap());
        (state, remote_path)
    }

    fn student_ids(state: &AppState) -> Vec<String> {
        let mut ids: Vec<String> = state.store.students.iter().map(|s| s.id.clone()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn pull_keeps_writes_still_in_the_queue() {
        let dir = temp_dir("parkourd-pull-race");
        let (mut state, _) = state_with_slow_remote(&dir);
        let ops = state.store.add_student(student("stu-new")).unwrap();
        commit(&mut state, ops).unwrap();

        let pulled = sync_pull(&mut state, &json!({})).unwrap();
        assert_eq!(pulled["pulled"], json!(true));
        assert_eq!(student_ids(&state), vec!["remote-1", "stu-new"]);

        drop(state);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn pull_is_skipped_when_the_queue_does_not_drain() {
        let dir = temp_dir("parkourd-pull-timeout");
        let (mut state, _) = state_with_slow_remote(&dir);
        let ops = state.store.add_student(student("stu-new")).unwrap();
        commit(&mut state, ops).unwrap();

        let pulled = sync_pull(&mut state, &json!({ "timeoutMs": 1 })).unwrap();
        assert_eq!(pulled["pulled"], json!(false));
        assert_eq!(student_ids(&state), vec!["stu-new"]);

        drop(state);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn reselecting_a_workspace_delivers_pending_writes_before_hydrating() {
        let dir = temp_dir("parkourd-reselect-race");
        let (mut state, remote_path) = state_with_slow_remote(&dir);
        let ops = state.store.add_student(student("stu-new")).unwrap();
        commit(&mut state, ops).unwrap();

        let ws = dir.join("ws");
        open_workspace(&mut state, &ws, Some(&remote_path)).unwrap();
        assert_eq!(student_ids(&state), vec!["remote-1", "stu-new"]);

        drop(state);
        let _ = std::fs::remove_dir_all(dir);
    }
}
