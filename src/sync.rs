//! Best-effort replication of dashboard mutations to the remote store.
//!
//! Store transitions return [`SyncOp`]s; the IPC layer hands them to a
//! [`SyncQueue`] which never blocks the request loop. A single worker thread
//! applies them in order. Failures are logged and counted, never retried.

use crate::db;
use crate::model::{AttendanceStatus, Instructor, Student};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

pub type AssignmentsByDate = BTreeMap<NaiveDate, BTreeMap<String, Vec<String>>>;
pub type AttendanceByDate = BTreeMap<NaiveDate, BTreeMap<String, AttendanceStatus>>;

/// Named key-value blobs kept in the remote `app_state` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStateKey {
    DailyAssignments,
    DailyAttendance,
}

impl AppStateKey {
    pub fn as_str(self) -> &'static str {
        match self {
            AppStateKey::DailyAssignments => "daily_assignments",
            AppStateKey::DailyAttendance => "daily_attendance",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOp {
    UpsertStudent(Student),
    DeleteStudent(String),
    UpsertInstructor(Instructor),
    DeleteInstructor(String),
    SaveAssignments(AssignmentsByDate),
    SaveAttendance(AttendanceByDate),
}

impl SyncOp {
    pub fn label(&self) -> &'static str {
        match self {
            SyncOp::UpsertStudent(_) => "students.upsert",
            SyncOp::DeleteStudent(_) => "students.delete",
            SyncOp::UpsertInstructor(_) => "instructors.upsert",
            SyncOp::DeleteInstructor(_) => "instructors.delete",
            SyncOp::SaveAssignments(_) => "app_state.daily_assignments",
            SyncOp::SaveAttendance(_) => "app_state.daily_attendance",
        }
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("remote payload error: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("remote unavailable: {0}")]
    Unavailable(String),
}

/// Everything the remote holds, as read back during hydration.
#[derive(Debug, Clone, Default)]
pub struct RemoteSnapshot {
    pub students: Vec<Student>,
    pub instructors: Vec<Instructor>,
    pub daily_assignments: Option<AssignmentsByDate>,
    pub daily_attendance: Option<AttendanceByDate>,
}

pub trait RemoteStore: Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn upsert_student(&self, student: &Student) -> Result<(), RemoteError>;
    fn delete_student(&self, student_id: &str) -> Result<(), RemoteError>;
    fn upsert_instructor(&self, instructor: &Instructor) -> Result<(), RemoteError>;
    fn delete_instructor(&self, instructor_id: &str) -> Result<(), RemoteError>;
    fn save_app_state(&self, key: AppStateKey, data: &serde_json::Value)
        -> Result<(), RemoteError>;
    fn load_snapshot(&self) -> Result<RemoteSnapshot, RemoteError>;
}

pub fn apply_op(remote: &dyn RemoteStore, op: &SyncOp) -> Result<(), RemoteError> {
    match op {
        SyncOp::UpsertStudent(s) => remote.upsert_student(s),
        SyncOp::DeleteStudent(id) => remote.delete_student(id),
        SyncOp::UpsertInstructor(i) => remote.upsert_instructor(i),
        SyncOp::DeleteInstructor(id) => remote.delete_instructor(id),
        SyncOp::SaveAssignments(map) => {
            remote.save_app_state(AppStateKey::DailyAssignments, &serde_json::to_value(map)?)
        }
        SyncOp::SaveAttendance(map) => {
            remote.save_app_state(AppStateKey::DailyAttendance, &serde_json::to_value(map)?)
        }
    }
}

/// Offline mode: every write is accepted and discarded.
#[derive(Debug, Default)]
pub struct OfflineRemote;

impl RemoteStore for OfflineRemote {
    fn name(&self) -> &'static str {
        "offline"
    }
    fn upsert_student(&self, _student: &Student) -> Result<(), RemoteError> {
        Ok(())
    }
    fn delete_student(&self, _student_id: &str) -> Result<(), RemoteError> {
        Ok(())
    }
    fn upsert_instructor(&self, _instructor: &Instructor) -> Result<(), RemoteError> {
        Ok(())
    }
    fn delete_instructor(&self, _instructor_id: &str) -> Result<(), RemoteError> {
        Ok(())
    }
    fn save_app_state(
        &self,
        _key: AppStateKey,
        _data: &serde_json::Value,
    ) -> Result<(), RemoteError> {
        Ok(())
    }
    fn load_snapshot(&self) -> Result<RemoteSnapshot, RemoteError> {
        Ok(RemoteSnapshot::default())
    }
}

/// Remote backed by a shared SQLite file with row-per-record tables and JSON payloads.
pub struct SqliteRemote {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteRemote {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = db::open_remote_db(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| RemoteError::Unavailable("connection lock poisoned".to_string()))?;
        f(&conn)
    }

    fn upsert_row(&self, table: &str, id: &str, data: String) -> Result<(), RemoteError> {
        let sql = format!(
            "INSERT INTO {table}(id, data, updated_at) VALUES(?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at"
        );
        self.with_conn(|conn| {
            conn.execute(&sql, (id, &data, Utc::now().to_rfc3339()))?;
            Ok(())
        })
    }

    fn delete_row(&self, table: &str, id: &str) -> Result<(), RemoteError> {
        let sql = format!("DELETE FROM {table} WHERE id = ?");
        self.with_conn(|conn| {
            conn.execute(&sql, [id])?;
            Ok(())
        })
    }

    fn load_rows<T: serde::de::DeserializeOwned>(
        conn: &Connection,
        table: &str,
    ) -> Result<Vec<T>, RemoteError> {
        let mut stmt = conn.prepare(&format!("SELECT data FROM {table} ORDER BY rowid"))?;
        let raw = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let mut out = Vec::with_capacity(raw.len());
        for text in raw {
            out.push(serde_json::from_str(&text)?);
        }
        Ok(out)
    }

    fn load_app_state<T: serde::de::DeserializeOwned>(
        conn: &Connection,
        key: AppStateKey,
    ) -> Result<Option<T>, RemoteError> {
        let raw: Option<String> = conn
            .query_row(
                "SELECT data FROM app_state WHERE key = ?",
                [key.as_str()],
                |r| r.get(0),
            )
            .optional()?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }
}

impl RemoteStore for SqliteRemote {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn upsert_student(&self, student: &Student) -> Result<(), RemoteError> {
        self.upsert_row("students", &student.id, serde_json::to_string(student)?)
    }

    fn delete_student(&self, student_id: &str) -> Result<(), RemoteError> {
        self.delete_row("students", student_id)
    }

    fn upsert_instructor(&self, instructor: &Instructor) -> Result<(), RemoteError> {
        self.upsert_row("instructors", &instructor.id, serde_json::to_string(instructor)?)
    }

    fn delete_instructor(&self, instructor_id: &str) -> Result<(), RemoteError> {
        self.delete_row("instructors", instructor_id)
    }

    fn save_app_state(
        &self,
        key: AppStateKey,
        data: &serde_json::Value,
    ) -> Result<(), RemoteError> {
        let text = serde_json::to_string(data)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO app_state(key, data, updated_at) VALUES(?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
                (key.as_str(), &text, Utc::now().to_rfc3339()),
            )?;
            Ok(())
        })
    }

    fn load_snapshot(&self) -> Result<RemoteSnapshot, RemoteError> {
        self.with_conn(|conn| {
            Ok(RemoteSnapshot {
                students: Self::load_rows(conn, "students")?,
                instructors: Self::load_rows(conn, "instructors")?,
                daily_assignments: Self::load_app_state(conn, AppStateKey::DailyAssignments)?,
                daily_attendance: Self::load_app_state(conn, AppStateKey::DailyAttendance)?,
            })
        })
    }
}

#[derive(Debug, Default)]
pub struct SyncStats {
    enqueued: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatsSnapshot {
    pub enqueued: u64,
    pub delivered: u64,
    pub failed: u64,
    pub dropped: u64,
}

impl SyncStats {
    pub fn snapshot(&self) -> SyncStatsSnapshot {
        SyncStatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

const FLUSH_POLL: Duration = Duration::from_millis(5);

enum Msg {
    Op(SyncOp),
    Flush(mpsc::Sender<()>),
}

pub struct SyncQueue {
    tx: Option<SyncSender<Msg>>,
    worker: Option<JoinHandle<()>>,
    stats: Arc<SyncStats>,
    remote: Arc<dyn RemoteStore>,
    capacity: usize,
}

impl SyncQueue {
    pub fn start(remote: Arc<dyn RemoteStore>, capacity: usize) -> anyhow::Result<Self> {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::sync_channel::<Msg>(capacity);
        let stats = Arc::new(SyncStats::default());
        let worker = {
            let remote = Arc::clone(&remote);
            let stats = Arc::clone(&stats);
            thread::Builder::new()
                .name("parkourd-sync".to_string())
                .spawn(move || run_worker(remote.as_ref(), &stats, rx))?
        };
        info!(remote = remote.name(), capacity, "sync queue started");
        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            stats,
            remote,
            capacity,
        })
    }

    /// Never blocks. A full queue drops the operation.
    pub fn enqueue(&self, op: SyncOp) {
        let Some(tx) = self.tx.as_ref() else {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };
        let label = op.label();
        match tx.try_send(Msg::Op(op)) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(op = label, capacity = self.capacity, "sync queue full; dropping write");
            }
            Err(TrySendError::Disconnected(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(op = label, "sync worker gone; dropping write");
            }
        }
    }

    pub fn enqueue_all(&self, ops: impl IntoIterator<Item = SyncOp>) {
        for op in ops {
            self.enqueue(op);
        }
    }

    /// Waits until every operation enqueued before this call has been attempted.
    /// `timeout` bounds the whole call, including waiting for room in a full queue.
    pub fn flush(&self, timeout: Duration) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return true;
        };
        let deadline = Instant::now() + timeout;
        let (done_tx, done_rx) = mpsc::channel();
        let mut marker = Msg::Flush(done_tx);
        loop {
            match tx.try_send(marker) {
                Ok(()) => break,
                Err(TrySendError::Full(back)) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return false;
                    }
                    marker = back;
                    thread::sleep(left.min(FLUSH_POLL));
                }
                Err(TrySendError::Disconnected(_)) => return false,
            }
        }
        done_rx
            .recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .is_ok()
    }

    pub fn stats(&self) -> SyncStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn remote(&self) -> &dyn RemoteStore {
        self.remote.as_ref()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Drop for SyncQueue {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(remote: &dyn RemoteStore, stats: &SyncStats, rx: Receiver<Msg>) {
    for msg in rx {
        match msg {
            Msg::Op(op) => match apply_op(remote, &op) {
                Ok(()) => {
                    stats.delivered.fetch_add(1, Ordering::Relaxed);
                    debug!(op = op.label(), remote = remote.name(), "remote write delivered");
                }
                Err(e) => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(op = op.label(), remote = remote.name(), error = %e, "remote write failed");
                }
            },
            Msg::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!(remote = remote.name(), "sync worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Condvar;

    fn student(id: &str) -> Student {
        serde_json::from_value(serde_json::json!({ "id": id, "name": id })).unwrap()
    }

    #[derive(Default)]
    struct Recording {
        ops: Mutex<Vec<String>>,
    }

    impl RemoteStore for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }
        fn upsert_student(&self, s: &Student) -> Result<(), RemoteError> {
            self.ops.lock().unwrap().push(format!("upsert:{}", s.id));
            Ok(())
        }
        fn delete_student(&self, id: &str) -> Result<(), RemoteError> {
            self.ops.lock().unwrap().push(format!("delete:{id}"));
            Ok(())
        }
        fn upsert_instructor(&self, _i: &Instructor) -> Result<(), RemoteError> {
            Ok(())
        }
        fn delete_instructor(&self, _id: &str) -> Result<(), RemoteError> {
            Ok(())
        }
        fn save_app_state(&self, key: AppStateKey, _d: &serde_json::Value) -> Result<(), RemoteError> {
            self.ops.lock().unwrap().push(format!("state:{}", key.as_str()));
            Ok(())
        }
        fn load_snapshot(&self) -> Result<RemoteSnapshot, RemoteError> {
            Ok(RemoteSnapshot::default())
        }
    }

    struct Failing;

    impl RemoteStore for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn upsert_student(&self, _s: &Student) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("network down".into()))
        }
        fn delete_student(&self, _id: &str) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("network down".into()))
        }
        fn upsert_instructor(&self, _i: &Instructor) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("network down".into()))
        }
        fn delete_instructor(&self, _id: &str) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("network down".into()))
        }
        fn save_app_state(&self, _k: AppStateKey, _d: &serde_json::Value) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("network down".into()))
        }
        fn load_snapshot(&self) -> Result<RemoteSnapshot, RemoteError> {
            Err(RemoteError::Unavailable("network down".into()))
        }
    }

    /// Holds the worker inside its first write until released.
    struct Gate {
        open: Mutex<bool>,
        cv: Condvar,
        entered: AtomicBool,
    }

    impl RemoteStore for Gate {
        fn name(&self) -> &'static str {
            "gate"
        }
        fn upsert_student(&self, _s: &Student) -> Result<(), RemoteError> {
            self.entered.store(true, Ordering::SeqCst);
            let mut open = self.open.lock().unwrap();
            while !*open {
                open = self.cv.wait(open).unwrap();
            }
            Ok(())
        }
        fn delete_student(&self, _id: &str) -> Result<(), RemoteError> {
            Ok(())
        }
        fn upsert_instructor(&self, _i: &Instructor) -> Result<(), RemoteError> {
            Ok(())
        }
        fn delete_instructor(&self, _id: &str) -> Result<(), RemoteError> {
            Ok(())
        }
        fn save_app_state(&self, _k: AppStateKey, _d: &serde_json::Value) -> Result<(), RemoteError> {
            Ok(())
        }
        fn load_snapshot(&self) -> Result<RemoteSnapshot, RemoteError> {
            Ok(RemoteSnapshot::default())
        }
    }

    #[test]
    fn queue_applies_ops_in_order() {
        let remote = Arc::new(Recording::default());
        let queue = SyncQueue::start(remote.clone(), 8).unwrap();
        queue.enqueue(SyncOp::UpsertStudent(student("stu-1")));
        queue.enqueue(SyncOp::SaveAssignments(BTreeMap::new()));
        queue.enqueue(SyncOp::DeleteStudent("stu-1".into()));
        assert!(queue.flush(Duration::from_secs(5)));
        assert_eq!(
            *remote.ops.lock().unwrap(),
            vec![
                "upsert:stu-1".to_string(),
                "state:daily_assignments".to_string(),
                "delete:stu-1".to_string()
            ]
        );
        let stats = queue.stats();
        assert_eq!(stats.enqueued, 3);
        assert_eq!(stats.delivered, 3);
        assert_eq!(stats.failed, 0);
    }

    #[test]
    fn failed_writes_are_counted_not_raised() {
        let queue = SyncQueue::start(Arc::new(Failing), 4).unwrap();
        queue.enqueue(SyncOp::UpsertStudent(student("stu-1")));
        queue.enqueue(SyncOp::SaveAttendance(BTreeMap::new()));
        assert!(queue.flush(Duration::from_secs(5)));
        let stats = queue.stats();
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.delivered, 0);
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let gate = Arc::new(Gate {
            open: Mutex::new(false),
            cv: Condvar::new(),
            entered: AtomicBool::new(false),
        });
        let queue = SyncQueue::start(gate.clone(), 1).unwrap();
        queue.enqueue(SyncOp::UpsertStudent(student("stu-1")));
        while !gate.entered.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }
        // Worker is parked inside the first write; one slot fills, the rest drop.
        queue.enqueue(SyncOp::DeleteStudent("a".into()));
        queue.enqueue(SyncOp::DeleteStudent("b".into()));
        queue.enqueue(SyncOp::DeleteStudent("c".into()));
        assert_eq!(queue.stats().dropped, 2);

        *gate.open.lock().unwrap() = true;
        gate.cv.notify_all();
        assert!(queue.flush(Duration::from_secs(5)));
        assert_eq!(queue.stats().delivered, 2);
    }

    #[test]
    fn flush_on_a_full_queue_honours_its_timeout() {
        let gate = Arc::new(Gate {
            open: Mutex::new(false),
            cv: Condvar::new(),
            entered: AtomicBool::new(false),
        });
        let queue = SyncQueue::start(gate.clone(), 1).unwrap();
        queue.enqueue(SyncOp::UpsertStudent(student("stu-1")));
        while !gate.entered.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }
        queue.enqueue(SyncOp::DeleteStudent("a".into()));

        let started = Instant::now();
        assert!(!queue.flush(Duration::from_millis(100)));
        assert!(started.elapsed() < Duration::from_secs(2));

        *gate.open.lock().unwrap() = true;
        gate.cv.notify_all();
        assert!(queue.flush(Duration::from_secs(5)));
        assert_eq!(queue.stats().delivered, 2);
    }

    #[test]
    fn sqlite_remote_roundtrips_rows_and_state() {
        let dir = std::env::temp_dir().join(format!("parkourd-remote-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let remote = SqliteRemote::open(&dir.join("remote.sqlite3")).unwrap();

        remote.upsert_student(&student("stu-1")).unwrap();
        let mut renamed = student("stu-1");
        renamed.name = "Renamed".into();
        remote.upsert_student(&renamed).unwrap();
        remote.upsert_student(&student("stu-2")).unwrap();
        remote.delete_student("stu-2").unwrap();

        let mut day = BTreeMap::new();
        day.insert("segunda-0900".to_string(), vec!["stu-1".to_string()]);
        let mut assignments = AssignmentsByDate::new();
        assignments.insert(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), day);
        apply_op(&remote, &SyncOp::SaveAssignments(assignments.clone())).unwrap();

        let snap = remote.load_snapshot().unwrap();
        assert_eq!(snap.students.len(), 1);
        assert_eq!(snap.students[0].name, "Renamed");
        assert_eq!(snap.daily_assignments, Some(assignments));
        assert!(snap.daily_attendance.is_none());

        let _ = std::fs::remove_dir_all(dir);
    }
}
