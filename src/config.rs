use std::env;
use std::path::PathBuf;

pub const DEFAULT_SYNC_QUEUE: usize = 64;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Process settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Workspace selected before the first request, if any.
    pub workspace: Option<PathBuf>,
    /// SQLite file used as the remote store. `None` runs offline.
    pub remote_db: Option<PathBuf>,
    pub sync_queue_capacity: usize,
    pub log_filter: String,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: None,
            remote_db: None,
            sync_queue_capacity: DEFAULT_SYNC_QUEUE,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| get(name).filter(|v| !v.trim().is_empty());
        Self {
            workspace: non_empty("PARKOURD_WORKSPACE").map(PathBuf::from),
            remote_db: non_empty("PARKOURD_REMOTE_DB").map(PathBuf::from),
            sync_queue_capacity: non_empty("PARKOURD_SYNC_QUEUE")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_SYNC_QUEUE),
            log_filter: non_empty("PARKOURD_LOG")
                .or_else(|| non_empty("RUST_LOG"))
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            log_json: non_empty("PARKOURD_LOG_JSON")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(false),
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}
