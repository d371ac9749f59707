mod backup;
mod config;
mod db;
mod dnd;
mod error;
mod events;
mod ipc;
mod model;
mod progress;
mod schedule;
mod store;
mod summary;
mod sync;

use std::io::{self, BufRead, Write};
use tracing::{info, info_span, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// stdout carries the protocol, so logs always go to stderr.
fn init_tracing(cfg: &config::Config) {
    let filter = EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn main() {
    let cfg = config::Config::from_env();
    init_tracing(&cfg);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        remote = ?cfg.remote_db,
        queue = cfg.sync_queue_capacity,
        "parkourd starting"
    );

    let startup_workspace = cfg.workspace.clone();
    let startup_remote = cfg.remote_db.clone();
    let mut state = ipc::AppState::new(cfg);
    if let Some(path) = startup_workspace {
        if let Err(e) = ipc::open_workspace(&mut state, &path, startup_remote.as_deref()) {
            warn!(workspace = %path.display(), code = e.code, error = %e.message, "startup workspace not opened");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                warn!(error = %e, "unparseable request");
                let _ = writeln!(stdout, "{}", ipc::err("", "bad_json", e.to_string(), None));
                let _ = stdout.flush();
                continue;
            }
        };

        let span = info_span!("request", id = %req.id, method = %req.method);
        let resp = span.in_scope(|| ipc::handle_request(&mut state, req));
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    // Dropping the state drains the sync queue before exit.
    drop(state);
    info!("parkourd stopped");
}
