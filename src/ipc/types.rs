use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::config::Config;
use crate::dnd::DragSession;
use crate::store::DashboardState;
use crate::sync::SyncQueue;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub store: DashboardState,
    /// Replaced on every workspace select; dropping the old one drains it.
    pub sync: Option<SyncQueue>,
    pub roster_drag: DragSession,
    pub event_drag: DragSession,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            workspace: None,
            db: None,
            store: DashboardState::default(),
            sync: None,
            roster_drag: DragSession::default(),
            event_drag: DragSession::default(),
        }
    }
}
