use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use rusqlite::Connection;
use serde::Deserialize;

use crate::auth::Session;
use crate::config::DaemonConfig;
use crate::roster::RosterController;
use crate::store::SqliteStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Holds the most recent roster change event raised while a request was
/// being handled. Only the latest snapshot is kept.
pub type EventSlot = Rc<RefCell<Option<serde_json::Value>>>;

pub struct AppState {
    pub config: DaemonConfig,
    pub workspace: Option<PathBuf>,
    pub db: Option<Rc<Connection>>,
    pub session: Option<Session>,
    pub roster: Option<RosterController<SqliteStore>>,
    pub pending_event: EventSlot,
}

impl AppState {
    pub fn new(config: DaemonConfig) -> Self {
        Self {
            config,
            workspace: None,
            db: None,
            session: None,
            roster: None,
            pending_event: EventSlot::default(),
        }
    }

    pub fn take_event(&self) -> Option<serde_json::Value> {
        self.pending_event.borrow_mut().take()
    }
}
