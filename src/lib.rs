//! Student roster daemon for a swimming academy: the roster view controller,
//! its SQLite-backed document store, and the JSON-lines IPC surface.

pub mod auth;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod expiry;
pub mod ipc;
pub mod migrate;
pub mod model;
pub mod roster;
pub mod store;
pub mod timetable;
pub mod validate;
