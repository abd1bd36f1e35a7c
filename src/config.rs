use anyhow::{anyhow, Context};
use chrono::FixedOffset;
use std::path::PathBuf;

use crate::roster::DEFAULT_PAGE_SIZE;

pub const MAX_PAGE_SIZE: usize = 200;

/// Daemon settings. Everything comes from the environment; there is no
/// config file.
#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    /// Workspace to open at start-up (`ROSTERD_WORKSPACE`).
    pub workspace: Option<PathBuf>,
    /// Rows per roster page (`ROSTERD_PAGE_SIZE`).
    pub page_size: usize,
    /// Academy UTC offset for day boundaries (`ROSTERD_UTC_OFFSET_MINUTES`).
    /// `None` follows the host.
    pub utc_offset: Option<FixedOffset>,
    /// tracing filter directive (`ROSTERD_LOG`).
    pub log_filter: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            workspace: None,
            page_size: DEFAULT_PAGE_SIZE,
            utc_offset: None,
            log_filter: "info".to_string(),
        }
    }
}

impl DaemonConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut cfg = Self::default();

        if let Some(path) = get("ROSTERD_WORKSPACE") {
            cfg.workspace = Some(PathBuf::from(path));
        }

        if let Some(raw) = get("ROSTERD_PAGE_SIZE") {
            let n: usize = raw
                .parse()
                .with_context(|| format!("ROSTERD_PAGE_SIZE is not a number: {raw}"))?;
            if !(1..=MAX_PAGE_SIZE).contains(&n) {
                return Err(anyhow!(
                    "ROSTERD_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}, got {n}"
                ));
            }
            cfg.page_size = n;
        }

        if let Some(raw) = get("ROSTERD_UTC_OFFSET_MINUTES") {
            let minutes: i32 = raw
                .parse()
                .with_context(|| format!("ROSTERD_UTC_OFFSET_MINUTES is not a number: {raw}"))?;
            let offset = minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| anyhow!("ROSTERD_UTC_OFFSET_MINUTES out of range: {minutes}"))?;
            cfg.utc_offset = Some(offset);
        }

        if let Some(filter) = get("ROSTERD_LOG") {
            cfg.log_filter = filter;
        }

        Ok(cfg)
    }
}
