use crate::config::ServerConfig;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared server state: the injected configuration plus a registry of
/// per-path write locks.
///
/// The locks serialize mutating tool calls targeting the same resolved
/// path within this process. External writers are not coordinated; two
/// processes saving the same file still race (last completed save wins).
pub struct AppState {
    config: Arc<ServerConfig>,
    write_locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self {
            config,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Advisory single-writer lock for a resolved workbook path.
    pub fn write_lock(&self, path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.write_locks.lock();
        locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
