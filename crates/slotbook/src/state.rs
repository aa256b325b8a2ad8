//! JSON state file holding the store between invocations.

use std::path::PathBuf;

use tracing::debug;

use slotbook_core::{DataStore, StoreSnapshot};

use crate::error::CliError;

pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the store. A missing file is an empty store.
    pub fn load(&self) -> Result<DataStore, CliError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no state file; starting empty");
            return Ok(DataStore::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let snapshot: StoreSnapshot =
            serde_json::from_str(&contents).map_err(|e| self.error(e))?;
        DataStore::from_snapshot(snapshot).map_err(|e| self.error(e))
    }

    /// Write the store, replacing the file only once the new contents are
    /// fully on disk.
    pub fn save(&self, store: &DataStore) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&store.export())?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }

    fn error(&self, reason: impl std::fmt::Display) -> CliError {
        CliError::State {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
