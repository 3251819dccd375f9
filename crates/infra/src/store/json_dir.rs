use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use kiemke_core::SessionDate;
use kiemke_inventory::{InventoryLineItem, InventorySession};

use super::{SessionStore, StoreError, upsert_lines};

const EXTENSION: &str = "json";

/// File-backed session store: one pretty-printed `yyyy-mm-dd.json` per session.
///
/// Writes go through a temporary file and a rename so a crash never leaves a
/// half-written session behind. Saves within one process are serialized.
#[derive(Debug)]
pub struct JsonDirSessionStore {
    dir: PathBuf,
    write_guard: Mutex<()>,
}

impl JsonDirSessionStore {
    /// The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_guard: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, date: SessionDate) -> PathBuf {
        self.dir.join(format!("{}.{EXTENSION}", date.to_iso()))
    }

    fn read_session(&self, path: &Path) -> Result<Option<InventorySession>, StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::io(path, err)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| StoreError::Malformed {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
    }

    fn write_session(&self, path: &Path, session: &InventorySession) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|err| StoreError::io(&self.dir, err))?;

        let json = serde_json::to_vec_pretty(session)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|err| StoreError::io(&tmp, err))?;
        fs::rename(&tmp, path).map_err(|err| StoreError::io(path, err))
    }
}

impl SessionStore for JsonDirSessionStore {
    fn save(&self, date: SessionDate, items: Vec<InventoryLineItem>) -> Result<(), StoreError> {
        let _guard = self.write_guard.lock().map_err(|_| StoreError::LockPoisoned)?;

        let path = self.path_for(date);
        let mut session = self
            .read_session(&path)?
            .unwrap_or_else(|| InventorySession::empty(date));

        let incoming = items.len();
        let replaced = upsert_lines(&mut session, items);
        self.write_session(&path, &session)?;

        tracing::debug!(
            date = %date,
            path = %path.display(),
            incoming,
            replaced,
            "session file written"
        );
        Ok(())
    }

    fn load(&self, date: SessionDate) -> Result<Option<InventorySession>, StoreError> {
        let path = self.path_for(date);
        let session = self.read_session(&path)?;

        match session {
            Some(session) if session.date != date => Err(StoreError::Malformed {
                path,
                message: format!("file holds session dated {}", session.date.to_iso()),
            }),
            other => Ok(other),
        }
    }

    fn list_dates(&self) -> Result<Vec<SessionDate>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::io(&self.dir, err)),
        };

        let mut dates = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| StoreError::io(&self.dir, err))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Only canonical names: `load` looks files up by their ISO date.
            match SessionDate::parse(stem) {
                Ok(date) if date.to_iso() == stem => dates.push(date),
                _ => tracing::debug!(path = %path.display(), "ignoring non-session file"),
            }
        }

        dates.sort();
        Ok(dates)
    }
}
