//! Single-slot backup of pre-edit file content.

use crate::error::{EditError, EditResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Directory holding the slot, relative to the working directory.
pub const SLOT_DIR: &str = ".driftpatch";

const BACKUP_FILE: &str = "last-backup";
const SIDECAR_FILE: &str = "last-backup.json";

/// The single most-recent backup slot shared by every operation.
///
/// Each successful mutation overwrites the slot with the pre-edit bytes of
/// the file about to be rewritten, whichever file that is. Only the latest
/// mutation is recoverable; this is not per-file history.
#[derive(Debug, Clone)]
pub struct BackupSlot {
    dir: PathBuf,
}

/// Sidecar recording where the slot contents came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotMetadata {
    source: PathBuf,
    captured_at_ms: u128,
}

impl Default for BackupSlot {
    fn default() -> Self {
        Self::new(SLOT_DIR)
    }
}

impl BackupSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the slot lives in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the backup bytes.
    pub fn backup_path(&self) -> PathBuf {
        self.dir.join(BACKUP_FILE)
    }

    fn sidecar_path(&self) -> PathBuf {
        self.dir.join(SIDECAR_FILE)
    }

    /// Copy the pre-edit file into the slot, overwriting the previous
    /// capture. Must be called before the replacement write.
    pub fn capture(&self, source: &Path) -> EditResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| EditError::backup(&self.dir, e))?;
        fs::copy(source, self.backup_path()).map_err(|e| EditError::backup(source, e))?;

        let metadata = SlotMetadata {
            source: source.to_path_buf(),
            captured_at_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
        };
        let json = serde_json::to_string_pretty(&metadata)
            .map_err(|e| EditError::backup(self.sidecar_path(), std::io::Error::other(e)))?;
        fs::write(self.sidecar_path(), json)
            .map_err(|e| EditError::backup(self.sidecar_path(), e))?;

        debug!(source = %source.display(), slot = %self.backup_path().display(), "captured backup");
        Ok(())
    }

    /// Copy the slot back over the file it was captured from. Returns the
    /// restored path.
    pub fn restore_last(&self) -> EditResult<PathBuf> {
        let json = fs::read_to_string(self.sidecar_path())
            .map_err(|e| EditError::backup(self.sidecar_path(), e))?;
        let metadata: SlotMetadata = serde_json::from_str(&json)
            .map_err(|e| EditError::backup(self.sidecar_path(), std::io::Error::other(e)))?;

        fs::copy(self.backup_path(), &metadata.source)
            .map_err(|e| EditError::backup(&metadata.source, e))?;

        debug!(source = %metadata.source.display(), "restored from backup slot");
        Ok(metadata.source)
    }
}
