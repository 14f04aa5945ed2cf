//! The on-disk cache artifact: the unmodified CSV body of the last successful
//! fetch. Its modification time is the only freshness signal.

use crate::error::{DataError, Result};
use chrono::{DateTime, Local};
use log::debug;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheArtifact {
    path: PathBuf,
}

impl CacheArtifact {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Last-write time, or `None` when there is no artifact.
    pub fn modified(&self) -> Result<Option<SystemTime>> {
        match fs::metadata(&self.path) {
            Ok(meta) => meta
                .modified()
                .map(Some)
                .map_err(|e| DataError::io(&self.path, e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DataError::io(&self.path, e)),
        }
    }

    /// Age relative to `now`. A timestamp in the future counts as age zero.
    pub fn age_at(&self, now: SystemTime) -> Result<Option<Duration>> {
        Ok(self
            .modified()?
            .map(|m| now.duration_since(m).unwrap_or(Duration::ZERO)))
    }

    /// True when the artifact exists and is strictly younger than `max_age`.
    pub fn is_fresh_at(&self, now: SystemTime, max_age: Duration) -> Result<bool> {
        Ok(matches!(self.age_at(now)?, Some(age) if age < max_age))
    }

    /// Last-write time in local time, for display.
    pub fn modified_local(&self) -> Result<Option<DateTime<Local>>> {
        Ok(self.modified()?.map(DateTime::<Local>::from))
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|e| DataError::io(&self.path, e))
    }

    /// Replace the artifact with `bytes`.
    ///
    /// Writes to a temp file in the same directory and renames it over the
    /// old artifact, so readers never observe a partial file.
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| DataError::io(dir, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| DataError::io(dir, e))?;
        tmp.write_all(bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| DataError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| DataError::io(&self.path, e.error))?;
        debug!("wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}
