//! File-backed archive of the full meal list.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::codec::{decode_archive, encode_archive, DecodeError, EncodeError};
use crate::models::Meal;

/// Filename of the archive inside the data directory.
pub const ARCHIVE_FILENAME: &str = "meals.automerge";

/// Errors that can occur while saving or loading the archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error for {}: {1}", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("Failed to decode archive {}: {1}", .0.display())]
    Decode(PathBuf, #[source] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Durable snapshot of a meal list at a fixed path.
///
/// The archive holds no meals itself. Every save replaces the file wholesale
/// and every load reads the whole file.
#[derive(Debug, Clone)]
pub struct MealArchive {
    path: PathBuf,
}

impl MealArchive {
    /// Creates an archive backed by the file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Creates an archive backed by [`ARCHIVE_FILENAME`] inside `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(ARCHIVE_FILENAME))
    }

    /// Returns the archive file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks if the archive file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads every archived meal, in order.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    /// Returns `Err` for other I/O errors or if any record fails to decode.
    pub fn load(&self) -> Result<Option<Vec<Meal>>, ArchiveError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ArchiveError::Io(self.path.clone(), e)),
        };

        let meals =
            decode_archive(&bytes).map_err(|e| ArchiveError::Decode(self.path.clone(), e))?;

        tracing::debug!("Loaded {} meal(s) from {}", meals.len(), self.path.display());
        Ok(Some(meals))
    }

    /// Saves `meals` as the new archive content.
    ///
    /// Creates the parent directory if needed. The file is written to a
    /// temporary sibling and renamed into place, so readers see either the
    /// previous archive or the new one.
    pub fn save(&self, meals: &[Meal]) -> Result<(), ArchiveError> {
        let bytes = encode_archive(meals)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::Io(parent.to_path_buf(), e))?;
        }

        let temp_path = self.path.with_extension("automerge.tmp");
        if let Err(e) = write_synced(&temp_path, &bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(ArchiveError::Io(temp_path, e));
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(ArchiveError::Io(self.path.clone(), e));
        }

        tracing::debug!("Saved {} meal(s) to {}", meals.len(), self.path.display());
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
