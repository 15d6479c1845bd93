//! Flat-file target store.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::format::{check_header, decode_row, encode_row, header_row, records};
use super::{fresh_id, StoreStats, TargetRepository};
use crate::error::{Error, Result};
use crate::target::{NewTarget, Target, TargetPatch};

/// Target store backed by a single CSV file.
///
/// Holds no records in memory between calls: every read parses the file and
/// every mutation rewrites it in full. The rewrite goes to a sibling temporary
/// file which is synced and then renamed over the backing file.
#[derive(Debug, Clone)]
pub struct CsvStore {
    /// Path to the backing file.
    path: PathBuf,
}

impl CsvStore {
    /// Create a store for the given path without touching the file system.
    ///
    /// The backing file is created lazily on first use.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Open a store, creating parent directories and the backing file if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories or file cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self::new(path);
        store.initialize()?;
        info!("Target store opened at {}", store.path.display());
        Ok(store)
    }

    /// Get the path to the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        match self.path.file_name() {
            Some(name) => {
                let mut temp = name.to_os_string();
                temp.push(".tmp");
                self.path.with_file_name(temp)
            }
            None => self.path.with_extension("tmp"),
        }
    }

    fn read_all(&self) -> Result<Vec<Target>> {
        self.initialize()?;

        debug!("Reading targets from {}", self.path.display());
        let contents = fs::read_to_string(&self.path).map_err(|source| Error::StorageRead {
            path: self.path.clone(),
            source,
        })?;

        let mut rows = records(&contents).into_iter();

        let Some((line_no, header)) = rows.next() else {
            return Ok(Vec::new());
        };
        check_header(&header).map_err(|msg| Error::corrupt_record(&self.path, line_no, msg))?;

        let targets = rows
            .map(|(line_no, row)| {
                decode_row(&row).map_err(|msg| Error::corrupt_record(&self.path, line_no, msg))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Found {} targets", targets.len());
        Ok(targets)
    }

    /// Replace the backing file with `targets`.
    ///
    /// On failure the temporary file is removed and the backing file is left
    /// as it was.
    fn write_all(&self, targets: &[Target]) -> Result<()> {
        let temp_path = self.temp_path();
        let result = write_temp(&temp_path, targets).and_then(|()| fs::rename(&temp_path, &self.path));

        if let Err(source) = result {
            warn!("Rewrite of {} failed: {source}", self.path.display());
            let _ = fs::remove_file(&temp_path);
            return Err(Error::StorageWrite {
                path: self.path.clone(),
                source,
            });
        }

        debug!(
            "Wrote {} targets to {}",
            targets.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn write_temp(temp_path: &Path, targets: &[Target]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(temp_path)?);
    writeln!(writer, "{}", header_row())?;
    for target in targets {
        writeln!(writer, "{}", encode_row(target))?;
    }
    let file = writer.into_inner().map_err(std::io::IntoInnerError::into_error)?;
    file.sync_all()
}

impl TargetRepository for CsvStore {
    fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        if !self.path.exists() {
            info!("Creating new target file: {}", self.path.display());
            self.write_all(&[])?;
        }
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Target>> {
        self.read_all()
    }

    fn create(&self, new: NewTarget) -> Result<Target> {
        let mut targets = self.read_all()?;
        let target = Target::from_new(fresh_id(&targets), new);
        targets.push(target.clone());
        self.write_all(&targets)?;

        info!(id = %target.id, "Target created");
        Ok(target)
    }

    fn update(&self, id: &str, patch: &TargetPatch) -> Result<Option<Target>> {
        let mut targets = self.read_all()?;
        let Some(target) = targets.iter_mut().find(|t| t.id == id) else {
            warn!(id = %id, "Target not found for update");
            return Ok(None);
        };

        patch.apply(target);
        let updated = target.clone();
        self.write_all(&targets)?;

        info!(id = %id, fields = ?patch.fields(), "Target updated");
        Ok(Some(updated))
    }

    fn delete(&self, id: &str) -> Result<Option<Target>> {
        let mut targets = self.read_all()?;
        let Some(index) = targets.iter().position(|t| t.id == id) else {
            warn!(id = %id, "Target not found for deletion");
            return Ok(None);
        };

        let removed = targets.remove(index);
        self.write_all(&targets)?;

        info!(id = %id, "Target deleted");
        Ok(Some(removed))
    }

    fn stats(&self) -> Result<StoreStats> {
        let total_targets = self.read_all()?.len();
        let metadata = fs::metadata(&self.path).map_err(|source| Error::StorageRead {
            path: self.path.clone(),
            source,
        })?;

        Ok(StoreStats {
            total_targets,
            file_size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }
}
