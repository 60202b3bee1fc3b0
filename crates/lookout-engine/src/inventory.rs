//! Best-effort listing of the note files in a workspace.
//!
//! An inventory is a fresh, non-transactional snapshot: files that vanish,
//! cannot be stat'ed or carry an unrepresentable mtime are skipped. Symlinked
//! notes are listed under the link's own path. Only failing to read the
//! workspace root itself is reported as an error.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use lookout_core::{LookoutError, Result};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::text;

/// One note file as observed by a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    pub size: u64,
}

/// All note files of one workspace, sorted by path.
#[derive(Debug, Clone, Default)]
pub struct FileInventory {
    root: Option<PathBuf>,
    files: Vec<FileRecord>,
}

impl FileInventory {
    /// Inventory of an absent workspace.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Recursively list files with the given extension under `workspace`.
    ///
    /// An absent workspace yields an empty inventory.
    pub fn scan(workspace: Option<&Path>, extension: &str) -> Result<Self> {
        let Some(root) = workspace else {
            return Ok(Self::empty());
        };

        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(LookoutError::WorkspaceScan {
                        path: root.to_path_buf(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable workspace entry");
                    continue;
                }
            };

            if entry.file_type().is_dir() || !has_extension(entry.path(), extension) {
                continue;
            }
            if let Some(record) = record(entry) {
                files.push(record);
            }
        }

        Ok(Self {
            root: Some(root.to_path_buf()),
            files,
        })
    }

    /// Workspace root, `None` for an absent workspace.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of file sizes as reported by the scan.
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Sum of decoded character counts. Reads every file; unreadable files count as zero.
    pub fn total_chars(&self) -> u64 {
        self.files
            .iter()
            .filter_map(|f| text::read_lossy(&f.path))
            .map(|content| content.chars().count() as u64)
            .sum()
    }

    /// Most recently modified file; the first one in path order wins ties.
    pub fn latest(&self) -> Option<&FileRecord> {
        self.files.iter().fold(None, |best: Option<&FileRecord>, file| match best {
            Some(b) if b.modified >= file.modified => Some(b),
            _ => Some(file),
        })
    }

    /// Display path relative to the workspace root, or the bare file name.
    pub fn relative_path(&self, path: &Path) -> String {
        self.root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .map(|rel| rel.to_string_lossy().into_owned())
            .unwrap_or_else(|| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

/// Stat a walked entry, following a symlink to its target.
fn record(entry: DirEntry) -> Option<FileRecord> {
    let meta: std::result::Result<Metadata, String> = if entry.path_is_symlink() {
        std::fs::metadata(entry.path()).map_err(|e| e.to_string())
    } else {
        entry.metadata().map_err(|e| e.to_string())
    };

    let meta = match meta {
        Ok(meta) if meta.is_file() => meta,
        Ok(_) => return None,
        Err(e) => {
            debug!(path = %entry.path().display(), error = %e, "Stat failed, skipping");
            return None;
        }
    };

    let modified = match meta.modified() {
        Ok(modified) => modified,
        Err(e) => {
            debug!(path = %entry.path().display(), error = %e, "No mtime, skipping");
            return None;
        }
    };
    let Some(modified) = to_utc(modified) else {
        debug!(path = %entry.path().display(), "Mtime out of range, skipping");
        return None;
    };

    Some(FileRecord {
        path: entry.into_path(),
        modified,
        size: meta.len(),
    })
}

/// Convert a filesystem timestamp, `None` when chrono cannot represent it.
fn to_utc(time: SystemTime) -> Option<DateTime<Utc>> {
    let (secs, nanos) = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => (i64::try_from(after.as_secs()).ok()?, after.subsec_nanos()),
        Err(before) => {
            let before = before.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => (-secs, 0),
                n => (-secs - 1, 1_000_000_000 - n),
            }
        }
    };
    DateTime::from_timestamp(secs, nanos)
}
