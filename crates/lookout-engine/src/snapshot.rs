//! Last-observed state of every note file, the baseline change detection diffs against.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// What was last seen for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub modified: DateTime<Utc>,
    pub size: u64,
    /// Non-empty line count as of the last recorded change
    pub lines: usize,
}

/// Per-path snapshot cache.
///
/// Entries are never evicted; a deleted file's entry simply stops being
/// looked up because the path no longer shows up in scans.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    entries: HashMap<PathBuf, SnapshotEntry>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&SnapshotEntry> {
        self.entries.get(path)
    }

    pub fn put(&mut self, path: impl Into<PathBuf>, entry: SnapshotEntry) {
        self.entries.insert(path.into(), entry);
    }

    /// Overwrite the modification time and size of a path, keeping its line count.
    ///
    /// A path seen for the first time gets a line count of zero.
    pub fn touch(&mut self, path: &Path, modified: DateTime<Utc>, size: u64) {
        match self.entries.get_mut(path) {
            Some(entry) => {
                entry.modified = modified;
                entry.size = size;
            }
            None => self.put(
                path,
                SnapshotEntry {
                    modified,
                    size,
                    lines: 0,
                },
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_put_and_get() {
        let mut store = SnapshotStore::new();
        assert!(store.get(Path::new("/ws/a.md")).is_none());

        let entry = SnapshotEntry {
            modified: at(100),
            size: 42,
            lines: 3,
        };
        store.put("/ws/a.md", entry);

        assert_eq!(store.get(Path::new("/ws/a.md")), Some(&entry));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_touch_keeps_line_count() {
        let mut store = SnapshotStore::new();
        store.put(
            "/ws/a.md",
            SnapshotEntry {
                modified: at(100),
                size: 42,
                lines: 7,
            },
        );

        store.touch(Path::new("/ws/a.md"), at(90), 40);

        let entry = store.get(Path::new("/ws/a.md")).unwrap();
        assert_eq!(entry.modified, at(90));
        assert_eq!(entry.size, 40);
        assert_eq!(entry.lines, 7);
    }

    #[test]
    fn test_touch_inserts_unknown_path() {
        let mut store = SnapshotStore::new();
        store.touch(Path::new("/ws/new.md"), at(5), 1);
        assert_eq!(store.get(Path::new("/ws/new.md")).unwrap().lines, 0);
        assert!(!store.is_empty());
    }
}
