//! `src/fs/entry.rs`
//! ============================================================
//! Directory entry metadata and the ordered, point-in-time snapshot the
//! panes render from. Snapshots are transient: recomputed on every
//! navigation or mutating operation, never cached across writes.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs::{FileType, Metadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytesize::ByteSize;
use chrono::{DateTime, Local, TimeZone};
use compact_str::CompactString;
use tokio::fs as tokio_fs;

use crate::error::AppError;

/// Metadata for a single directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Shared absolute path.
    pub path: Arc<PathBuf>,

    /// File or directory name.
    pub name: CompactString,

    /// Lower-case extension (files only).
    pub extension: Option<CompactString>,

    /// Byte length; zero for directories.
    pub size: u64,

    /// Last-modification timestamp.
    pub modified: SystemTime,

    pub is_dir: bool,
    pub is_symlink: bool,
}

impl EntryInfo {
    /// Hidden by the platform convention of a leading dot.
    #[inline]
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// Human-readable size string.
    #[inline]
    #[must_use]
    pub fn size_human(&self) -> String {
        ByteSize::b(self.size).to_string()
    }

    /// Format the modification date.
    #[expect(clippy::cast_possible_wrap, reason = "Expected")]
    #[must_use]
    pub fn format_date(&self, fmt: &str) -> String {
        let dur: Duration = self
            .modified
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| Duration::from_secs(0));

        let dt: DateTime<Local> = Local
            .timestamp_opt(dur.as_secs() as i64, dur.subsec_nanos())
            .single()
            .unwrap_or_else(Local::now);

        dt.format(fmt).to_string()
    }

    /// Constructor for scan loops.
    pub async fn from_path(path: &Path) -> Result<Self, AppError> {
        let meta: Metadata = tokio_fs::symlink_metadata(path).await?;

        Ok(Self::from_meta(path, &meta))
    }

    fn from_meta(path: &Path, meta: &Metadata) -> Self {
        let ftype: FileType = meta.file_type();
        let is_dir: bool = ftype.is_dir();

        let name: CompactString =
            CompactString::new(path.file_name().and_then(OsStr::to_str).unwrap_or(""));

        let ext: Option<CompactString> = if ftype.is_file() {
            path.extension()
                .and_then(OsStr::to_str)
                .map(|s| CompactString::new(s.to_lowercase()))
        } else {
            None
        };

        Self {
            path: Arc::new(path.to_path_buf()),
            name,
            extension: ext,
            size: if is_dir { 0 } else { meta.len() },
            modified: meta.modified().unwrap_or(UNIX_EPOCH),
            is_dir,
            is_symlink: ftype.is_symlink(),
        }
    }
}

/// Immutable, ordered listing of a directory at a point in time.
///
/// Ordering: directories before files, then case-insensitive lexical by
/// name, with an exact-name tiebreak so the order is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub dir: PathBuf,
    pub entries: Vec<EntryInfo>,
}

impl DirectorySnapshot {
    #[must_use]
    pub fn new(dir: PathBuf, mut entries: Vec<EntryInfo>) -> Self {
        sort_entries(&mut entries);
        Self { dir, entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&EntryInfo> {
        self.entries.get(index)
    }

    /// Index of the entry whose path equals `path`, if present.
    #[must_use]
    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.path.as_path() == path)
    }

    /// (directories, files) counts for the status bar.
    #[must_use]
    pub fn counts(&self) -> (usize, usize) {
        let dirs = self.entries.iter().filter(|e| e.is_dir).count();
        (dirs, self.entries.len() - dirs)
    }
}

/// Sort entries: directories first, then case-insensitive by name.
pub(crate) fn sort_entries(entries: &mut [EntryInfo]) {
    entries.sort_by(|a: &EntryInfo, b: &EntryInfo| -> Ordering {
        if a.is_dir && !b.is_dir {
            Ordering::Less
        } else if !a.is_dir && b.is_dir {
            Ordering::Greater
        } else {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool) -> EntryInfo {
        EntryInfo {
            path: Arc::new(PathBuf::from(format!("/x/{name}"))),
            name: CompactString::new(name),
            extension: None,
            size: 0,
            modified: UNIX_EPOCH,
            is_dir,
            is_symlink: false,
        }
    }

    #[test]
    fn directories_sort_before_files_case_insensitively() {
        let snap = DirectorySnapshot::new(
            PathBuf::from("/x"),
            vec![
                entry("zeta.txt", false),
                entry("Alpha", true),
                entry("beta", true),
                entry("Echo.txt", false),
            ],
        );

        let names: Vec<&str> = snap.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta", "Echo.txt", "zeta.txt"]);
    }

    #[test]
    fn hidden_follows_leading_dot() {
        assert!(entry(".git", true).is_hidden());
        assert!(!entry("src", true).is_hidden());
    }

    #[test]
    fn position_of_finds_exact_path() {
        let snap = DirectorySnapshot::new(
            PathBuf::from("/x"),
            vec![entry("a", true), entry("b.txt", false)],
        );

        assert_eq!(snap.position_of(Path::new("/x/b.txt")), Some(1));
        assert_eq!(snap.position_of(Path::new("/x/missing")), None);
    }

    #[test]
    fn counts_split_dirs_and_files() {
        let snap = DirectorySnapshot::new(
            PathBuf::from("/x"),
            vec![entry("a", true), entry("b", true), entry("c.txt", false)],
        );

        assert_eq!(snap.counts(), (2, 1));
    }
}
