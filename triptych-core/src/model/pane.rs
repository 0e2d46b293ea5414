//! `src/model/pane.rs`
//! ============================================================================
//! # `PaneModel`: deriving the three panes from one cursor
//!
//! Parent listing, current listing, and preview target are all pure
//! functions of `CursorState` plus the hidden-visibility flag. Nothing
//! here mutates the filesystem, so the derivation is safe to re-run after
//! every operation without tracking what changed.

use std::path::PathBuf;

use compact_str::CompactString;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::warn;

use crate::config::PreviewConfig;
use crate::error::AppError;
use crate::fs::classifier::{EntryClass, EntryClassifier};
use crate::fs::entry::{DirectorySnapshot, EntryInfo};
use crate::fs::gateway::FileSystemGateway;
use crate::model::cursor::CursorState;

/// Directory previews stop after this many entries.
pub const DIR_PREVIEW_CAP: usize = 50;

/// What the preview pane should show for the selected entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewTarget {
    /// Current listing is empty, nothing to preview.
    NoSelection,

    /// Selected entry is a directory; `more` counts entries past the cap.
    Directory {
        listing: DirectorySnapshot,
        more: usize,
    },

    /// Bounded prefix of a text file.
    Text { lines: Vec<String>, truncated: bool },

    /// Classified binary, not read.
    Binary { extension: Option<CompactString> },

    /// Text-classified but beyond the preview read budget.
    TooLarge { size: u64 },

    /// The entry could not be read (permissions, vanished mid-render).
    Unreadable,
}

/// One consistent, fully-derived view of all three panes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneSnapshot {
    pub cwd: PathBuf,

    /// Listing of the parent directory; `None` at a filesystem root.
    pub parent: Option<DirectorySnapshot>,

    /// Index of `cwd` inside `parent`, for highlighting.
    pub parent_highlight: Option<usize>,

    pub current: DirectorySnapshot,

    /// Validated selection into `current`.
    pub selected: Option<usize>,

    pub preview: PreviewTarget,
}

#[derive(Debug, Clone, Copy)]
pub struct PaneModel<'a> {
    gateway: &'a FileSystemGateway,
    classifier: &'a EntryClassifier,
    preview: &'a PreviewConfig,
}

impl<'a> PaneModel<'a> {
    #[must_use]
    pub const fn new(
        gateway: &'a FileSystemGateway,
        classifier: &'a EntryClassifier,
        preview: &'a PreviewConfig,
    ) -> Self {
        Self {
            gateway,
            classifier,
            preview,
        }
    }

    /// Derive all three panes. Fails only when the current directory
    /// itself cannot be listed; an unreadable parent degrades to an
    /// absent parent pane.
    pub async fn derive(
        &self,
        cursor: &CursorState,
        show_hidden: bool,
    ) -> Result<PaneSnapshot, AppError> {
        let current = self.gateway.list(&cursor.cwd, show_hidden).await?;
        let selected = cursor.selected.filter(|i| *i < current.len());

        let (parent, parent_highlight) = match cursor.cwd.parent() {
            None => (None, None),

            Some(parent_dir) => match self.gateway.list(parent_dir, show_hidden).await {
                Ok(snap) => {
                    let highlight = snap.position_of(&cursor.cwd);
                    (Some(snap), highlight)
                }

                Err(e) => {
                    warn!("Parent listing failed for {:?}: {}", parent_dir, e);
                    (None, None)
                }
            },
        };

        let preview = match selected.and_then(|i| current.get(i)) {
            None => PreviewTarget::NoSelection,
            Some(entry) => self.preview_for(entry, show_hidden).await,
        };

        Ok(PaneSnapshot {
            cwd: cursor.cwd.clone(),
            parent,
            parent_highlight,
            current,
            selected,
            preview,
        })
    }

    async fn preview_for(&self, entry: &EntryInfo, show_hidden: bool) -> PreviewTarget {
        match self.classifier.classify(entry) {
            EntryClass::Directory => match self.gateway.list(&entry.path, show_hidden).await {
                Ok(mut listing) => {
                    let more = listing.len().saturating_sub(DIR_PREVIEW_CAP);
                    listing.entries.truncate(DIR_PREVIEW_CAP);

                    PreviewTarget::Directory { listing, more }
                }

                Err(_) => PreviewTarget::Unreadable,
            },

            EntryClass::BinaryFile => PreviewTarget::Binary {
                extension: entry.extension.clone(),
            },

            EntryClass::TextFile => {
                if entry.size > self.preview.max_bytes {
                    return PreviewTarget::TooLarge { size: entry.size };
                }

                self.read_text_prefix(&entry.path).await
            }
        }
    }

    async fn read_text_prefix(&self, path: &std::path::Path) -> PreviewTarget {
        let Ok(file) = File::open(path).await else {
            return PreviewTarget::Unreadable;
        };

        let mut raw: Vec<u8> = Vec::new();
        if file
            .take(self.preview.max_bytes)
            .read_to_end(&mut raw)
            .await
            .is_err()
        {
            return PreviewTarget::Unreadable;
        }

        let text = String::from_utf8_lossy(&raw);

        let mut lines: Vec<String> = Vec::new();
        let mut truncated = false;

        for (i, line) in text.lines().enumerate() {
            if i >= self.preview.max_lines {
                truncated = true;
                break;
            }

            // Char-based cut keeps multi-byte content on valid boundaries.
            lines.push(line.chars().take(self.preview.max_line_len).collect());
        }

        PreviewTarget::Text { lines, truncated }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn classifier() -> EntryClassifier {
        EntryClassifier::new(["png", "bin"])
    }

    fn preview_cfg() -> PreviewConfig {
        PreviewConfig {
            max_lines: 3,
            max_line_len: 5,
            max_bytes: 1024,
        }
    }

    #[tokio::test]
    async fn derive_builds_all_three_panes() {
        let tmp = TempDir::new().unwrap();
        let child = tmp.path().join("child");
        fs::create_dir(&child).unwrap();
        fs::write(child.join("note.txt"), "hello\nworld").unwrap();
        fs::write(child.join("image.png"), [0u8, 1, 2]).unwrap();

        let gw = FileSystemGateway::new();
        let cl = classifier();
        let pv = preview_cfg();
        let model = PaneModel::new(&gw, &cl, &pv);

        let mut cursor = CursorState::new(child.clone());
        cursor.clamp_to(2);

        let snap = model.derive(&cursor, false).await.unwrap();

        assert_eq!(snap.cwd, child);
        assert_eq!(snap.current.len(), 2);
        assert_eq!(snap.selected, Some(0));

        let parent = snap.parent.expect("child has a parent");
        assert_eq!(snap.parent_highlight, parent.position_of(&child));
    }

    #[tokio::test]
    async fn preview_of_text_file_is_bounded() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("long.txt"),
            "abcdefghij\nsecond\nthird\nfourth\n",
        )
        .unwrap();

        let gw = FileSystemGateway::new();
        let cl = classifier();
        let pv = preview_cfg();
        let model = PaneModel::new(&gw, &cl, &pv);

        let mut cursor = CursorState::new(tmp.path().to_path_buf());
        cursor.clamp_to(1);

        let snap = model.derive(&cursor, false).await.unwrap();
        match snap.preview {
            PreviewTarget::Text { lines, truncated } => {
                assert_eq!(lines, vec!["abcde", "secon", "third"]);
                assert!(truncated);
            }
            other => panic!("expected text preview, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn preview_of_binary_extension_is_not_read() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("blob.bin"), [0u8; 16]).unwrap();

        let gw = FileSystemGateway::new();
        let cl = classifier();
        let pv = preview_cfg();
        let model = PaneModel::new(&gw, &cl, &pv);

        let mut cursor = CursorState::new(tmp.path().to_path_buf());
        cursor.clamp_to(1);

        let snap = model.derive(&cursor, false).await.unwrap();
        assert!(matches!(snap.preview, PreviewTarget::Binary { .. }));
    }

    #[tokio::test]
    async fn oversized_text_file_previews_as_too_large() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("big.txt"), vec![b'a'; 4096]).unwrap();

        let gw = FileSystemGateway::new();
        let cl = classifier();
        let pv = preview_cfg();
        let model = PaneModel::new(&gw, &cl, &pv);

        let mut cursor = CursorState::new(tmp.path().to_path_buf());
        cursor.clamp_to(1);

        let snap = model.derive(&cursor, false).await.unwrap();
        assert_eq!(snap.preview, PreviewTarget::TooLarge { size: 4096 });
    }

    #[tokio::test]
    async fn empty_directory_has_no_selection_marker() {
        let tmp = TempDir::new().unwrap();

        let gw = FileSystemGateway::new();
        let cl = classifier();
        let pv = preview_cfg();
        let model = PaneModel::new(&gw, &cl, &pv);

        let mut cursor = CursorState::new(tmp.path().to_path_buf());
        cursor.clamp_to(0);

        let snap = model.derive(&cursor, false).await.unwrap();
        assert_eq!(snap.selected, None);
        assert_eq!(snap.preview, PreviewTarget::NoSelection);
    }
}
