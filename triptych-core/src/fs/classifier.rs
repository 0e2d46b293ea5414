//! `src/fs/classifier.rs`
//! ============================================================
//! Extension-based text/binary classification for the preview pane.
//!
//! The extension set is injected from config rather than hardcoded so an
//! alternate strategy (content sniffing) can replace it behind the same
//! call. Known limitation: a text-looking extension on binary content is
//! misclassified.

use std::collections::HashSet;
use std::path::Path;

use compact_str::CompactString;

use crate::config::Config;
use crate::fs::entry::EntryInfo;

/// Classification of a selected entry, as consumed by the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    Directory,
    TextFile,
    BinaryFile,
}

#[derive(Debug, Clone)]
pub struct EntryClassifier {
    binary_extensions: HashSet<CompactString>,
}

impl EntryClassifier {
    /// Build from an extension list. Entries are lowercased and a leading
    /// dot is stripped, so both `"PNG"` and `".png"` are accepted.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let binary_extensions = extensions
            .into_iter()
            .map(|s| CompactString::new(s.as_ref().trim_start_matches('.').to_lowercase()))
            .collect();

        Self { binary_extensions }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.binary_extensions.iter())
    }

    #[must_use]
    pub fn classify(&self, entry: &EntryInfo) -> EntryClass {
        if entry.is_dir {
            return EntryClass::Directory;
        }

        match &entry.extension {
            Some(ext) if self.binary_extensions.contains(ext) => EntryClass::BinaryFile,
            // Unknown or missing extension defaults to text.
            _ => EntryClass::TextFile,
        }
    }

    /// Classify a bare path when no `EntryInfo` is at hand.
    #[must_use]
    pub fn classify_path(&self, path: &Path, is_dir: bool) -> EntryClass {
        if is_dir {
            return EntryClass::Directory;
        }

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| CompactString::new(s.to_lowercase()));

        match ext {
            Some(ext) if self.binary_extensions.contains(&ext) => EntryClass::BinaryFile,
            _ => EntryClass::TextFile,
        }
    }
}
