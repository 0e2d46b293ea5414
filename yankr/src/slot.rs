use crate::error::{YankError, YankResult};
use std::path::{Path, PathBuf};

/// How a pending paste will treat the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YankMode {
    /// Paste duplicates the source; the slot survives for repeat pastes.
    Copy,

    /// Paste moves the source; the slot empties once the move is confirmed.
    Cut,
}

impl YankMode {
    /// Short tag for status-line indicators.
    #[must_use]
    pub const fn indicator(self) -> &'static str {
        match self {
            Self::Copy => "yank",
            Self::Cut => "cut",
        }
    }
}

/// The content of a non-empty slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YankedEntry {
    pub source: PathBuf,
    pub mode: YankMode,
}

impl YankedEntry {
    /// File name of the yanked source, for display.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.source
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("?")
    }

    /// Paste destination inside `dest_dir`: `dest_dir / basename(source)`.
    pub fn destination_in(&self, dest_dir: &Path) -> YankResult<PathBuf> {
        let file_name = self
            .source
            .file_name()
            .ok_or_else(|| YankError::NoFileName(self.source.clone()))?;

        Ok(dest_dir.join(file_name))
    }
}

/// At most one pending yank, owned by the controller for the process
/// lifetime. Navigation never clears it.
///
/// Transitions: `Empty --yank--> Holding`, `Holding --yank--> Holding`
/// (overwrite), `Holding --cancel--> Empty`, `Holding(cut) --settled
/// paste--> Empty`, `Holding(copy) --settled paste--> Holding(copy)`.
#[derive(Debug, Default)]
pub struct YankSlot {
    entry: Option<YankedEntry>,
}

impl YankSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the slot, unconditionally replacing any previous yank.
    pub fn yank(&mut self, source: PathBuf, mode: YankMode) {
        self.entry = Some(YankedEntry { source, mode });
    }

    /// Clear the slot.
    pub fn cancel(&mut self) {
        self.entry = None;
    }

    #[must_use]
    pub fn peek(&self) -> Option<&YankedEntry> {
        self.entry.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// Apply the slot transition for a paste confirmed successful: a cut
    /// empties, a copy stays. Must only be called after the filesystem
    /// operation has succeeded, so a failed cut-paste remains retryable.
    pub fn settle_paste(&mut self) {
        if self.entry.as_ref().map(|e| e.mode) == Some(YankMode::Cut) {
            self.entry = None;
        }
    }
}
