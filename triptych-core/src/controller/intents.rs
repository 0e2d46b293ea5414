//! src/controller/intents.rs
//! ============================================================================
//! # Intents: Centralized User Commands
//!
//! The `Intent` enum abstracts keybindings into meaningful commands, the
//! single interface the `NavigationController` processes. Destructive
//! intents (`Delete`, `Paste { overwrite: true }`) arrive pre-confirmed;
//! confirmation dialogs are the presentation layer's job.

use std::path::PathBuf;

use yankr::YankMode;

use crate::error::AppError;

/// A high-level command for the navigation controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Move the selection by a signed delta.
    MoveCursor(isize),

    /// Enter the selected directory.
    Descend,

    /// Go to the parent directory.
    Ascend,

    /// Jump to the first entry.
    JumpTop,

    /// Jump to the last entry.
    JumpBottom,

    /// Jump to the user home directory.
    GoHome,

    /// Toggle dotfile visibility.
    ToggleHidden,

    /// Mark the selected entry as the pending paste source.
    Yank(YankMode),

    /// Clear the pending yank.
    CancelYank,

    /// Interrupt the mutating operation currently in flight.
    CancelOperation,

    /// Paste the pending yank into the current directory.
    Paste { overwrite: bool },

    /// Create an entry named `name` here; a trailing separator means a
    /// directory.
    Create(String),

    /// Rename the selected entry within its own directory.
    Rename(String),

    /// Delete the selected entry (already confirmed).
    Delete,

    /// Hand the selected path to the external editor collaborator.
    OpenInEditor,

    /// Re-list the current directory.
    Reload,

    /// Quit the application.
    Quit,
}

/// What kind of mutation an engine task performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Rename,
    Delete,
    PasteCopy,
    PasteCut,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: &'static str = match self {
            Self::Create => "create",
            Self::Rename => "rename",
            Self::Delete => "delete",
            Self::PasteCopy => "paste",
            Self::PasteCut => "move",
        };

        write!(f, "{s}")
    }
}

/// Result of a mutating operation. Produced by every engine task and
/// forwarded unchanged to the presentation boundary; failures are never
/// silently dropped.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub kind: OperationKind,

    /// The path the operation affected (destination for pastes/renames).
    pub path: PathBuf,

    pub result: Result<(), AppError>,
}

impl OperationOutcome {
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}
