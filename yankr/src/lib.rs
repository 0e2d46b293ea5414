//! # yankr - Single-Slot Yank/Paste Clipboard
//!
//! A process-lifetime clipboard for file managers holding at most one
//! pending yank: a source path plus a copy-or-cut mode. Yanking overwrites
//! any previous slot, cancelling empties it, and a successful cut-paste
//! empties it while a copy-paste leaves it intact for repeated pastes.
//!
//! Source validation is deliberately lazy: the slot never touches the
//! filesystem, so a yanked path that disappears while the user navigates is
//! a paste-time error for the caller, not a yank-time one.

pub mod error;
pub mod slot;

// Re-export main types for easy use
pub use error::{YankError, YankResult};
pub use slot::{YankMode, YankSlot, YankedEntry};
