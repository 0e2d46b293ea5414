//! `src/model/cursor.rs`
//! ============================================================================
//! # `CursorState`: current directory plus selection index
//!
//! The index always points into the filtered (hidden-aware) listing, or is
//! `None` when the directory has no visible entries. It clamps on shrink
//! rather than erroring, so a delete of the last entry is always safe.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorState {
    /// The working directory the cursor lives in.
    pub cwd: PathBuf,

    /// Selected index into the current listing; `None` means empty.
    pub selected: Option<usize>,
}

impl CursorState {
    #[must_use]
    pub const fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            selected: None,
        }
    }

    /// Re-fit the selection to a listing of `len` entries.
    pub fn clamp_to(&mut self, len: usize) {
        self.selected = if len == 0 {
            None
        } else {
            Some(self.selected.unwrap_or(0).min(len - 1))
        };
    }

    /// Move the selection by `delta`, saturating at both ends.
    pub fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }

        let current = self.selected.unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.selected = Some(next as usize);
    }

    pub fn select_first(&mut self, len: usize) {
        self.selected = if len == 0 { None } else { Some(0) };
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = if len == 0 { None } else { Some(len - 1) };
    }

    /// Enter a different directory, resetting the selection.
    pub fn enter(&mut self, dir: PathBuf) {
        self.cwd = dir;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor() -> CursorState {
        CursorState::new(PathBuf::from("/tmp"))
    }

    #[test]
    fn clamp_shrinks_to_last_entry() {
        let mut c = cursor();
        c.selected = Some(9);
        c.clamp_to(4);
        assert_eq!(c.selected, Some(3));
    }

    #[test]
    fn clamp_to_empty_listing_is_none() {
        let mut c = cursor();
        c.selected = Some(2);
        c.clamp_to(0);
        assert_eq!(c.selected, None);
    }

    #[test]
    fn move_saturates_at_both_ends() {
        let mut c = cursor();
        c.clamp_to(3);

        c.move_by(-5, 3);
        assert_eq!(c.selected, Some(0));

        c.move_by(10, 3);
        assert_eq!(c.selected, Some(2));

        c.move_by(-1, 3);
        assert_eq!(c.selected, Some(1));
    }

    #[test]
    fn first_and_last_respect_len() {
        let mut c = cursor();
        c.select_last(5);
        assert_eq!(c.selected, Some(4));

        c.select_first(5);
        assert_eq!(c.selected, Some(0));

        c.select_last(0);
        assert_eq!(c.selected, None);
    }
}
