//! `src/controller/navigator.rs`
//! ============================================================================
//! # `NavigationController`: intent dispatch over cursor, slot, and engine
//!
//! Owns the authoritative navigation state: one cursor, one yank slot, and
//! at most one running mutating operation. Navigation intents apply
//! immediately; mutating intents go through the `FileOperationEngine` and
//! come back as outcomes the caller feeds into `absorb_outcome`. While an
//! operation is in flight every further mutating intent is rejected as
//! `Busy` instead of queued.

use std::path::{Path, PathBuf};

use directories::UserDirs;
use tracing::{debug, info};

use yankr::{YankMode, YankSlot, YankedEntry};

use crate::config::Config;
use crate::controller::intents::{Intent, OperationKind, OperationOutcome};
use crate::error::AppError;
use crate::fs::classifier::EntryClassifier;
use crate::fs::entry::{DirectorySnapshot, EntryInfo};
use crate::fs::gateway::FileSystemGateway;
use crate::model::cursor::CursorState;
use crate::model::pane::{PaneModel, PaneSnapshot};
use crate::ops::engine::{FileOperationEngine, RunningOperation};

/// What the presentation layer should do after an intent was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleResult {
    /// State changed; re-derive the panes and redraw.
    Redraw,

    /// A mutating operation is already in flight; the intent was dropped.
    Busy,

    /// Suspend the terminal and run the external editor on this path.
    Editor(PathBuf),

    /// Tear down and exit.
    Quit,

    /// Nothing to do.
    Noop,
}

/// Status-line summary of the pending yank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardStatus {
    pub mode: YankMode,
    pub name: String,
}

/// Everything the view needs for one frame, derived in one place so the
/// renderer stays free of filesystem access.
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    pub panes: PaneSnapshot,
    pub show_hidden: bool,
    pub clipboard: Option<ClipboardStatus>,

    /// Kind of the operation currently in flight, if any.
    pub busy: Option<OperationKind>,
}

#[derive(Debug)]
pub struct NavigationController {
    gateway: FileSystemGateway,
    classifier: EntryClassifier,
    config: Config,
    show_hidden: bool,
    cursor: CursorState,
    listing: DirectorySnapshot,
    slot: YankSlot,
    engine: FileOperationEngine,
    running: Option<RunningOperation>,
}

impl NavigationController {
    /// Start in `start_dir`, which must be listable.
    pub async fn new(
        start_dir: PathBuf,
        config: Config,
        engine: FileOperationEngine,
    ) -> Result<Self, AppError> {
        let gateway = FileSystemGateway::new();
        let listing = gateway.list(&start_dir, config.show_hidden).await?;

        let mut cursor = CursorState::new(start_dir);
        cursor.clamp_to(listing.len());

        Ok(Self {
            gateway,
            classifier: EntryClassifier::from_config(&config),
            show_hidden: config.show_hidden,
            config,
            cursor,
            listing,
            slot: YankSlot::new(),
            engine,
            running: None,
        })
    }

    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cursor.cwd
    }

    #[must_use]
    pub fn selected_entry(&self) -> Option<&EntryInfo> {
        self.cursor.selected.and_then(|i| self.listing.get(i))
    }

    #[must_use]
    pub fn yank_slot(&self) -> &YankSlot {
        &self.slot
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    /// Dispatch one intent against the current state.
    pub async fn handle(&mut self, intent: Intent) -> Result<HandleResult, AppError> {
        debug!("Handling intent: {:?}", intent);

        match intent {
            Intent::MoveCursor(delta) => {
                self.cursor.move_by(delta, self.listing.len());
                Ok(HandleResult::Redraw)
            }

            Intent::JumpTop => {
                self.cursor.select_first(self.listing.len());
                Ok(HandleResult::Redraw)
            }

            Intent::JumpBottom => {
                self.cursor.select_last(self.listing.len());
                Ok(HandleResult::Redraw)
            }

            Intent::Descend => self.descend().await,
            Intent::Ascend => self.ascend().await,
            Intent::GoHome => self.go_home().await,
            Intent::ToggleHidden => self.toggle_hidden().await,

            Intent::Yank(mode) => Ok(self.yank(mode)),

            Intent::CancelYank => {
                self.slot.cancel();
                Ok(HandleResult::Redraw)
            }

            Intent::CancelOperation => match &self.running {
                Some(op) if !op.is_finished() => {
                    info!("Interrupting running {}", op.kind());
                    op.cancel();
                    Ok(HandleResult::Redraw)
                }

                // Already finished or nothing running; the outcome (if
                // any) still arrives through the channel.
                _ => Ok(HandleResult::Noop),
            },

            Intent::Paste { overwrite } => self.paste(overwrite),
            Intent::Create(name) => self.create(name),
            Intent::Rename(new_name) => self.rename(new_name),
            Intent::Delete => self.delete(),

            Intent::OpenInEditor => Ok(self
                .selected_entry()
                .filter(|e| !e.is_dir)
                .map_or(HandleResult::Noop, |e| {
                    HandleResult::Editor(e.path.as_ref().clone())
                })),

            Intent::Reload => {
                self.refresh().await?;
                Ok(HandleResult::Redraw)
            }

            Intent::Quit => {
                if let Some(op) = &self.running {
                    info!("Quitting with a {} in flight; cancelling it", op.kind());
                    op.cancel();
                }

                Ok(HandleResult::Quit)
            }
        }
    }

    /// Fold a finished operation back into the navigation state. The slot
    /// transition for a cut happens here, strictly after success.
    pub async fn absorb_outcome(&mut self, outcome: &OperationOutcome) -> Result<(), AppError> {
        self.running = None;

        if outcome.succeeded() && outcome.kind == OperationKind::PasteCut {
            self.slot.settle_paste();
        }

        // Even a failed tree operation may have changed the directory.
        self.refresh().await
    }

    /// Derive the full frame for the renderer.
    pub async fn render_snapshot(&self) -> Result<RenderSnapshot, AppError> {
        let model = PaneModel::new(&self.gateway, &self.classifier, &self.config.preview);
        let panes = model.derive(&self.cursor, self.show_hidden).await?;

        Ok(RenderSnapshot {
            panes,
            show_hidden: self.show_hidden,
            clipboard: self.slot.peek().map(|e| ClipboardStatus {
                mode: e.mode,
                name: e.display_name().to_string(),
            }),
            busy: self.running.as_ref().map(RunningOperation::kind),
        })
    }

    async fn descend(&mut self) -> Result<HandleResult, AppError> {
        let Some(target) = self.selected_entry().filter(|e| e.is_dir) else {
            return Ok(HandleResult::Noop);
        };

        // List first, commit after: a failure leaves the cursor in place.
        let target = target.path.as_ref().clone();
        self.change_dir(target).await?;

        Ok(HandleResult::Redraw)
    }

    async fn ascend(&mut self) -> Result<HandleResult, AppError> {
        let Some(parent) = self.cursor.cwd.parent().map(Path::to_path_buf) else {
            return Ok(HandleResult::Noop);
        };

        let old_cwd = self.cursor.cwd.clone();
        self.change_dir(parent).await?;

        // Land on the directory we just left.
        if let Some(i) = self.listing.position_of(&old_cwd) {
            self.cursor.selected = Some(i);
        }

        Ok(HandleResult::Redraw)
    }

    async fn go_home(&mut self) -> Result<HandleResult, AppError> {
        let home = UserDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .ok_or_else(|| AppError::Other("Could not determine the home directory".into()))?;

        if home == self.cursor.cwd {
            return Ok(HandleResult::Noop);
        }

        self.change_dir(home).await?;
        Ok(HandleResult::Redraw)
    }

    async fn toggle_hidden(&mut self) -> Result<HandleResult, AppError> {
        self.show_hidden = !self.show_hidden;
        self.refresh().await?;
        Ok(HandleResult::Redraw)
    }

    fn yank(&mut self, mode: YankMode) -> HandleResult {
        let Some(entry) = self.selected_entry() else {
            return HandleResult::Noop;
        };

        let path = entry.path.as_ref().clone();
        info!("Yanked {:?} ({})", path, mode.indicator());
        self.slot.yank(path, mode);

        HandleResult::Redraw
    }

    fn paste(&mut self, overwrite: bool) -> Result<HandleResult, AppError> {
        if self.is_busy() {
            return Ok(HandleResult::Busy);
        }

        let entry: YankedEntry = self.slot.peek().ok_or(AppError::EmptyClipboard)?.clone();

        // The paste targets the directory the cursor is in now, not the
        // one the yank happened in.
        let into = self.cursor.cwd.clone();
        self.running = Some(self.engine.spawn_paste(entry, into, overwrite));

        Ok(HandleResult::Redraw)
    }

    fn create(&mut self, name: String) -> Result<HandleResult, AppError> {
        if self.is_busy() {
            return Ok(HandleResult::Busy);
        }

        self.running = Some(self.engine.spawn_create(name, self.cursor.cwd.clone()));
        Ok(HandleResult::Redraw)
    }

    fn rename(&mut self, new_name: String) -> Result<HandleResult, AppError> {
        if self.is_busy() {
            return Ok(HandleResult::Busy);
        }

        let Some(entry) = self.selected_entry() else {
            return Ok(HandleResult::Noop);
        };

        let path = entry.path.as_ref().clone();
        self.running = Some(self.engine.spawn_rename(path, new_name));

        Ok(HandleResult::Redraw)
    }

    fn delete(&mut self) -> Result<HandleResult, AppError> {
        if self.is_busy() {
            return Ok(HandleResult::Busy);
        }

        let Some(entry) = self.selected_entry() else {
            return Ok(HandleResult::Noop);
        };

        let path = entry.path.as_ref().clone();
        self.running = Some(self.engine.spawn_delete(path));

        Ok(HandleResult::Redraw)
    }

    /// Re-list the current directory, keeping the selection pinned to the
    /// same entry when it survived, clamping otherwise.
    async fn refresh(&mut self) -> Result<(), AppError> {
        let kept: Option<PathBuf> = self
            .selected_entry()
            .map(|e| e.path.as_ref().clone());

        self.listing = self
            .gateway
            .list(&self.cursor.cwd, self.show_hidden)
            .await?;

        match kept.and_then(|p| self.listing.position_of(&p)) {
            Some(i) => self.cursor.selected = Some(i),
            None => self.cursor.clamp_to(self.listing.len()),
        }

        Ok(())
    }

    async fn change_dir(&mut self, target: PathBuf) -> Result<(), AppError> {
        let listing = self.gateway.list(&target, self.show_hidden).await?;

        self.cursor.enter(target);
        self.listing = listing;
        self.cursor.clamp_to(self.listing.len());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    async fn controller(
        start: &Path,
    ) -> (NavigationController, UnboundedReceiver<OperationOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = FileOperationEngine::new(FileSystemGateway::new(), tx);
        let ctl = NavigationController::new(start.to_path_buf(), Config::default(), engine)
            .await
            .unwrap();

        (ctl, rx)
    }

    fn select_named(ctl: &mut NavigationController, name: &str) {
        let i = ctl
            .listing
            .entries
            .iter()
            .position(|e| e.name == name)
            .unwrap_or_else(|| panic!("no entry named {name}"));
        ctl.cursor.selected = Some(i);
    }

    #[tokio::test]
    async fn cut_paste_follows_the_cursor_across_navigation() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let c = tmp.path().join("c");
        fs::create_dir(&a).unwrap();
        fs::create_dir(&c).unwrap();
        fs::write(a.join("b.txt"), "payload").unwrap();

        let (mut ctl, mut rx) = controller(&a).await;

        select_named(&mut ctl, "b.txt");
        assert_eq!(ctl.handle(Intent::Yank(YankMode::Cut)).await.unwrap(), HandleResult::Redraw);

        // Navigation does not disturb the slot.
        ctl.handle(Intent::Ascend).await.unwrap();
        assert_eq!(ctl.selected_entry().unwrap().name, "a");
        select_named(&mut ctl, "c");
        ctl.handle(Intent::Descend).await.unwrap();
        assert!(!ctl.yank_slot().is_empty());

        assert_eq!(
            ctl.handle(Intent::Paste { overwrite: false }).await.unwrap(),
            HandleResult::Redraw
        );

        let outcome = rx.recv().await.unwrap();
        assert!(outcome.succeeded(), "paste failed: {:?}", outcome.result);
        ctl.absorb_outcome(&outcome).await.unwrap();

        assert!(c.join("b.txt").is_file());
        assert!(!a.join("b.txt").exists());
        // The settled cut emptied the slot.
        assert!(ctl.yank_slot().is_empty());
    }

    #[tokio::test]
    async fn cursor_clamps_after_deleting_the_last_entry() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "x").unwrap();
        fs::write(tmp.path().join("b.txt"), "x").unwrap();

        let (mut ctl, mut rx) = controller(tmp.path()).await;

        ctl.handle(Intent::JumpBottom).await.unwrap();
        assert_eq!(ctl.selected_entry().unwrap().name, "b.txt");

        ctl.handle(Intent::Delete).await.unwrap();
        let outcome = rx.recv().await.unwrap();
        assert!(outcome.succeeded());
        ctl.absorb_outcome(&outcome).await.unwrap();

        assert_eq!(ctl.selected_entry().unwrap().name, "a.txt");
    }

    #[tokio::test]
    async fn failed_cut_paste_keeps_the_slot_for_retry() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("b.txt");
        fs::write(&src, "x").unwrap();

        let (mut ctl, mut rx) = controller(tmp.path()).await;
        select_named(&mut ctl, "b.txt");
        ctl.handle(Intent::Yank(YankMode::Cut)).await.unwrap();

        // Pasting into the source's own directory collides with itself.
        ctl.handle(Intent::Paste { overwrite: false }).await.unwrap();
        let outcome = rx.recv().await.unwrap();
        assert!(matches!(outcome.result, Err(AppError::AlreadyExists(_))));

        ctl.absorb_outcome(&outcome).await.unwrap();
        assert!(!ctl.yank_slot().is_empty());
        assert!(src.exists());
    }

    #[tokio::test]
    async fn paste_with_empty_slot_is_an_error_and_spawns_nothing() {
        let tmp = TempDir::new().unwrap();
        let (mut ctl, _rx) = controller(tmp.path()).await;

        let err = ctl
            .handle(Intent::Paste { overwrite: false })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyClipboard));
        assert!(!ctl.is_busy());
    }

    #[tokio::test]
    async fn second_mutating_intent_is_rejected_while_one_runs() {
        let tmp = TempDir::new().unwrap();
        let (mut ctl, mut rx) = controller(tmp.path()).await;

        ctl.handle(Intent::Create("one.txt".into())).await.unwrap();
        // The outcome has not been absorbed, so the slot is still taken.
        assert_eq!(
            ctl.handle(Intent::Create("two.txt".into())).await.unwrap(),
            HandleResult::Busy
        );

        let outcome = rx.recv().await.unwrap();
        assert!(outcome.succeeded());
        ctl.absorb_outcome(&outcome).await.unwrap();

        assert!(tmp.path().join("one.txt").exists());
        assert!(!tmp.path().join("two.txt").exists());

        // Cleared after absorption.
        assert_eq!(
            ctl.handle(Intent::Create("two.txt".into())).await.unwrap(),
            HandleResult::Redraw
        );
        assert!(rx.recv().await.unwrap().succeeded());
    }

    #[tokio::test]
    async fn cancelled_operation_reports_through_the_outcome_channel() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let c = tmp.path().join("c");
        fs::create_dir(&a).unwrap();
        fs::create_dir(&c).unwrap();
        let src = a.join("tree");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("f.txt"), "x").unwrap();

        let (mut ctl, mut rx) = controller(&a).await;
        select_named(&mut ctl, "tree");
        ctl.handle(Intent::Yank(YankMode::Copy)).await.unwrap();
        ctl.cursor.enter(c.clone());
        ctl.handle(Intent::Reload).await.unwrap();

        ctl.handle(Intent::Paste { overwrite: false }).await.unwrap();
        assert!(ctl.is_busy());

        // On the test's single-threaded runtime the spawned task has not
        // started yet, so the token wins and no write happens.
        assert_eq!(
            ctl.handle(Intent::CancelOperation).await.unwrap(),
            HandleResult::Redraw
        );

        let outcome = rx.recv().await.unwrap();
        assert!(matches!(outcome.result, Err(AppError::Cancelled)));

        ctl.absorb_outcome(&outcome).await.unwrap();
        assert!(!ctl.is_busy());
        assert!(!c.join("tree").exists());
        assert!(src.join("f.txt").exists());
    }

    #[tokio::test]
    async fn cancel_operation_without_one_running_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let (mut ctl, _rx) = controller(tmp.path()).await;

        assert_eq!(
            ctl.handle(Intent::CancelOperation).await.unwrap(),
            HandleResult::Noop
        );
    }

    #[tokio::test]
    async fn ascend_lands_on_the_directory_just_left() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("alpha")).unwrap();
        fs::create_dir(tmp.path().join("beta")).unwrap();
        fs::write(tmp.path().join("zz.txt"), "x").unwrap();

        let (mut ctl, _rx) = controller(&tmp.path().join("beta")).await;
        ctl.handle(Intent::Ascend).await.unwrap();

        assert_eq!(ctl.cwd(), tmp.path());
        assert_eq!(ctl.selected_entry().unwrap().name, "beta");
    }

    #[tokio::test]
    async fn toggle_hidden_keeps_the_selection_by_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".hidden"), "x").unwrap();
        fs::write(tmp.path().join("aa.txt"), "x").unwrap();
        fs::write(tmp.path().join("bb.txt"), "x").unwrap();

        let (mut ctl, _rx) = controller(tmp.path()).await;
        select_named(&mut ctl, "bb.txt");

        ctl.handle(Intent::ToggleHidden).await.unwrap();
        assert_eq!(ctl.selected_entry().unwrap().name, "bb.txt");

        ctl.handle(Intent::ToggleHidden).await.unwrap();
        assert_eq!(ctl.selected_entry().unwrap().name, "bb.txt");
    }

    #[tokio::test]
    async fn descend_ignores_files_and_enters_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("file.txt"), "x").unwrap();

        let (mut ctl, _rx) = controller(tmp.path()).await;

        select_named(&mut ctl, "file.txt");
        assert_eq!(ctl.handle(Intent::Descend).await.unwrap(), HandleResult::Noop);
        assert_eq!(ctl.cwd(), tmp.path());

        select_named(&mut ctl, "sub");
        assert_eq!(ctl.handle(Intent::Descend).await.unwrap(), HandleResult::Redraw);
        assert_eq!(ctl.cwd(), tmp.path().join("sub"));
    }

    #[tokio::test]
    async fn open_in_editor_only_applies_to_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("file.txt"), "x").unwrap();

        let (mut ctl, _rx) = controller(tmp.path()).await;

        select_named(&mut ctl, "sub");
        assert_eq!(ctl.handle(Intent::OpenInEditor).await.unwrap(), HandleResult::Noop);

        select_named(&mut ctl, "file.txt");
        assert_eq!(
            ctl.handle(Intent::OpenInEditor).await.unwrap(),
            HandleResult::Editor(tmp.path().join("file.txt"))
        );
    }
}
