//! `src/ops/engine.rs`
//! ============================================================================
//! # `FileOperationEngine`: background execution of mutating operations
//!
//! Create, rename, delete, and paste run on spawned tasks so the
//! controller stays responsive to cursor movement and cancellation while
//! a large tree is being copied. Every task ends by sending exactly one
//! `OperationOutcome` over the outcome channel; the controller enforces
//! the single-flight discipline through the returned `RunningOperation`
//! handle.

use std::path::{Path, PathBuf};

use tokio::fs as tokio_fs;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use yankr::YankedEntry;

use crate::controller::intents::{OperationKind, OperationOutcome};
use crate::error::AppError;
use crate::fs::gateway::FileSystemGateway;

/// Handle for the one in-flight mutating operation.
#[derive(Debug)]
pub struct RunningOperation {
    kind: OperationKind,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RunningOperation {
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Request interruption; the task reports `PartialFailure` or
    /// `Cancelled` through its outcome, it is never silently dropped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[derive(Debug, Clone)]
pub struct FileOperationEngine {
    gateway: FileSystemGateway,
    outcome_tx: UnboundedSender<OperationOutcome>,
}

impl FileOperationEngine {
    #[must_use]
    pub fn new(gateway: FileSystemGateway, outcome_tx: UnboundedSender<OperationOutcome>) -> Self {
        Self {
            gateway,
            outcome_tx,
        }
    }

    /// Create a file, or a directory when `name` carries a trailing
    /// separator, inside `in_dir`.
    #[must_use]
    pub fn spawn_create(&self, name: String, in_dir: PathBuf) -> RunningOperation {
        let gateway = self.gateway;
        self.spawn(OperationKind::Create, in_dir.clone(), move |_cancel| async move {
            run_create(&gateway, &name, &in_dir).await
        })
    }

    /// Rename `path` within its own parent; renaming never moves across
    /// directories.
    #[must_use]
    pub fn spawn_rename(&self, path: PathBuf, new_name: String) -> RunningOperation {
        let gateway = self.gateway;
        self.spawn(OperationKind::Rename, path.clone(), move |_cancel| async move {
            run_rename(&gateway, &path, &new_name).await
        })
    }

    /// Delete `path`, recursively for directories. Confirmation already
    /// happened at the dialog boundary; the engine never re-asks.
    #[must_use]
    pub fn spawn_delete(&self, path: PathBuf) -> RunningOperation {
        let gateway = self.gateway;
        self.spawn(OperationKind::Delete, path.clone(), move |cancel| async move {
            gateway.delete(&path, &cancel).await.map(|()| path)
        })
    }

    /// Paste the yanked entry into `into`. The slot itself stays with the
    /// controller: it settles the cut/copy transition when this task's
    /// outcome confirms success.
    #[must_use]
    pub fn spawn_paste(
        &self,
        entry: YankedEntry,
        into: PathBuf,
        overwrite: bool,
    ) -> RunningOperation {
        let gateway = self.gateway;
        let kind = match entry.mode {
            yankr::YankMode::Copy => OperationKind::PasteCopy,
            yankr::YankMode::Cut => OperationKind::PasteCut,
        };

        self.spawn(kind, entry.source.clone(), move |cancel| async move {
            run_paste(&gateway, entry, &into, overwrite, &cancel).await
        })
    }

    fn spawn<F, Fut>(
        &self,
        kind: OperationKind,
        fallback_path: PathBuf,
        op: F,
    ) -> RunningOperation
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<PathBuf, AppError>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let outcome_tx = self.outcome_tx.clone();

        let handle = tokio::spawn(async move {
            let outcome = match op(task_cancel).await {
                Ok(path) => {
                    info!("{} completed: {:?}", kind, path);
                    OperationOutcome {
                        kind,
                        path,
                        result: Ok(()),
                    }
                }

                Err(e) => {
                    warn!("{} failed on {:?}: {}", kind, fallback_path, e);
                    OperationOutcome {
                        kind,
                        path: fallback_path,
                        result: Err(e),
                    }
                }
            };

            if outcome_tx.send(outcome).is_err() {
                warn!("Outcome receiver dropped; {} result lost to shutdown", kind);
            }
        });

        RunningOperation {
            kind,
            cancel,
            handle,
        }
    }
}

async fn run_create(
    gateway: &FileSystemGateway,
    name: &str,
    in_dir: &Path,
) -> Result<PathBuf, AppError> {
    let wants_dir = name.ends_with('/') || name.ends_with(std::path::MAIN_SEPARATOR);
    let trimmed = name.trim_end_matches(['/', std::path::MAIN_SEPARATOR]);

    if trimmed.is_empty() {
        return Err(AppError::Other("Cannot create an entry with an empty name".into()));
    }
    if trimmed.contains(['/', std::path::MAIN_SEPARATOR]) {
        return Err(AppError::Other(format!(
            "Entry name may not contain a path separator: {trimmed}"
        )));
    }

    let target = in_dir.join(trimmed);

    if wants_dir {
        gateway.create_dir(&target).await?;
    } else {
        gateway.create_file(&target).await?;
    }

    Ok(target)
}

async fn run_rename(
    gateway: &FileSystemGateway,
    path: &Path,
    new_name: &str,
) -> Result<PathBuf, AppError> {
    let parent = path
        .parent()
        .ok_or_else(|| AppError::Other("Cannot rename a filesystem root".into()))?;

    if new_name.is_empty() || new_name.contains(['/', std::path::MAIN_SEPARATOR]) {
        return Err(AppError::Other(format!("Invalid name: {new_name:?}")));
    }

    // The target is always a sibling; an unchanged name collides with
    // itself and fails AlreadyExists inside the gateway.
    let target = parent.join(new_name);
    gateway.rename(path, &target).await?;

    Ok(target)
}

async fn run_paste(
    gateway: &FileSystemGateway,
    entry: YankedEntry,
    into: &Path,
    overwrite: bool,
    cancel: &CancellationToken,
) -> Result<PathBuf, AppError> {
    let src = entry.source.clone();

    // The yank was taken on trust; the source is only validated now.
    let src_meta = tokio_fs::symlink_metadata(&src)
        .await
        .map_err(|_| AppError::NotFound(src.clone()))?;

    // Reject a directory pasted into itself or a descendant before any
    // filesystem write happens.
    if src_meta.is_dir() && into.starts_with(&src) {
        return Err(AppError::SelfReferential(src));
    }

    let dest = entry.destination_in(into)?;

    if dest == src {
        // Paste back into the source's own directory. Overwrite is not
        // honored here: removing the destination would destroy the source.
        return Err(AppError::AlreadyExists(dest));
    }

    if tokio_fs::symlink_metadata(&dest).await.is_ok() {
        if !overwrite {
            return Err(AppError::AlreadyExists(dest));
        }

        gateway.delete(&dest, cancel).await?;
    }

    match entry.mode {
        yankr::YankMode::Copy => gateway.copy(&src, into, cancel).await,
        yankr::YankMode::Cut => gateway.move_entry(&src, into).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio::sync::mpsc;
    use yankr::{YankMode, YankSlot};

    fn engine() -> (FileOperationEngine, mpsc::UnboundedReceiver<OperationOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (FileOperationEngine::new(FileSystemGateway::new(), tx), rx)
    }

    fn yanked(path: &Path, mode: YankMode) -> YankedEntry {
        let mut slot = YankSlot::new();
        slot.yank(path.to_path_buf(), mode);
        slot.peek().unwrap().clone()
    }

    #[tokio::test]
    async fn create_with_trailing_separator_makes_a_directory() {
        let tmp = TempDir::new().unwrap();
        let (engine, mut rx) = engine();

        let _op = engine.spawn_create("newdir/".into(), tmp.path().to_path_buf());
        let outcome = rx.recv().await.unwrap();

        assert!(outcome.succeeded());
        assert_eq!(outcome.kind, OperationKind::Create);
        assert!(tmp.path().join("newdir").is_dir());
    }

    #[tokio::test]
    async fn create_without_separator_makes_an_empty_file() {
        let tmp = TempDir::new().unwrap();
        let (engine, mut rx) = engine();

        let _op = engine.spawn_create("note.txt".into(), tmp.path().to_path_buf());
        let outcome = rx.recv().await.unwrap();

        assert!(outcome.succeeded());
        assert!(tmp.path().join("note.txt").is_file());
    }

    #[tokio::test]
    async fn create_collision_fails_already_exists() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("taken"), "x").unwrap();
        let (engine, mut rx) = engine();

        let _op = engine.spawn_create("taken".into(), tmp.path().to_path_buf());
        let outcome = rx.recv().await.unwrap();

        assert!(matches!(outcome.result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn rename_to_same_name_collides_with_itself() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("b.txt");
        fs::write(&path, "x").unwrap();
        let (engine, mut rx) = engine();

        let _op = engine.spawn_rename(path.clone(), "b.txt".into());
        let outcome = rx.recv().await.unwrap();

        assert!(matches!(outcome.result, Err(AppError::AlreadyExists(_))));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn rename_stays_inside_parent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("old.txt");
        fs::write(&path, "x").unwrap();
        let (engine, mut rx) = engine();

        let _op = engine.spawn_rename(path.clone(), "new.txt".into());
        let outcome = rx.recv().await.unwrap();

        assert!(outcome.succeeded());
        assert_eq!(outcome.path, tmp.path().join("new.txt"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn paste_copy_duplicates_and_reports_destination() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("b.txt");
        fs::write(&src, "payload").unwrap();
        let dest_dir = tmp.path().join("c");
        fs::create_dir(&dest_dir).unwrap();

        let (engine, mut rx) = engine();
        let _op = engine.spawn_paste(yanked(&src, YankMode::Copy), dest_dir.clone(), false);
        let outcome = rx.recv().await.unwrap();

        assert!(outcome.succeeded());
        assert_eq!(outcome.kind, OperationKind::PasteCopy);
        assert_eq!(outcome.path, dest_dir.join("b.txt"));
        assert!(src.exists());
        assert_eq!(fs::read_to_string(dest_dir.join("b.txt")).unwrap(), "payload");
    }

    #[tokio::test]
    async fn paste_cut_moves_the_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("b.txt");
        fs::write(&src, "payload").unwrap();
        let dest_dir = tmp.path().join("c");
        fs::create_dir(&dest_dir).unwrap();

        let (engine, mut rx) = engine();
        let _op = engine.spawn_paste(yanked(&src, YankMode::Cut), dest_dir.clone(), false);
        let outcome = rx.recv().await.unwrap();

        assert!(outcome.succeeded());
        assert_eq!(outcome.kind, OperationKind::PasteCut);
        assert!(!src.exists());
        assert!(dest_dir.join("b.txt").is_file());
    }

    #[tokio::test]
    async fn paste_with_vanished_source_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("gone.txt");
        fs::write(&src, "x").unwrap();
        let entry = yanked(&src, YankMode::Copy);
        fs::remove_file(&src).unwrap();

        let (engine, mut rx) = engine();
        let _op = engine.spawn_paste(entry, tmp.path().to_path_buf(), false);
        let outcome = rx.recv().await.unwrap();

        assert!(matches!(outcome.result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn paste_directory_into_itself_is_rejected_without_writes() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("tree");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("f.txt"), "x").unwrap();

        let (engine, mut rx) = engine();

        // Into itself.
        let _op = engine.spawn_paste(yanked(&dir, YankMode::Copy), dir.clone(), false);
        let outcome = rx.recv().await.unwrap();
        assert!(matches!(outcome.result, Err(AppError::SelfReferential(_))));

        // Into a descendant.
        let sub = dir.join("sub");
        fs::create_dir(&sub).unwrap();
        let _op = engine.spawn_paste(yanked(&dir, YankMode::Copy), sub.clone(), false);
        let outcome = rx.recv().await.unwrap();
        assert!(matches!(outcome.result, Err(AppError::SelfReferential(_))));

        // No stray copies appeared anywhere in the tree.
        assert!(!dir.join("tree").exists());
        assert!(!sub.join("tree").exists());
    }

    #[tokio::test]
    async fn paste_collision_respects_overwrite_protocol() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("b.txt");
        fs::write(&src, "new").unwrap();
        let dest_dir = tmp.path().join("c");
        fs::create_dir(&dest_dir).unwrap();
        fs::write(dest_dir.join("b.txt"), "old").unwrap();

        let (engine, mut rx) = engine();

        // Without overwrite: fails, both sides untouched.
        let _op = engine.spawn_paste(yanked(&src, YankMode::Copy), dest_dir.clone(), false);
        let outcome = rx.recv().await.unwrap();
        assert!(matches!(outcome.result, Err(AppError::AlreadyExists(_))));
        assert_eq!(fs::read_to_string(&src).unwrap(), "new");
        assert_eq!(fs::read_to_string(dest_dir.join("b.txt")).unwrap(), "old");

        // Same call with overwrite: destination replaced.
        let _op = engine.spawn_paste(yanked(&src, YankMode::Copy), dest_dir.clone(), true);
        let outcome = rx.recv().await.unwrap();
        assert!(outcome.succeeded());
        assert_eq!(fs::read_to_string(dest_dir.join("b.txt")).unwrap(), "new");
    }

    #[tokio::test]
    async fn paste_into_own_directory_never_overwrites_the_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("b.txt");
        fs::write(&src, "keep me").unwrap();

        let (engine, mut rx) = engine();

        for overwrite in [false, true] {
            let _op =
                engine.spawn_paste(yanked(&src, YankMode::Cut), tmp.path().to_path_buf(), overwrite);
            let outcome = rx.recv().await.unwrap();
            assert!(matches!(outcome.result, Err(AppError::AlreadyExists(_))));
        }

        assert_eq!(fs::read_to_string(&src).unwrap(), "keep me");
    }
}
