//! `src/fs/gateway.rs`
//! ============================================================
//! # `FileSystemGateway`: the only component touching the real filesystem
//!
//! Thin wrapper over listing and copy/move/delete/create/rename
//! primitives. Raw OS failures are translated into the `AppError`
//! taxonomy at this boundary. Single-file operations never partially
//! mutate observable state on failure; tree copy/delete may stop part-way
//! and then surface `PartialFailure` instead of pretending success.

use std::path::{Path, PathBuf};

use tokio::fs::{self as tokio_fs, OpenOptions, ReadDir};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::AppError;
use crate::fs::entry::{DirectorySnapshot, EntryInfo};

#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemGateway;

impl FileSystemGateway {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// List `path` into an ordered snapshot, excluding dotfiles unless
    /// `show_hidden`. Entries whose metadata cannot be read are skipped
    /// and logged rather than failing the whole listing.
    pub async fn list(
        &self,
        path: &Path,
        show_hidden: bool,
    ) -> Result<DirectorySnapshot, AppError> {
        let mut read_dir: ReadDir = tokio_fs::read_dir(path)
            .await
            .map_err(|e| AppError::from_io(path, e))?;

        let mut entries: Vec<EntryInfo> = Vec::new();

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| AppError::from_io(path, e))?
        {
            let entry_path: PathBuf = entry.path();

            match EntryInfo::from_path(&entry_path).await {
                Ok(info) => {
                    if show_hidden || !info.is_hidden() {
                        entries.push(info);
                    }
                }

                Err(e) => {
                    // Log the error but continue listing other entries.
                    info!("Failed to read metadata for {:?}: {}", entry_path, e);
                }
            }
        }

        Ok(DirectorySnapshot::new(path.to_path_buf(), entries))
    }

    /// Create an empty file; the target must not exist.
    pub async fn create_file(&self, path: &Path) -> Result<(), AppError> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map(|_| ())
            .map_err(|e| AppError::from_io(path, e))
    }

    /// Create a directory; the target must not exist.
    pub async fn create_dir(&self, path: &Path) -> Result<(), AppError> {
        tokio_fs::create_dir(path)
            .await
            .map_err(|e| AppError::from_io(path, e))
    }

    /// Rename `old` to `new`. The destination must not exist: the OS-level
    /// rename would silently replace it, so the collision check lives here.
    pub async fn rename(&self, old: &Path, new: &Path) -> Result<(), AppError> {
        if path_exists(new).await {
            return Err(AppError::AlreadyExists(new.to_path_buf()));
        }

        tokio_fs::rename(old, new)
            .await
            .map_err(|e| AppError::from_io(old, e))
    }

    /// Copy `src` into `dst_dir`, recursively for directories, preserving
    /// permission bits where the platform allows. Returns the destination
    /// path.
    pub async fn copy(
        &self,
        src: &Path,
        dst_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, AppError> {
        let meta = tokio_fs::symlink_metadata(src)
            .await
            .map_err(|e| AppError::from_io(src, e))?;

        let dst = join_basename(src, dst_dir)?;
        if path_exists(&dst).await {
            return Err(AppError::AlreadyExists(dst));
        }

        if meta.is_dir() {
            self.copy_tree(src, &dst, cancel).await?;
        } else {
            if cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            tokio_fs::copy(src, &dst)
                .await
                .map_err(|e| AppError::from_io(&dst, e))?;
        }

        Ok(dst)
    }

    /// Move `src` into `dst_dir` via rename. Crossing a filesystem
    /// boundary is surfaced as `CrossDeviceUnsupported`, never silently
    /// downgraded to copy-and-delete. Returns the destination path.
    pub async fn move_entry(&self, src: &Path, dst_dir: &Path) -> Result<PathBuf, AppError> {
        if !path_exists(src).await {
            return Err(AppError::NotFound(src.to_path_buf()));
        }

        let dst = join_basename(src, dst_dir)?;
        if path_exists(&dst).await {
            return Err(AppError::AlreadyExists(dst));
        }

        tokio_fs::rename(src, &dst)
            .await
            .map_err(|e| AppError::from_io(src, e))?;

        Ok(dst)
    }

    /// Delete a file or, recursively, a directory tree.
    pub async fn delete(&self, path: &Path, cancel: &CancellationToken) -> Result<(), AppError> {
        let meta = tokio_fs::symlink_metadata(path)
            .await
            .map_err(|e| AppError::from_io(path, e))?;

        if meta.is_dir() {
            self.delete_tree(path, cancel).await
        } else {
            if cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            tokio_fs::remove_file(path)
                .await
                .map_err(|e| AppError::from_io(path, e))
        }
    }

    async fn copy_tree(
        &self,
        src_root: &Path,
        dst_root: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), AppError> {
        let mut writes: u64 = 0;

        let result = Self::copy_tree_inner(src_root, dst_root, cancel, &mut writes).await;

        // A stop after the first write leaves a half-copied tree behind;
        // that must reach the user as PartialFailure, not as the raw cause.
        match result {
            Ok(()) => Ok(()),
            Err(e) if writes > 0 => Err(AppError::partial(dst_root, e.to_string())),
            Err(e) => Err(e),
        }
    }

    async fn copy_tree_inner(
        src_root: &Path,
        dst_root: &Path,
        cancel: &CancellationToken,
        writes: &mut u64,
    ) -> Result<(), AppError> {
        let mut stack: Vec<(PathBuf, PathBuf)> =
            vec![(src_root.to_path_buf(), dst_root.to_path_buf())];

        while let Some((src_dir, dst_dir)) = stack.pop() {
            if cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            tokio_fs::create_dir(&dst_dir)
                .await
                .map_err(|e| AppError::from_io(&dst_dir, e))?;
            *writes += 1;

            if let Ok(meta) = tokio_fs::metadata(&src_dir).await {
                let _ = tokio_fs::set_permissions(&dst_dir, meta.permissions()).await;
            }

            let mut read_dir = tokio_fs::read_dir(&src_dir)
                .await
                .map_err(|e| AppError::from_io(&src_dir, e))?;

            while let Some(entry) = read_dir
                .next_entry()
                .await
                .map_err(|e| AppError::from_io(&src_dir, e))?
            {
                if cancel.is_cancelled() {
                    return Err(AppError::Cancelled);
                }

                let from: PathBuf = entry.path();
                let to: PathBuf = dst_dir.join(entry.file_name());

                let ftype = entry
                    .file_type()
                    .await
                    .map_err(|e| AppError::from_io(&from, e))?;

                if ftype.is_dir() {
                    stack.push((from, to));
                } else if ftype.is_symlink() {
                    Self::copy_symlink(&from, &to).await?;
                    *writes += 1;
                } else {
                    tokio_fs::copy(&from, &to)
                        .await
                        .map_err(|e| AppError::from_io(&to, e))?;
                    *writes += 1;
                }
            }
        }

        Ok(())
    }

    #[cfg(unix)]
    async fn copy_symlink(from: &Path, to: &Path) -> Result<(), AppError> {
        let target = tokio_fs::read_link(from)
            .await
            .map_err(|e| AppError::from_io(from, e))?;

        tokio_fs::symlink(target, to)
            .await
            .map_err(|e| AppError::from_io(to, e))
    }

    #[cfg(not(unix))]
    async fn copy_symlink(from: &Path, to: &Path) -> Result<(), AppError> {
        // Symlink creation is privileged on other platforms; copy through.
        tracing::warn!("Copying symlink {:?} as its target content", from);
        tokio_fs::copy(from, to)
            .await
            .map(|_| ())
            .map_err(|e| AppError::from_io(to, e))
    }

    async fn delete_tree(&self, root: &Path, cancel: &CancellationToken) -> Result<(), AppError> {
        let mut removals: u64 = 0;

        let result = Self::delete_tree_inner(root, cancel, &mut removals).await;

        match result {
            Ok(()) => Ok(()),
            Err(e) if removals > 0 => Err(AppError::partial(root, e.to_string())),
            Err(e) => Err(e),
        }
    }

    async fn delete_tree_inner(
        root: &Path,
        cancel: &CancellationToken,
        removals: &mut u64,
    ) -> Result<(), AppError> {
        // Files first (pre-order walk), directories in reverse afterwards.
        let mut dirs: Vec<PathBuf> = vec![root.to_path_buf()];
        let mut to_visit: Vec<PathBuf> = vec![root.to_path_buf()];

        while let Some(dir) = to_visit.pop() {
            let mut read_dir = tokio_fs::read_dir(&dir)
                .await
                .map_err(|e| AppError::from_io(&dir, e))?;

            while let Some(entry) = read_dir
                .next_entry()
                .await
                .map_err(|e| AppError::from_io(&dir, e))?
            {
                if cancel.is_cancelled() {
                    return Err(AppError::Cancelled);
                }

                let path: PathBuf = entry.path();
                let ftype = entry
                    .file_type()
                    .await
                    .map_err(|e| AppError::from_io(&path, e))?;

                if ftype.is_dir() {
                    dirs.push(path.clone());
                    to_visit.push(path);
                } else {
                    tokio_fs::remove_file(&path)
                        .await
                        .map_err(|e| AppError::from_io(&path, e))?;
                    *removals += 1;
                }
            }
        }

        for dir in dirs.iter().rev() {
            if cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            tokio_fs::remove_dir(dir)
                .await
                .map_err(|e| AppError::from_io(dir, e))?;
            *removals += 1;
        }

        Ok(())
    }
}

/// `dst_dir / basename(src)`, failing when `src` has no final component.
fn join_basename(src: &Path, dst_dir: &Path) -> Result<PathBuf, AppError> {
    src.file_name()
        .map(|name| dst_dir.join(name))
        .ok_or_else(|| AppError::Other(format!("Path has no file name: {}", src.display())))
}

/// Existence probe that does not follow the final symlink.
async fn path_exists(path: &Path) -> bool {
    tokio_fs::symlink_metadata(path).await.is_ok()
}
