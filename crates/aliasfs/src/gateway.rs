// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Retry-wrapped access to the host filesystem.
//!
//! [`RawFs`] is the set of raw calls; [`FilesystemGateway`] wraps each of them
//! in a [`RetryExecutor`] and adds the text conventions (byte-order mark,
//! CRLF line joins) used by file nodes.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use diagnostics::{log_debug, log_info, log_warn};

use crate::config::FsConfig;
use crate::error::{Error, Result};
use crate::node::NodeKind;
use crate::retry::{RetryExecutor, RetryPolicy};

const BOM: char = '\u{feff}';

static HOST: LazyLock<Arc<FilesystemGateway>> = LazyLock::new(|| {
    let config = FsConfig::from_env().unwrap_or_else(|err| {
        let error = err.to_string();
        log_warn!("Ignoring retry environment: {error}", error: error.as_str());
        FsConfig::default()
    });
    let raw = Arc::new(HostFs);
    let trash = Arc::new(SystemTrash);
    let gateway = FilesystemGateway::with_config(raw.clone(), trash.clone(), &config)
        .unwrap_or_else(|err| {
            let error = err.to_string();
            log_warn!("Using default retry policy: {error}", error: error.as_str());
            FilesystemGateway::new(raw, trash)
        });
    Arc::new(gateway)
});

/// Raw filesystem calls. Implementations do no retrying of their own.
#[async_trait]
pub trait RawFs: Send + Sync {
    /// Whether `path` exists as `kind`. A missing path is `Ok(false)`.
    async fn exists(&self, path: &Path, kind: NodeKind) -> io::Result<bool>;

    /// Entries of `dir` that are of `kind`.
    async fn list(&self, dir: &Path, kind: NodeKind) -> io::Result<Vec<PathBuf>>;

    /// Create `path` and any missing parents; an existing directory is fine.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy a file. Without `overwrite` an existing target is `AlreadyExists`.
    async fn copy(&self, from: &Path, to: &Path, overwrite: bool) -> io::Result<()>;

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a file, or a directory with everything below it.
    async fn remove(&self, path: &Path, kind: NodeKind) -> io::Result<()>;

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Create or truncate `path` and write `data`.
    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Open `path` for read and write, creating it, under an exclusive lock.
    /// A lock held elsewhere is an error so the caller can retry.
    async fn open_locked(&self, path: &Path) -> io::Result<Box<dyn LockedFile>>;
}

/// An open file holding an exclusive lock until dropped.
pub trait LockedFile: Send {
    fn read_text(&mut self) -> io::Result<String>;

    /// Truncate and write `text` through the same handle.
    fn replace(&mut self, text: &str) -> io::Result<()>;
}

/// OS recycle bin.
pub trait Trash: Send + Sync {
    fn move_to_trash(&self, path: &Path) -> io::Result<()>;
}

/// [`RawFs`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

#[async_trait]
impl RawFs for HostFs {
    async fn exists(&self, path: &Path, kind: NodeKind) -> io::Result<bool> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(match kind {
                NodeKind::File => meta.is_file(),
                NodeKind::Directory => meta.is_dir(),
            }),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn list(&self, dir: &Path, kind: NodeKind) -> io::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            // Follow symlinks; dangling ones are skipped.
            let Ok(meta) = tokio::fs::metadata(&path).await else {
                continue;
            };
            let wanted = match kind {
                NodeKind::File => meta.is_file(),
                NodeKind::Directory => meta.is_dir(),
            };
            if wanted {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        match tokio::fs::create_dir_all(path).await {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
            other => other,
        }
    }

    async fn copy(&self, from: &Path, to: &Path, overwrite: bool) -> io::Result<()> {
        if !overwrite && tokio::fs::try_exists(to).await? {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
        let _ = tokio::fs::copy(from, to).await?;
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        match tokio::fs::rename(from, to).await {
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices && from.is_file() => {
                let _ = tokio::fs::copy(from, to).await?;
                tokio::fs::remove_file(from).await
            }
            other => other,
        }
    }

    async fn remove(&self, path: &Path, kind: NodeKind) -> io::Result<()> {
        match kind {
            NodeKind::File => tokio::fs::remove_file(path).await,
            NodeKind::Directory => tokio::fs::remove_dir_all(path).await,
        }
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, data).await
    }

    async fn open_locked(&self, path: &Path) -> io::Result<Box<dyn LockedFile>> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> io::Result<Box<dyn LockedFile>> {
            let file = std::fs::OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)?;
            match file.try_lock() {
                Ok(()) => Ok(Box::new(HostLockedFile { file }) as Box<dyn LockedFile>),
                Err(std::fs::TryLockError::WouldBlock) => Err(io::Error::new(
                    io::ErrorKind::WouldBlock,
                    format!("{} is locked by another updater", path.display()),
                )),
                Err(std::fs::TryLockError::Error(e)) => Err(e),
            }
        })
        .await
        .map_err(io::Error::other)?
    }
}

struct HostLockedFile {
    file: std::fs::File,
}

impl LockedFile for HostLockedFile {
    fn read_text(&mut self) -> io::Result<String> {
        let mut text = String::new();
        let _ = self.file.read_to_string(&mut text)?;
        Ok(strip_bom(text))
    }

    fn replace(&mut self, text: &str) -> io::Result<()> {
        self.file.set_len(0)?;
        let _ = self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(text.as_bytes())?;
        self.file.flush()
    }
}

/// [`Trash`] backed by the desktop recycle bin.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrash;

impl Trash for SystemTrash {
    fn move_to_trash(&self, path: &Path) -> io::Result<()> {
        trash::delete(path).map_err(|e| io::Error::other(e.to_string()))
    }
}

fn strip_bom(text: String) -> String {
    match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Every filesystem effect of a node goes through here.
#[derive(Clone)]
pub struct FilesystemGateway {
    raw: Arc<dyn RawFs>,
    trash: Arc<dyn Trash>,
    executor: RetryExecutor,
    update_executor: RetryExecutor,
}

impl std::fmt::Debug for FilesystemGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesystemGateway")
            .field("retry", &self.executor.policy())
            .field("update_retry", &self.update_executor.policy())
            .finish_non_exhaustive()
    }
}

impl FilesystemGateway {
    /// Gateway with the default retry policies.
    pub fn new(raw: Arc<dyn RawFs>, trash: Arc<dyn Trash>) -> Self {
        Self {
            raw,
            trash,
            executor: RetryExecutor::default(),
            update_executor: RetryExecutor::new(RetryPolicy::contended()),
        }
    }

    pub fn with_config(raw: Arc<dyn RawFs>, trash: Arc<dyn Trash>, config: &FsConfig) -> Result<Self> {
        Ok(Self {
            raw,
            trash,
            executor: RetryExecutor::new(config.retry.policy()?),
            update_executor: RetryExecutor::new(config.update_retry.policy()?.with_jitter()),
        })
    }

    /// The shared gateway over the host filesystem and system trash.
    #[must_use]
    pub fn host() -> Arc<Self> {
        HOST.clone()
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.executor.policy()
    }

    #[must_use]
    pub fn update_retry_policy(&self) -> RetryPolicy {
        self.update_executor.policy()
    }

    pub async fn exists(&self, path: &Path, kind: NodeKind) -> Result<bool> {
        self.executor
            .run(|| async move {
                self.raw
                    .exists(path, kind)
                    .await
                    .map_err(|e| Error::io(path, e))
            })
            .await
    }

    /// Files directly in `dir`, sorted. Empty if `dir` does not exist.
    pub async fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.list(dir, NodeKind::File).await
    }

    /// Subdirectories of `dir`, sorted. Empty if `dir` does not exist.
    pub async fn list_directories(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.list(dir, NodeKind::Directory).await
    }

    async fn list(&self, dir: &Path, kind: NodeKind) -> Result<Vec<PathBuf>> {
        self.executor
            .run(|| async move {
                let present = self
                    .raw
                    .exists(dir, NodeKind::Directory)
                    .await
                    .map_err(|e| Error::io(dir, e))?;
                if !present {
                    return Ok(Vec::new());
                }
                self.raw.list(dir, kind).await.map_err(|e| Error::io(dir, e))
            })
            .await
    }

    pub async fn create_directory(&self, path: &Path) -> Result<()> {
        self.executor
            .run(|| async move {
                self.raw
                    .create_dir_all(path)
                    .await
                    .map_err(|e| Error::io(path, e))
            })
            .await?;
        let dir = path.to_string_lossy();
        log_info!("Created directory {dir}", dir: dir.as_ref());
        Ok(())
    }

    /// Copy a file. Without `overwrite` an existing target is
    /// [`Error::TargetExists`], returned without retrying.
    pub async fn copy(&self, from: &Path, to: &Path, overwrite: bool) -> Result<()> {
        self.executor
            .run(|| async move {
                self.raw
                    .copy(from, to, overwrite)
                    .await
                    .map_err(|e| match e.kind() {
                        io::ErrorKind::AlreadyExists if !overwrite => Error::target_exists(to),
                        _ => Error::io(to, e),
                    })
            })
            .await?;
        let (src, dst) = (from.to_string_lossy(), to.to_string_lossy());
        log_debug!("Copied {src} to {dst}", src: src.as_ref(), dst: dst.as_ref());
        Ok(())
    }

    pub async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.executor
            .run(|| async move {
                self.raw
                    .rename(from, to)
                    .await
                    .map_err(|e| Error::io(from, e))
            })
            .await?;
        let (src, dst) = (from.to_string_lossy(), to.to_string_lossy());
        log_info!("Moved {src} to {dst}", src: src.as_ref(), dst: dst.as_ref());
        Ok(())
    }

    /// Permanently remove `path`; directories are removed recursively.
    pub async fn delete(&self, path: &Path, kind: NodeKind) -> Result<()> {
        self.executor
            .run(|| async move {
                self.raw
                    .remove(path, kind)
                    .await
                    .map_err(|e| Error::io(path, e))
            })
            .await?;
        let target = path.to_string_lossy();
        log_info!("Deleted {target}", target: target.as_ref());
        Ok(())
    }

    pub async fn move_to_trash(&self, path: &Path) -> Result<()> {
        self.executor
            .run(|| async move {
                let trash = self.trash.clone();
                let target = path.to_path_buf();
                tokio::task::spawn_blocking(move || trash.move_to_trash(&target))
                    .await
                    .map_err(io::Error::other)
                    .and_then(|moved| moved)
                    .map_err(|e| Error::io(path, e))
            })
            .await?;
        let target = path.to_string_lossy();
        log_info!("Moved {target} to trash", target: target.as_ref());
        Ok(())
    }

    pub async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        self.executor
            .run(|| async move { self.raw.read(path).await.map_err(|e| Error::io(path, e)) })
            .await
    }

    /// UTF-8 contents with any leading byte-order mark removed.
    pub async fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = self.read_bytes(path).await?;
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::io(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;
        Ok(strip_bom(text))
    }

    /// Non-empty lines, with CRLF and LF both accepted as terminators.
    pub async fn read_lines(&self, path: &Path) -> Result<Vec<String>> {
        let text = self.read_text(path).await?;
        Ok(text
            .replace("\r\n", "\n")
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub async fn write_bytes(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.executor
            .run(|| async move {
                self.raw
                    .write(path, data)
                    .await
                    .map_err(|e| Error::io(path, e))
            })
            .await
    }

    /// Truncate and overwrite. `None` leaves an empty file.
    pub async fn write_text(&self, path: &Path, text: Option<&str>) -> Result<()> {
        self.write_bytes(path, text.unwrap_or_default().as_bytes())
            .await
    }

    /// Write `lines` joined with CRLF.
    pub async fn write_lines<I, S>(&self, path: &Path, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = lines
            .into_iter()
            .map(|line| line.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\r\n");
        self.write_text(path, Some(&text)).await
    }

    /// Read-modify-write `path` under an exclusive lock. Acquiring the lock
    /// is retried with the update policy; `update` sees the current text
    /// (empty for a new file) and returns the replacement, or `None` to
    /// leave the file alone. Returns whether anything was written.
    pub async fn concurrent_update<F>(&self, path: &Path, update: F) -> Result<bool>
    where
        F: FnOnce(&str) -> Option<String> + Send + 'static,
    {
        let mut handle = self
            .update_executor
            .run(|| async move {
                self.raw
                    .open_locked(path)
                    .await
                    .map_err(|e| Error::io(path, e))
            })
            .await?;

        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<bool> {
            let current = handle.read_text().map_err(|e| Error::io(&target, e))?;
            match update(&current) {
                Some(next) => {
                    handle
                        .replace(&next)
                        .map_err(|e| Error::io(&target, e))?;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
        .await
        .map_err(|e| Error::io(path, io::Error::other(e)))?
    }
}
