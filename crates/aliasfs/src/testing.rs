// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Test doubles for the gateway seams.
//!
//! [`FlakyFs`] fails a chosen number of raw calls before delegating.
//! [`RecordingTrash`] remembers what it was asked to discard; [`FlakyTrash`]
//! refuses a few requests first.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{FsConfig, RetryConfig};
use crate::error::Result;
use crate::gateway::{FilesystemGateway, HostFs, LockedFile, RawFs, Trash};
use crate::node::NodeKind;

/// A [`RawFs`] that fails the next `failures` calls with `kind`, then
/// delegates to the wrapped implementation.
pub struct FlakyFs {
    inner: Arc<dyn RawFs>,
    remaining: AtomicUsize,
    calls: AtomicUsize,
    kind: io::ErrorKind,
}

impl FlakyFs {
    pub fn new(inner: Arc<dyn RawFs>, failures: usize) -> Self {
        Self {
            inner,
            remaining: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
            kind: io::ErrorKind::PermissionDenied,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: io::ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Arm another `failures` failures.
    pub fn fail_next(&self, failures: usize) {
        self.remaining.store(failures, Ordering::SeqCst);
    }

    /// Raw calls seen so far, failed ones included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn trip(&self) -> io::Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let armed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            Err(io::Error::new(
                self.kind,
                format!("injected failure on call {call}"),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RawFs for FlakyFs {
    async fn exists(&self, path: &Path, kind: NodeKind) -> io::Result<bool> {
        self.trip()?;
        self.inner.exists(path, kind).await
    }

    async fn list(&self, dir: &Path, kind: NodeKind) -> io::Result<Vec<PathBuf>> {
        self.trip()?;
        self.inner.list(dir, kind).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.trip()?;
        self.inner.create_dir_all(path).await
    }

    async fn copy(&self, from: &Path, to: &Path, overwrite: bool) -> io::Result<()> {
        self.trip()?;
        self.inner.copy(from, to, overwrite).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.trip()?;
        self.inner.rename(from, to).await
    }

    async fn remove(&self, path: &Path, kind: NodeKind) -> io::Result<()> {
        self.trip()?;
        self.inner.remove(path, kind).await
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.trip()?;
        self.inner.read(path).await
    }

    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.trip()?;
        self.inner.write(path, data).await
    }

    async fn open_locked(&self, path: &Path) -> io::Result<Box<dyn LockedFile>> {
        self.trip()?;
        self.inner.open_locked(path).await
    }
}

/// A [`Trash`] that records each request and removes the target from disk.
#[derive(Debug, Default)]
pub struct RecordingTrash {
    moved: Mutex<Vec<PathBuf>>,
}

impl RecordingTrash {
    #[must_use]
    pub fn moved(&self) -> Vec<PathBuf> {
        self.moved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Trash for RecordingTrash {
    fn move_to_trash(&self, path: &Path) -> io::Result<()> {
        if path.is_dir() {
            std::fs::remove_dir_all(path)?;
        } else {
            std::fs::remove_file(path)?;
        }
        self.moved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_path_buf());
        Ok(())
    }
}

/// A [`Trash`] that fails the next `failures` requests with
/// `PermissionDenied`, then hands them to a [`RecordingTrash`].
#[derive(Debug, Default)]
pub struct FlakyTrash {
    inner: RecordingTrash,
    remaining: AtomicUsize,
    calls: AtomicUsize,
}

impl FlakyTrash {
    #[must_use]
    pub fn new(failures: usize) -> Self {
        Self {
            inner: RecordingTrash::default(),
            remaining: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
        }
    }

    /// Requests seen so far, failed ones included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Paths that reached the trash.
    #[must_use]
    pub fn moved(&self) -> Vec<PathBuf> {
        self.inner.moved()
    }
}

impl Trash for FlakyTrash {
    fn move_to_trash(&self, path: &Path) -> io::Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("recycle bin busy on call {call}"),
            ));
        }
        self.inner.move_to_trash(path)
    }
}

/// Short retry delays so failing paths finish quickly, and an update budget
/// deep enough for a thousand writers queueing on one lock.
#[must_use]
pub fn fast_config() -> FsConfig {
    FsConfig {
        retry: RetryConfig {
            max_retries: 10,
            delay: Duration::from_millis(1),
        },
        update_retry: RetryConfig {
            max_retries: 4000,
            delay: Duration::from_millis(5),
        },
    }
}

/// Host filesystem, recording trash and [`fast_config`].
pub fn host_gateway(trash: Arc<RecordingTrash>) -> Result<Arc<FilesystemGateway>> {
    Ok(Arc::new(FilesystemGateway::with_config(
        Arc::new(HostFs),
        trash,
        &fast_config(),
    )?))
}
