// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use crate::dir::DirNode;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::gateway::FilesystemGateway;
use crate::node::{Aliases, Node, NodeKind};
use crate::path;

/// A file node. Always has a parent directory.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FileNode(Node);

impl Deref for FileNode {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.0
    }
}

impl FileNode {
    #[must_use]
    pub fn new(parent: &DirNode, aliases: Aliases) -> Self {
        Self(Node::new(
            NodeKind::File,
            aliases,
            Some(parent.clone()),
            parent.gateway().clone(),
        ))
    }

    /// The last segment is the file name, everything before it the parent
    /// directory chain.
    pub fn from_absolute_path(gateway: Arc<FilesystemGateway>, path: &str) -> Result<Self> {
        Self::from_absolute_path_in(gateway, path, Environment::process())
    }

    pub fn from_absolute_path_in(
        gateway: Arc<FilesystemGateway>,
        path: &str,
        env: &Environment,
    ) -> Result<Self> {
        let parsed = path::parse(path, env)?;
        let Some((name, dirs)) = parsed.segments.split_last() else {
            return Err(Error::invalid_argument(format!(
                "path has no file name: {path}"
            )));
        };
        let parent = DirNode::from_segments(gateway, &parsed.root, dirs, env)?;
        Ok(Self::new(&parent, Aliases::single(name.as_str())?))
    }

    #[must_use]
    pub fn as_node(&self) -> &Node {
        &self.0
    }

    /// Primary name without its final extension.
    #[must_use]
    pub fn name_without_extension(&self) -> &str {
        Path::new(self.name())
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_else(|| self.name())
    }

    /// Extension of the primary name, without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        Path::new(self.name())
            .extension()
            .and_then(|ext| ext.to_str())
    }

    pub async fn existing_alias_nodes(&self) -> Result<Vec<FileNode>> {
        Ok(self
            .0
            .existing_alias_nodes()
            .await?
            .into_iter()
            .map(FileNode)
            .collect())
    }

    async fn ensure_parent(&self) -> Result<()> {
        match self.parent() {
            Some(parent) => parent.create().await,
            None => Ok(()),
        }
    }

    /// Copy onto `target`, creating its directory if needed.
    ///
    /// Fails with [`Error::SourceNotFound`] if this file does not exist and
    /// with [`Error::TargetExists`] if `target` exists and `overwrite` is
    /// false; nothing is written in either case. Copying onto the file's
    /// own path with `overwrite` does nothing.
    pub async fn copy_to(&self, target: &FileNode, overwrite: bool) -> Result<()> {
        let Some(source) = self.existing_path().await? else {
            return Err(Error::source_not_found(self.path().await?));
        };
        if !overwrite {
            if let Some(existing) = target.existing_path().await? {
                return Err(Error::target_exists(existing));
            }
        }
        target.ensure_parent().await?;
        let destination = target.path().await?;
        if destination == source {
            // Copying a file onto itself would truncate it.
            return Ok(());
        }
        self.gateway().copy(&source, &destination, overwrite).await
    }

    pub async fn copy_to_path(&self, target: &str, overwrite: bool) -> Result<()> {
        let target = FileNode::from_absolute_path(self.gateway().clone(), target)?;
        self.copy_to(&target, overwrite).await
    }

    /// Move onto `target`. Returns false, touching nothing, when this file
    /// does not exist or when `target` exists and `overwrite` is false.
    /// A target that resolves to this file's own path is already in place.
    pub async fn move_to(&self, target: &FileNode, overwrite: bool) -> Result<bool> {
        let Some(source) = self.existing_path().await? else {
            return Ok(false);
        };
        if let Some(existing) = target.existing_path().await? {
            if existing == source {
                return Ok(true);
            }
            if !overwrite {
                return Ok(false);
            }
            self.gateway().delete(&existing, NodeKind::File).await?;
            self.gateway().rename(&source, &existing).await?;
            return Ok(true);
        }
        target.ensure_parent().await?;
        let destination = target.path().await?;
        self.gateway().rename(&source, &destination).await?;
        Ok(true)
    }

    /// `None` when the file does not exist.
    pub async fn read_all_text(&self) -> Result<Option<String>> {
        match self.existing_path().await? {
            Some(path) => Ok(Some(self.gateway().read_text(&path).await?)),
            None => Ok(None),
        }
    }

    /// Non-empty lines; empty when the file does not exist.
    pub async fn read_all_lines(&self) -> Result<Vec<String>> {
        match self.existing_path().await? {
            Some(path) => self.gateway().read_lines(&path).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn read_all_bytes(&self) -> Result<Option<Vec<u8>>> {
        match self.existing_path().await? {
            Some(path) => Ok(Some(self.gateway().read_bytes(&path).await?)),
            None => Ok(None),
        }
    }

    pub async fn write_all_text<S: AsRef<str>>(&self, text: S) -> Result<()> {
        self.ensure_parent().await?;
        let path = self.path().await?;
        self.gateway().write_text(&path, Some(text.as_ref())).await
    }

    /// Lines are joined with CRLF.
    pub async fn write_all_lines<I, S>(&self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_parent().await?;
        let path = self.path().await?;
        self.gateway().write_lines(&path, lines).await
    }

    pub async fn write_all_bytes(&self, data: &[u8]) -> Result<()> {
        self.ensure_parent().await?;
        let path = self.path().await?;
        self.gateway().write_bytes(&path, data).await
    }

    pub async fn delete(&self, use_trash: bool) -> Result<()> {
        let Some(path) = self.existing_path().await? else {
            return Ok(());
        };
        if use_trash {
            self.gateway().move_to_trash(&path).await
        } else {
            self.gateway().delete(&path, NodeKind::File).await
        }
    }

    /// Read-modify-write under an exclusive lock, creating the file if
    /// needed. See [`FilesystemGateway::concurrent_update`].
    pub async fn concurrent_update<F>(&self, update: F) -> Result<bool>
    where
        F: FnOnce(&str) -> Option<String> + Send + 'static,
    {
        self.ensure_parent().await?;
        let path = self.path().await?;
        self.gateway().concurrent_update(&path, update).await
    }
}

impl fmt::Display for FileNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for FileNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FileNode").field(&self.0).finish()
    }
}
