// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use diagnostics::log_debug;

use crate::env::Environment;
use crate::error::Result;
use crate::file::FileNode;
use crate::gateway::FilesystemGateway;
use crate::node::{Aliases, Node, NodeKind};
use crate::path;

/// A directory node.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DirNode(pub(crate) Node);

/// One item of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Dir(DirNode),
    File(FileNode),
}

impl Entry {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Entry::Dir(dir) => dir.name(),
            Entry::File(file) => file.name(),
        }
    }
}

impl Deref for DirNode {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.0
    }
}

impl DirNode {
    /// A root such as `/`, `C:\` or `\\server\share`.
    pub fn root<S: Into<String>>(gateway: Arc<FilesystemGateway>, name: S) -> Result<Self> {
        Self::root_aliases(gateway, [name])
    }

    pub fn root_aliases<I, S>(gateway: Arc<FilesystemGateway>, aliases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self(Node::new(
            NodeKind::Directory,
            Aliases::new(aliases)?,
            None,
            gateway,
        )))
    }

    /// Parse an absolute path, substituting the multi-alias user profile
    /// for the current user's profile directory.
    pub fn from_absolute_path(gateway: Arc<FilesystemGateway>, path: &str) -> Result<Self> {
        Self::from_absolute_path_in(gateway, path, Environment::process())
    }

    pub fn from_absolute_path_in(
        gateway: Arc<FilesystemGateway>,
        path: &str,
        env: &Environment,
    ) -> Result<Self> {
        let parsed = path::parse(path, env)?;
        Self::from_segments(gateway, &parsed.root, &parsed.segments, env)
    }

    pub(crate) fn from_segments(
        gateway: Arc<FilesystemGateway>,
        root: &str,
        segments: &[String],
        env: &Environment,
    ) -> Result<Self> {
        let profiles = env.profiles_dir();
        let profile_aliases = env.profile_aliases();

        let mut dir = Self::root(gateway, root)?;
        let mut concrete = PathBuf::from(root);
        for segment in segments {
            let in_profiles = profiles.is_some_and(|p| p == concrete.as_path());
            dir = if in_profiles && profile_aliases.contains(segment) {
                dir.child_dir_aliases(profile_aliases.iter().cloned())?
            } else {
                dir.child_dir(segment.as_str())?
            };
            concrete.push(segment);
        }
        Ok(dir)
    }

    #[must_use]
    pub fn as_node(&self) -> &Node {
        &self.0
    }

    pub fn child_dir<S: Into<String>>(&self, name: S) -> Result<DirNode> {
        self.child_dir_aliases([name])
    }

    pub fn child_dir_aliases<I, S>(&self, aliases: I) -> Result<DirNode>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(DirNode(Node::new(
            NodeKind::Directory,
            Aliases::new(aliases)?,
            Some(self.clone()),
            self.gateway().clone(),
        )))
    }

    pub fn child_file<S: Into<String>>(&self, name: S) -> Result<FileNode> {
        self.child_file_aliases([name])
    }

    pub fn child_file_aliases<I, S>(&self, aliases: I) -> Result<FileNode>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(FileNode::new(self, Aliases::new(aliases)?))
    }

    /// A file spelled `base.extension` for each base name.
    pub fn child_file_with_extension<I, S>(&self, bases: I, extension: &str) -> Result<FileNode>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(FileNode::new(self, Aliases::with_extension(bases, extension)?))
    }

    /// Create this directory and any missing ancestors. An existing
    /// directory is left alone.
    pub async fn create(&self) -> Result<()> {
        if self.exists().await? {
            return Ok(());
        }

        let mut missing = vec![self];
        let mut current = self;
        while let Some(parent) = current.parent() {
            if parent.exists().await? {
                break;
            }
            missing.push(parent);
            current = parent;
        }

        // Outermost first; each path is resolved after its parent exists.
        for dir in missing.iter().rev() {
            let path = dir.path().await?;
            self.gateway().create_directory(&path).await?;
        }
        Ok(())
    }

    /// Files across every existing spelling of this directory.
    pub async fn file_paths(&self) -> Result<Vec<PathBuf>> {
        self.listing(NodeKind::File).await
    }

    /// Subdirectories across every existing spelling of this directory.
    pub async fn directory_paths(&self) -> Result<Vec<PathBuf>> {
        self.listing(NodeKind::Directory).await
    }

    async fn listing(&self, kind: NodeKind) -> Result<Vec<PathBuf>> {
        let gateway = self.gateway();
        let mut paths: Vec<PathBuf> = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        for dir in self.candidate_paths().await? {
            let listed = match kind {
                NodeKind::File => gateway.list_files(&dir).await?,
                NodeKind::Directory => gateway.list_directories(&dir).await?,
            };
            for path in listed {
                if seen.insert(path.clone()) {
                    paths.push(path);
                }
            }
        }
        let (dir, kind) = (self.name(), kind.to_string());
        log_debug!("Listed {count} {kind} entries under {dir}", count: paths.len(), kind: kind.as_str(), dir: dir);
        Ok(paths)
    }

    pub async fn files(&self) -> Result<Vec<FileNode>> {
        self.file_paths()
            .await?
            .iter()
            .map(|path| self.child_file(entry_name(path)))
            .collect()
    }

    pub async fn directories(&self) -> Result<Vec<DirNode>> {
        self.directory_paths()
            .await?
            .iter()
            .map(|path| self.child_dir(entry_name(path)))
            .collect()
    }

    /// Directories, then files.
    pub async fn entries(&self) -> Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .directories()
            .await?
            .into_iter()
            .map(Entry::Dir)
            .collect();
        entries.extend(self.files().await?.into_iter().map(Entry::File));
        Ok(entries)
    }

    pub async fn existing_alias_nodes(&self) -> Result<Vec<DirNode>> {
        Ok(self
            .0
            .existing_alias_nodes()
            .await?
            .into_iter()
            .map(DirNode)
            .collect())
    }

    /// Remove the directory and its contents, to the trash or for good.
    /// Nothing happens if it does not exist.
    pub async fn delete(&self, use_trash: bool) -> Result<()> {
        let Some(path) = self.existing_path().await? else {
            return Ok(());
        };
        if use_trash {
            self.gateway().move_to_trash(&path).await
        } else {
            self.gateway().delete(&path, NodeKind::Directory).await
        }
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

impl fmt::Display for DirNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for DirNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DirNode").field(&self.0).finish()
    }
}
