// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Node descriptors and alias resolution.
//!
//! A node names a file or directory by one or more aliases under a parent
//! directory node, which may itself have several aliases. Nothing touches
//! the disk until a path is asked for: resolution walks the chain from the
//! root and keeps only the spellings that exist.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;

use diagnostics::log_debug;
use futures::future::try_join_all;

use crate::dir::DirNode;
use crate::error::{Error, Result};
use crate::gateway::FilesystemGateway;

/// OS housekeeping files that listings usually want to skip.
const SYSTEM_ARTIFACTS: [&str; 3] = ["desktop.ini", "thumbs.db", "hwinfo64.ini"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Directory,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => write!(f, "file"),
            NodeKind::Directory => write!(f, "directory"),
        }
    }
}

/// Candidate names for one node, in order of preference. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aliases(Vec<String>);

impl Aliases {
    /// Duplicates are dropped, keeping the first occurrence.
    pub fn new<I, S>(aliases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for alias in aliases {
            let alias = alias.into();
            if alias.is_empty() {
                return Err(Error::invalid_argument("alias must not be empty"));
            }
            if !unique.contains(&alias) {
                unique.push(alias);
            }
        }
        if unique.is_empty() {
            return Err(Error::invalid_argument("a node needs at least one alias"));
        }
        Ok(Self(unique))
    }

    pub fn single<S: Into<String>>(alias: S) -> Result<Self> {
        Self::new([alias])
    }

    /// `base.ext` for every base name.
    pub fn with_extension<I, S>(bases: I, extension: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if extension.is_empty() || extension.contains(['.', '/', '\\']) {
            return Err(Error::invalid_argument(format!(
                "invalid extension {extension:?}"
            )));
        }
        Self::new(
            bases
                .into_iter()
                .map(|base| format!("{}.{extension}", base.as_ref())),
        )
    }

    #[must_use]
    pub fn primary(&self) -> &str {
        &self.0[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.0.iter().any(|a| a == alias)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// One existing spelling of a node: the path and a node carrying only the
/// alias that produced it, under a parent chain of such nodes.
pub(crate) struct Candidate {
    pub path: PathBuf,
    pub node: Node,
}

struct NodeInner {
    kind: NodeKind,
    aliases: Aliases,
    parent: Option<DirNode>,
    gateway: Arc<FilesystemGateway>,
}

/// Shared, immutable node descriptor.
#[derive(Clone)]
pub struct Node(Arc<NodeInner>);

impl Node {
    pub(crate) fn new(
        kind: NodeKind,
        aliases: Aliases,
        parent: Option<DirNode>,
        gateway: Arc<FilesystemGateway>,
    ) -> Self {
        Self(Arc::new(NodeInner {
            kind,
            aliases,
            parent,
            gateway,
        }))
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.0.kind
    }

    #[must_use]
    pub fn aliases(&self) -> &Aliases {
        &self.0.aliases
    }

    /// The primary alias.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.aliases.primary()
    }

    #[must_use]
    pub fn parent(&self) -> Option<&DirNode> {
        self.0.parent.as_ref()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<FilesystemGateway> {
        &self.0.gateway
    }

    /// Number of ancestors.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Some(parent) = current.parent() {
            depth += 1;
            current = parent.as_node();
        }
        depth
    }

    /// The chain from the root down to and including `self`.
    fn lineage(&self) -> Vec<&Node> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(parent) = current.parent() {
            chain.push(parent.as_node());
            current = parent.as_node();
        }
        chain.reverse();
        chain
    }

    /// Existing spellings of this node, ordered by parent candidate first
    /// and alias second. A root's aliases are returned unchecked.
    pub(crate) async fn candidates(&self) -> Result<Vec<Candidate>> {
        let lineage = self.lineage();
        let gateway = self.gateway();
        let root = lineage[0];

        let mut level = root
            .aliases()
            .iter()
            .map(|alias| {
                Ok(Candidate {
                    path: PathBuf::from(alias),
                    node: Node::new(root.kind(), Aliases::single(alias)?, None, gateway.clone()),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for node in &lineage[1..] {
            let mut probes = Vec::with_capacity(level.len() * node.aliases().as_slice().len());
            for parent in &level {
                for alias in node.aliases().iter() {
                    probes.push(Candidate {
                        path: parent.path.join(alias),
                        node: Node::new(
                            node.kind(),
                            Aliases::single(alias)?,
                            Some(DirNode(parent.node.clone())),
                            gateway.clone(),
                        ),
                    });
                }
            }

            let found = try_join_all(
                probes
                    .iter()
                    .map(|probe| gateway.exists(&probe.path, node.kind())),
            )
            .await?;

            level = probes
                .into_iter()
                .zip(found)
                .filter_map(|(probe, exists)| exists.then_some(probe))
                .collect();
            if level.is_empty() {
                break;
            }
        }

        log_debug!("{name} has {count} existing candidates", name: self.name(), count: level.len());
        Ok(level)
    }

    /// Every existing on-disk spelling of this node. For a root, its aliases.
    pub async fn candidate_paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .candidates()
            .await?
            .into_iter()
            .map(|candidate| candidate.path)
            .collect())
    }

    /// The first spelling confirmed to exist.
    pub async fn existing_path(&self) -> Result<Option<PathBuf>> {
        if self.is_root() {
            for alias in self.aliases().iter() {
                let path = PathBuf::from(alias);
                if self.gateway().exists(&path, self.kind()).await? {
                    return Ok(Some(path));
                }
            }
            return Ok(None);
        }
        Ok(self
            .candidates()
            .await?
            .into_iter()
            .next()
            .map(|candidate| candidate.path))
    }

    /// Where this node lives: the existing path if there is one, otherwise
    /// the parent's path joined with the primary alias.
    pub async fn path(&self) -> Result<PathBuf> {
        let mut defaults: Vec<&str> = Vec::new();
        let mut current = self;
        let mut base = PathBuf::new();
        loop {
            if let Some(found) = current.existing_path().await? {
                base = found;
                break;
            }
            defaults.push(current.name());
            match current.parent() {
                Some(parent) => current = parent.as_node(),
                None => break,
            }
        }
        for name in defaults.iter().rev() {
            base.push(name);
        }
        Ok(base)
    }

    /// The alias actually used on disk.
    pub async fn exact_name(&self) -> Result<String> {
        let path = self.path().await?;
        Ok(path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name().to_string()))
    }

    pub async fn exists(&self) -> Result<bool> {
        let path = self.path().await?;
        self.gateway().exists(&path, self.kind()).await
    }

    /// One single-alias node per existing spelling.
    pub async fn existing_alias_nodes(&self) -> Result<Vec<Node>> {
        if self.is_root() {
            let mut nodes = Vec::new();
            for alias in self.aliases().iter() {
                if self.gateway().exists(&PathBuf::from(alias), self.kind()).await? {
                    nodes.push(Node::new(
                        self.kind(),
                        Aliases::single(alias)?,
                        None,
                        self.gateway().clone(),
                    ));
                }
            }
            return Ok(nodes);
        }
        Ok(self
            .candidates()
            .await?
            .into_iter()
            .map(|candidate| candidate.node)
            .collect())
    }

    #[must_use]
    pub fn is_system_artifact(&self) -> bool {
        self.kind() == NodeKind::File
            && self.aliases().iter().any(|alias| {
                SYSTEM_ARTIFACTS
                    .iter()
                    .any(|artifact| alias.eq_ignore_ascii_case(artifact))
            })
    }
}

impl PartialEq for Node {
    /// Same kind, overlapping aliases, and equal parents all the way up.
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (self, other);
        loop {
            if Arc::ptr_eq(&a.0, &b.0) {
                return true;
            }
            if a.kind() != b.kind()
                || !(b.aliases().contains(a.name()) || a.aliases().contains(b.name()))
            {
                return false;
            }
            match (a.parent(), b.parent()) {
                (None, None) => return true,
                (Some(pa), Some(pb)) => {
                    a = pa.as_node();
                    b = pb.as_node();
                }
                _ => return false,
            }
        }
    }
}

impl Eq for Node {}

impl Hash for Node {
    // Equal nodes may have different primary names, so only what equality
    // pins down goes into the hash.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.depth().hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("aliases", &self.aliases().as_slice())
            .field("parent", &self.parent().map(|p| p.name().to_string()))
            .finish()
    }
}
