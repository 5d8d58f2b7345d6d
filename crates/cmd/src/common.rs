// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::sync::Arc;

use aliasfs::{
    DirNode, Environment, FileNode, FilesystemGateway, FsConfig, HostFs, SystemTrash,
};
use anyhow::{Result, anyhow};
use clap::Args;
use diagnostics::log_debug;

/// A path on the command line plus any extra spellings of its last segment.
#[derive(Args, Clone, Debug, Default)]
pub struct Target {
    /// Absolute path; `%VAR%`, `$VAR` and a leading `~` are expanded
    pub path: String,
    /// Another name the last segment may have on disk (repeatable)
    #[arg(long = "alias", value_name = "NAME")]
    pub aliases: Vec<String>,
}

impl Target {
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            aliases: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_alias<S: Into<String>>(mut self, alias: S) -> Self {
        self.aliases.push(alias.into());
        self
    }

    fn names(&self, primary: &str) -> Vec<String> {
        std::iter::once(primary.to_string())
            .chain(self.aliases.iter().cloned())
            .collect()
    }
}

/// Gateway and environment shared by every command.
pub struct FsContext {
    gateway: Arc<FilesystemGateway>,
    env: Environment,
}

impl FsContext {
    /// Host filesystem with retry settings from `config` if given, otherwise
    /// from the `ALIASFS_*` variables.
    pub fn from_config(config: Option<&Path>) -> Result<Self> {
        let settings = match config {
            Some(path) => FsConfig::load(path)?,
            None => FsConfig::from_env()?,
        };
        let gateway =
            FilesystemGateway::with_config(Arc::new(HostFs), Arc::new(SystemTrash), &settings)?;
        Ok(Self {
            gateway: Arc::new(gateway),
            env: Environment::from_process(),
        })
    }

    #[must_use]
    pub fn with_gateway(gateway: Arc<FilesystemGateway>, env: Environment) -> Self {
        Self { gateway, env }
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<FilesystemGateway> {
        &self.gateway
    }

    pub fn dir(&self, target: &Target) -> Result<DirNode> {
        log_debug!("Parsing directory {path}", path: target.path.as_str());
        let dir = DirNode::from_absolute_path_in(self.gateway.clone(), &target.path, &self.env)?;
        if target.aliases.is_empty() {
            return Ok(dir);
        }
        let names = target.names(dir.name());
        Ok(match dir.parent() {
            Some(parent) => parent.child_dir_aliases(names)?,
            None => DirNode::root_aliases(self.gateway.clone(), names)?,
        })
    }

    pub fn file(&self, target: &Target) -> Result<FileNode> {
        log_debug!("Parsing file {path}", path: target.path.as_str());
        let file = FileNode::from_absolute_path_in(self.gateway.clone(), &target.path, &self.env)?;
        if target.aliases.is_empty() {
            return Ok(file);
        }
        let parent = file
            .parent()
            .ok_or_else(|| anyhow!("{} has no parent directory", target.path))?;
        Ok(parent.child_file_aliases(target.names(file.name()))?)
    }
}
