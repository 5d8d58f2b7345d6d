// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! aliasfs - files and directories known by more than one name
//!
//! Nodes carry every spelling a file or directory may have on disk (a
//! localized folder name, a profile that moved to OneDrive) and resolve to
//! whichever one exists. All I/O goes through a gateway that retries
//! transient failures.
//!
//! Set ALIASFS_LOG to control logging:
//! - ALIASFS_LOG=off (default) - silent
//! - ALIASFS_LOG=info - directory creation, moves and deletes
//! - ALIASFS_LOG=debug - resolution and listing details

/// Error types
pub mod error;

/// Retry policy and executor
pub mod retry;

/// Retry configuration from YAML and environment
pub mod config;

// Process environment and path parsing
pub mod env;
mod path;

/// Raw filesystem seam and the retrying gateway
pub mod gateway;

// Node model
pub mod dir;
pub mod file;
pub mod node;

// Well-known user folders
pub mod known;

// Fault-injecting doubles shared by the test suites
pub mod testing;

pub use config::{FsConfig, RetryConfig};
pub use dir::{DirNode, Entry};
pub use env::Environment;
pub use error::{Error, Result};
pub use file::FileNode;
pub use gateway::{FilesystemGateway, HostFs, LockedFile, RawFs, SystemTrash, Trash};
pub use known::{KnownFolders, known_folders};
pub use node::{Aliases, Node, NodeKind};
pub use retry::{RetryExecutor, RetryPolicy};

#[cfg(test)]
mod tests;
