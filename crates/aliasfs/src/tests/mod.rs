// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

mod resolve;
mod retry;

use std::sync::Arc;

use tempfile::TempDir;

use crate::dir::DirNode;
use crate::env::Environment;
use crate::gateway::FilesystemGateway;
use crate::testing::{RecordingTrash, host_gateway};

/// Host gateway with short retry delays and a throwaway trash.
pub(crate) fn test_gateway() -> Arc<FilesystemGateway> {
    host_gateway(Arc::new(RecordingTrash::default())).unwrap()
}

/// An environment whose profile directory cannot collide with a temp dir.
pub(crate) fn test_env() -> Environment {
    Environment::new("/nonexistent-profiles/tester", "tester")
}

/// The temp dir as a directory node over `gateway`.
pub(crate) fn dir_node(gateway: Arc<FilesystemGateway>, tmp: &TempDir) -> DirNode {
    DirNode::from_absolute_path_in(gateway, tmp.path().to_str().unwrap(), &test_env()).unwrap()
}

pub(crate) fn tmp_root(tmp: &TempDir) -> DirNode {
    dir_node(test_gateway(), tmp)
}
