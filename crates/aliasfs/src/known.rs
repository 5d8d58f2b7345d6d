// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Well-known folders under the current user's profile.

use std::sync::{Arc, LazyLock};

use crate::dir::DirNode;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::gateway::FilesystemGateway;

static KNOWN: LazyLock<std::result::Result<KnownFolders, String>> = LazyLock::new(|| {
    KnownFolders::new(FilesystemGateway::host(), Environment::process()).map_err(|e| e.to_string())
});

/// Localized spellings of the documents folder.
const DOCUMENTS: [&str; 2] = ["المستندات", "Documents"];

#[derive(Debug, Clone)]
pub struct KnownFolders {
    /// The profile directory, aliased as the user, `Public` and OneDrive.
    pub user: DirNode,
    pub desktop: DirNode,
    pub documents: DirNode,
    pub temp: DirNode,
    pub start_menu_programs: DirNode,
    pub startup: DirNode,
}

impl KnownFolders {
    pub fn new(gateway: Arc<FilesystemGateway>, env: &Environment) -> Result<Self> {
        let profiles = env
            .profiles_dir()
            .ok_or_else(|| Error::invalid_argument("home directory has no parent"))?;
        let profiles = DirNode::from_absolute_path_in(gateway.clone(), &profiles.to_string_lossy(), env)?;
        let user = profiles.child_dir_aliases(env.profile_aliases())?;

        let start_menu_programs = user
            .child_dir("AppData")?
            .child_dir("Roaming")?
            .child_dir("Microsoft")?
            .child_dir("Windows")?
            .child_dir("Start Menu")?
            .child_dir("Programs")?;

        Ok(Self {
            desktop: user.child_dir("Desktop")?,
            documents: user.child_dir_aliases(DOCUMENTS)?,
            temp: DirNode::from_absolute_path_in(gateway, &env.temp().to_string_lossy(), env)?,
            startup: start_menu_programs.child_dir("Startup")?,
            start_menu_programs,
            user,
        })
    }
}

/// Folders of the running user over the host gateway, built on first use.
pub fn known_folders() -> Result<&'static KnownFolders> {
    KNOWN.as_ref().map_err(|e| Error::config(e.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_gateway;

    #[test]
    fn test_layout() {
        let env = Environment::new("/home/alice", "alice").with_temp("/var/tmp");
        let known = KnownFolders::new(test_gateway(), &env).unwrap();

        assert_eq!(known.user.name(), "alice");
        assert!(known.user.aliases().contains("Public"));
        assert_eq!(known.documents.aliases().as_slice().len(), 2);
        assert_eq!(known.desktop.parent(), Some(&known.user));
        assert_eq!(known.startup.parent(), Some(&known.start_menu_programs));
        assert_eq!(known.temp.name(), "tmp");
    }

    #[test]
    fn test_profile_path_maps_to_user_folder() {
        let env = Environment::new("/home/alice", "alice");
        let known = KnownFolders::new(test_gateway(), &env).unwrap();
        let parsed = DirNode::from_absolute_path_in(test_gateway(), "/home/Public/Desktop", &env).unwrap();
        assert_eq!(parsed, known.desktop);
    }
}
