// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static PROCESS: LazyLock<Environment> = LazyLock::new(Environment::from_process);

/// Name of the shared profile that aliases every user's profile directory.
pub const PUBLIC_PROFILE: &str = "Public";

/// Home directory, user name and variable lookup used to seed root nodes
/// and to expand `%VAR%` / `$VAR` references in parsed paths.
#[derive(Debug, Clone)]
pub struct Environment {
    home: PathBuf,
    user: String,
    temp: PathBuf,
    vars: BTreeMap<String, String>,
    inherit: bool,
}

impl Environment {
    /// An environment that only knows what it is given.
    pub fn new<P: Into<PathBuf>, S: Into<String>>(home: P, user: S) -> Self {
        let home = home.into();
        Self {
            temp: home.join("tmp"),
            home,
            user: user.into(),
            vars: BTreeMap::new(),
            inherit: false,
        }
    }

    /// Snapshot of the running process: home from the platform, user from
    /// `USER` / `USERNAME`, variables looked up live.
    #[must_use]
    pub fn from_process() -> Self {
        let home = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .ok()
            .or_else(|| {
                home.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "user".to_string());
        Self {
            home,
            user,
            temp: std::env::temp_dir(),
            vars: BTreeMap::new(),
            inherit: true,
        }
    }

    /// The process-wide environment, captured once.
    #[must_use]
    pub fn process() -> &'static Environment {
        &PROCESS
    }

    #[must_use]
    pub fn with_var<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        let _ = self.vars.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_temp<P: Into<PathBuf>>(mut self, temp: P) -> Self {
        self.temp = temp.into();
        self
    }

    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn temp(&self) -> &Path {
        &self.temp
    }

    /// Variable lookup. `HOME` and `USERPROFILE` always resolve to the home
    /// directory so both spellings work on every platform.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<String> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.clone());
        }
        if self.inherit {
            if let Ok(value) = std::env::var(name) {
                return Some(value);
            }
        }
        match name {
            "HOME" | "USERPROFILE" => Some(self.home.to_string_lossy().into_owned()),
            _ => None,
        }
    }

    /// Directory holding every user's profile (`/home`, `C:\Users`).
    #[must_use]
    pub fn profiles_dir(&self) -> Option<&Path> {
        self.home.parent()
    }

    /// Names under which the current user's profile may appear, in order
    /// of preference.
    #[must_use]
    pub fn profile_aliases(&self) -> Vec<String> {
        let onedrive = Path::new(&self.user).join("OneDrive");
        vec![
            self.user.clone(),
            PUBLIC_PROFILE.to_string(),
            onedrive.to_string_lossy().into_owned(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolated_lookup() {
        let env = Environment::new("/home/alice", "alice").with_var("DATA", "/srv/data");
        assert_eq!(env.var("DATA").as_deref(), Some("/srv/data"));
        assert_eq!(env.var("USERPROFILE").as_deref(), Some("/home/alice"));
        assert_eq!(env.var("ALIASFS_SURELY_UNSET"), None);
    }

    #[test]
    fn test_profile_aliases() {
        let env = Environment::new("/home/alice", "alice");
        let aliases = env.profile_aliases();
        assert_eq!(aliases[0], "alice");
        assert_eq!(aliases[1], "Public");
        assert_eq!(aliases.len(), 3);
        assert_eq!(env.profiles_dir(), Some(Path::new("/home")));
    }
}
