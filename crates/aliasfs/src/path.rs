// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Parsing of absolute path strings into a root and name segments.

use std::path::{Component, Path};

use crate::env::Environment;
use crate::error::{Error, Result};

/// An absolute path split into its root (`/`, `C:\`) and the names below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedPath {
    pub root: String,
    pub segments: Vec<String>,
}

/// Expand `%NAME%`, `${NAME}`, `$NAME` and a leading `~`. References that
/// do not resolve are kept as written.
pub(crate) fn expand_vars(raw: &str, env: &Environment) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    if let Some(tail) = rest.strip_prefix('~') {
        if tail.is_empty() || tail.starts_with('/') || tail.starts_with('\\') {
            out.push_str(&env.home().to_string_lossy());
            rest = tail;
        }
    }

    while let Some(pos) = rest.find(['%', '$']) {
        out.push_str(&rest[..pos]);
        let marker = &rest[pos..];

        let (name, consumed) = if let Some(after) = marker.strip_prefix('%') {
            match after.find('%') {
                Some(end) if end > 0 => (Some(&after[..end]), end + 2),
                _ => (None, 1),
            }
        } else if let Some(after) = marker.strip_prefix("${") {
            match after.find('}') {
                Some(end) if end > 0 => (Some(&after[..end]), end + 3),
                _ => (None, 1),
            }
        } else {
            let after = &marker[1..];
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            if end > 0 {
                (Some(&after[..end]), end + 1)
            } else {
                (None, 1)
            }
        };

        match name.and_then(|name| env.var(name)) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&marker[..consumed]),
        }
        rest = &marker[consumed..];
    }
    out.push_str(rest);
    out
}

/// On Windows both separators are accepted; elsewhere `\` is an ordinary
/// name character.
pub(crate) fn normalize_separators(raw: &str) -> String {
    if cfg!(windows) {
        raw.replace('/', "\\")
    } else {
        raw.to_string()
    }
}

/// Split an absolute path. `.` is dropped and `..` removes the previous
/// segment; relative paths are rejected.
pub(crate) fn split_absolute(raw: &str) -> Result<ParsedPath> {
    if raw.trim().is_empty() {
        return Err(Error::invalid_argument("path must not be empty"));
    }
    let normalized = normalize_separators(raw);
    let path = Path::new(&normalized);
    if !path.has_root() {
        return Err(Error::invalid_argument(format!(
            "path must be absolute: {raw}"
        )));
    }

    let mut root = String::new();
    let mut segments: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => root.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => root.push(std::path::MAIN_SEPARATOR),
            Component::CurDir => {}
            Component::ParentDir => {
                let _ = segments.pop();
            }
            Component::Normal(name) => segments.push(name.to_string_lossy().into_owned()),
        }
    }

    Ok(ParsedPath { root, segments })
}

/// Expand variables, then split.
pub(crate) fn parse(raw: &str, env: &Environment) -> Result<ParsedPath> {
    split_absolute(&expand_vars(raw, env))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment::new("/home/alice", "alice").with_var("DATA", "/srv/data")
    }

    #[test]
    fn test_expand_windows_style() {
        assert_eq!(
            expand_vars("%USERPROFILE%/Desktop/a.txt", &env()),
            "/home/alice/Desktop/a.txt"
        );
    }

    #[test]
    fn test_expand_unix_style() {
        assert_eq!(expand_vars("$DATA/x", &env()), "/srv/data/x");
        assert_eq!(expand_vars("${DATA}/x", &env()), "/srv/data/x");
        assert_eq!(expand_vars("~/notes", &env()), "/home/alice/notes");
    }

    #[test]
    fn test_unknown_reference_is_kept() {
        assert_eq!(expand_vars("/a/%NOPE%/b", &env()), "/a/%NOPE%/b");
        assert_eq!(expand_vars("/a/100%", &env()), "/a/100%");
        assert_eq!(expand_vars("/a/$", &env()), "/a/$");
    }

    #[cfg(unix)]
    #[test]
    fn test_split_absolute() {
        let parsed = split_absolute("/home/alice/./docs/../Desktop/a.txt").unwrap();
        assert_eq!(parsed.root, "/");
        assert_eq!(parsed.segments, vec!["home", "alice", "Desktop", "a.txt"]);
    }

    #[test]
    fn test_relative_rejected() {
        assert!(matches!(
            split_absolute("relative/path"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(split_absolute("  "), Err(Error::InvalidArgument(_))));
    }
}
