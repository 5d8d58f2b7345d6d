// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::fs;

use tempfile::TempDir;

use super::{test_gateway, tmp_root};
use crate::dir::DirNode;
use crate::env::Environment;
use crate::error::Error;
use crate::file::FileNode;
use crate::node::Aliases;

#[tokio::test]
async fn test_resolves_to_existing_alias() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("a2")).unwrap();

    let root = tmp_root(&tmp);
    let dir = root.child_dir_aliases(["a1", "a2"]).unwrap();

    assert_eq!(dir.path().await.unwrap(), tmp.path().join("a2"));
    assert_eq!(dir.name(), "a1");
    assert_eq!(dir.exact_name().await.unwrap(), "a2");
    assert!(dir.exists().await.unwrap());
}

#[tokio::test]
async fn test_falls_back_to_primary_alias() {
    let tmp = TempDir::new().unwrap();
    let root = tmp_root(&tmp);
    let file = root
        .child_dir("missing")
        .unwrap()
        .child_file_aliases(["first.txt", "second.txt"])
        .unwrap();

    assert_eq!(
        file.path().await.unwrap(),
        tmp.path().join("missing").join("first.txt")
    );
    assert_eq!(file.existing_path().await.unwrap(), None);
    assert_eq!(file.exact_name().await.unwrap(), "first.txt");
    assert!(!file.exists().await.unwrap());
}

#[tokio::test]
async fn test_candidates_are_parent_major() {
    let tmp = TempDir::new().unwrap();
    for dir in ["p1/c2", "p2/c1", "p2/c2"] {
        fs::create_dir_all(tmp.path().join(dir)).unwrap();
    }

    let root = tmp_root(&tmp);
    let child = root
        .child_dir_aliases(["p1", "p2"])
        .unwrap()
        .child_dir_aliases(["c1", "c2"])
        .unwrap();

    let expected = vec![
        tmp.path().join("p1").join("c2"),
        tmp.path().join("p2").join("c1"),
        tmp.path().join("p2").join("c2"),
    ];
    assert_eq!(child.candidate_paths().await.unwrap(), expected);
    assert_eq!(
        child.existing_path().await.unwrap(),
        Some(tmp.path().join("p1").join("c2"))
    );
}

#[tokio::test]
async fn test_kind_must_match() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("data"), "not a directory").unwrap();

    let root = tmp_root(&tmp);
    let dir = root.child_dir("data").unwrap();
    let file = root.child_file("data").unwrap();

    assert!(!dir.exists().await.unwrap());
    assert!(file.exists().await.unwrap());
}

#[tokio::test]
async fn test_existing_alias_nodes() {
    let tmp = TempDir::new().unwrap();
    let root = tmp_root(&tmp);
    let file = root.child_file_aliases(["test1.txt", "test2.txt"]).unwrap();

    fs::write(tmp.path().join("test1.txt"), "").unwrap();
    let nodes = file.existing_alias_nodes().await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].aliases().as_slice(), ["test1.txt"]);

    fs::write(tmp.path().join("test2.txt"), "").unwrap();
    let nodes = file.existing_alias_nodes().await.unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[1].path().await.unwrap(), tmp.path().join("test2.txt"));

    // Each concrete node still equals the multi-alias node it came from.
    assert!(nodes.iter().all(|node| *node == file));
}

#[tokio::test]
async fn test_root_aliases() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("no-such-root");
    let present = tmp.path().to_string_lossy().into_owned();

    let root = DirNode::root_aliases(
        test_gateway(),
        [missing.to_string_lossy().into_owned(), present.clone()],
    )
    .unwrap();

    // A root's candidates are its aliases as given.
    assert_eq!(root.candidate_paths().await.unwrap().len(), 2);
    assert_eq!(
        root.existing_path().await.unwrap(),
        Some(tmp.path().to_path_buf())
    );
    assert_eq!(root.existing_alias_nodes().await.unwrap().len(), 1);
    assert_eq!(root.exact_name().await.unwrap(), tmp.path().file_name().unwrap().to_string_lossy());
}

#[test]
fn test_profile_spellings_are_equal() {
    let env = Environment::new("/home/alice", "alice").with_var("DATA", "/srv/data");
    let gateway = test_gateway();

    let own = FileNode::from_absolute_path_in(gateway.clone(), "/home/alice/Desktop/test.txt", &env).unwrap();
    let public = FileNode::from_absolute_path_in(gateway.clone(), "/home/Public/Desktop/test.txt", &env).unwrap();
    let expanded =
        FileNode::from_absolute_path_in(gateway.clone(), "%USERPROFILE%/Desktop/test.txt", &env).unwrap();
    let other_user = FileNode::from_absolute_path_in(gateway, "/home/bob/Desktop/test.txt", &env).unwrap();

    assert_eq!(own, public);
    assert_eq!(own, expanded);
    assert_ne!(own, other_user);

    let set: HashSet<FileNode> = [own, public, expanded].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_disjoint_aliases_are_not_equal() {
    let tmp = TempDir::new().unwrap();
    let root = tmp_root(&tmp);

    let a = root.child_file_aliases(["report.txt", "old.txt"]).unwrap();
    let b = root.child_file_aliases(["report.txt"]).unwrap();
    let c = root.child_file_aliases(["other.txt"]).unwrap();
    let dir = root.child_dir("report.txt").unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(*a.as_node(), *dir.as_node());
}

#[test]
fn test_aliases_keep_first_seen_order() {
    let aliases = Aliases::new(["b", "a", "b", "c", "a"]).unwrap();
    assert_eq!(aliases.as_slice(), ["b", "a", "c"]);
    assert_eq!(aliases.primary(), "b");
}

#[test]
fn test_aliases_validation() {
    assert!(matches!(
        Aliases::new(Vec::<String>::new()),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(Aliases::new(["ok", ""]), Err(Error::InvalidArgument(_))));

    let aliases = Aliases::with_extension(["notes", "Notes"], "txt").unwrap();
    assert_eq!(aliases.as_slice(), ["notes.txt", "Notes.txt"]);
    for bad in ["", "tar.gz", "a/b", "a\\b"] {
        assert!(
            matches!(Aliases::with_extension(["x"], bad), Err(Error::InvalidArgument(_))),
            "extension {bad:?} accepted"
        );
    }
}

#[test]
fn test_system_artifacts() {
    let tmp = TempDir::new().unwrap();
    let root = tmp_root(&tmp);

    assert!(root.child_file("Thumbs.db").unwrap().is_system_artifact());
    assert!(root.child_file_aliases(["x", "DESKTOP.INI"]).unwrap().is_system_artifact());
    assert!(!root.child_file("notes.txt").unwrap().is_system_artifact());
    assert!(!root.child_dir("desktop.ini").unwrap().is_system_artifact());
}

#[test]
fn test_display_is_primary_name() {
    let tmp = TempDir::new().unwrap();
    let root = tmp_root(&tmp);
    let file = root.child_file_aliases(["shown.txt", "hidden.txt"]).unwrap();
    assert_eq!(file.to_string(), "shown.txt");
}
