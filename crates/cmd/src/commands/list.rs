// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use aliasfs::Entry;
use anyhow::Result;

use crate::common::{FsContext, Target};

/// List a directory across all of its spellings: subdirectories first,
/// marked with a trailing `/`, then files. A name present under several
/// spellings is printed once. OS housekeeping files are hidden unless
/// `show_all` is set.
pub async fn list_command<F>(ctx: &FsContext, target: &Target, show_all: bool, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let dir = ctx.dir(target)?;
    let mut seen: HashSet<String> = HashSet::new();
    for entry in dir.entries().await? {
        let line = match &entry {
            Entry::Dir(sub) => format!("{}/", sub.name()),
            Entry::File(file) if show_all || !file.is_system_artifact() => file.name().to_string(),
            Entry::File(_) => continue,
        };
        if seen.insert(line.clone()) {
            handler(&line);
        }
    }
    Ok(())
}
