// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, anyhow};

use crate::common::{FsContext, Target};

/// Print a text file line by line.
pub async fn cat_command<F>(ctx: &FsContext, target: &Target, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let file = ctx.file(target)?;
    let text = file
        .read_all_text()
        .await?
        .ok_or_else(|| anyhow!("File not found: {}", target.path))?;
    for line in text.lines() {
        handler(line);
    }
    Ok(())
}
