// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::{FsContext, Target};

pub async fn copy_command(ctx: &FsContext, source: &Target, dest: &Target, overwrite: bool) -> Result<()> {
    let from = ctx.file(source)?;
    let to = ctx.file(dest)?;
    from.copy_to(&to, overwrite).await?;
    Ok(())
}

/// Move a file. Reports through `handler` when nothing was moved because
/// the source is missing or the destination exists.
pub async fn move_command<F>(
    ctx: &FsContext,
    source: &Target,
    dest: &Target,
    overwrite: bool,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let from = ctx.file(source)?;
    let to = ctx.file(dest)?;
    if !from.move_to(&to, overwrite).await? {
        handler(&format!("Not moved: {} -> {}", source.path, dest.path));
    }
    Ok(())
}
