// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::{FsContext, Target};

/// Delete a file, or a directory tree with `dir`. Missing targets are
/// ignored.
pub async fn remove_command(ctx: &FsContext, target: &Target, dir: bool, use_trash: bool) -> Result<()> {
    if dir {
        ctx.dir(target)?.delete(use_trash).await?;
    } else {
        ctx.file(target)?.delete(use_trash).await?;
    }
    Ok(())
}
