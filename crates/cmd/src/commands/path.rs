// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::{FsContext, Target};

/// Print where the target resolves to: the first spelling that exists, or
/// the primary spelling under the resolved parent.
pub async fn path_command<F>(ctx: &FsContext, target: &Target, dir: bool, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let path = if dir {
        ctx.dir(target)?.path().await?
    } else {
        ctx.file(target)?.path().await?
    };
    handler(&path.to_string_lossy());
    Ok(())
}

/// Print `true` or `false`.
pub async fn exists_command<F>(ctx: &FsContext, target: &Target, dir: bool, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let exists = if dir {
        ctx.dir(target)?.exists().await?
    } else {
        ctx.file(target)?.exists().await?
    };
    handler(if exists { "true" } else { "false" });
    Ok(())
}
