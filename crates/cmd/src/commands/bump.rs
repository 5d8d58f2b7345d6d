// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::mpsc;

use anyhow::{Result, anyhow};

use crate::common::{FsContext, Target};

/// Increment the integer stored in a file under its lock and print the new
/// value. A missing or non-numeric file counts as zero.
pub async fn bump_command<F>(ctx: &FsContext, target: &Target, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let file = ctx.file(target)?;
    let (tx, rx) = mpsc::channel();
    let _ = file
        .concurrent_update(move |current| {
            let count: u64 = current.trim().parse().unwrap_or(0);
            let next = (count + 1).to_string();
            let _ = tx.send(next.clone());
            Some(next)
        })
        .await?;

    let value = rx
        .try_recv()
        .map_err(|_| anyhow!("counter update did not run"))?;
    handler(&value);
    Ok(())
}
