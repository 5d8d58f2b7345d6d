// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use diagnostics::log_debug;

use crate::common::{FsContext, Target};

pub async fn mkdir_command(ctx: &FsContext, target: &Target) -> Result<()> {
    log_debug!("Creating directory {path}", path: target.path.as_str());
    ctx.dir(target)?.create().await?;
    Ok(())
}
