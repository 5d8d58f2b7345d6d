// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use diagnostics::log_info;

use crate::common::{FsContext, Target};

/// Replace the file's contents, creating missing directories. Without
/// content the file is left empty.
pub async fn write_command(ctx: &FsContext, target: &Target, content: Option<&str>) -> Result<()> {
    let file = ctx.file(target)?;
    file.write_all_text(content.unwrap_or_default()).await?;

    let path = file.path().await?;
    let path = path.to_string_lossy();
    log_info!("Wrote {path}", path: path.as_ref());
    Ok(())
}
