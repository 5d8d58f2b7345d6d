// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::commands::{
    bump_command, cat_command, copy_command, exists_command, list_command, mkdir_command,
    move_command, path_command, remove_command, write_command,
};
use cmd::{FsContext, Target};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "aliasfs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// YAML file with retry settings (defaults come from ALIASFS_* variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the path a file or directory resolves to
    Path {
        #[command(flatten)]
        target: Target,
        /// Treat the target as a directory
        #[arg(short, long)]
        dir: bool,
    },
    /// Print whether a file or directory exists under any spelling
    Exists {
        #[command(flatten)]
        target: Target,
        /// Treat the target as a directory
        #[arg(short, long)]
        dir: bool,
    },
    /// List a directory across all of its spellings
    Ls {
        #[command(flatten)]
        target: Target,
        /// Include desktop.ini, thumbs.db and similar files
        #[arg(short, long)]
        all: bool,
    },
    /// Print a text file
    Cat {
        #[command(flatten)]
        target: Target,
    },
    /// Replace a file's contents
    Write {
        #[command(flatten)]
        target: Target,
        /// New contents; the file is left empty when omitted
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Create a directory and any missing parents
    Mkdir {
        #[command(flatten)]
        target: Target,
    },
    /// Delete a file or directory
    Rm {
        #[command(flatten)]
        target: Target,
        /// Delete a directory and everything below it
        #[arg(short, long)]
        dir: bool,
        /// Move to the recycle bin instead of deleting
        #[arg(long)]
        trash: bool,
    },
    /// Copy a file
    Cp {
        source: String,
        dest: String,
        /// Fail if the destination exists
        #[arg(long)]
        no_overwrite: bool,
    },
    /// Move a file
    Mv {
        source: String,
        dest: String,
        /// Leave an existing destination alone
        #[arg(long)]
        no_overwrite: bool,
    },
    /// Increment the counter stored in a file, safely against other writers
    Bump {
        #[command(flatten)]
        target: Target,
    },
}

fn print_line(line: &str) {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{line}");
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let ctx = FsContext::from_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Path { target, dir } => path_command(&ctx, target, *dir, print_line).await,
        Commands::Exists { target, dir } => exists_command(&ctx, target, *dir, print_line).await,
        Commands::Ls { target, all } => list_command(&ctx, target, *all, print_line).await,
        Commands::Cat { target } => cat_command(&ctx, target, print_line).await,
        Commands::Write { target, content } => {
            write_command(&ctx, target, content.as_deref()).await
        }
        Commands::Mkdir { target } => mkdir_command(&ctx, target).await,
        Commands::Rm { target, dir, trash } => remove_command(&ctx, target, *dir, *trash).await,
        Commands::Cp {
            source,
            dest,
            no_overwrite,
        } => copy_command(&ctx, &Target::new(source), &Target::new(dest), !no_overwrite).await,
        Commands::Mv {
            source,
            dest,
            no_overwrite,
        } => {
            move_command(
                &ctx,
                &Target::new(source),
                &Target::new(dest),
                !no_overwrite,
                print_line,
            )
            .await
        }
        Commands::Bump { target } => bump_command(&ctx, target, print_line).await,
    }
}
