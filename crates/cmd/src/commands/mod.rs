// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod bump;
pub mod cat;
pub mod copy;
pub mod list;
pub mod mkdir;
pub mod path;
pub mod remove;
pub mod write;

pub use bump::bump_command;
pub use cat::cat_command;
pub use copy::{copy_command, move_command};
pub use list::list_command;
pub use mkdir::mkdir_command;
pub use path::{exists_command, path_command};
pub use remove::remove_command;
pub use write::write_command;
