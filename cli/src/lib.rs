// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line front end for tick.

mod arg;
mod cli;
mod cmd_generate_completion;
mod cmd_item;
mod cmd_sync;
mod config;
mod item_formatter;
mod table;
mod util;

pub use crate::cli::{Cli, Commands, run};
pub use crate::config::{Config, parse_config};
