// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command};
use colored::Colorize;
use tick_core::SyncEngine;

#[derive(Debug, Clone, Copy)]
pub struct CmdSync;

impl CmdSync {
    pub const NAME: &str = "sync";

    pub fn command() -> Command {
        Command::new(Self::NAME).about("Push the whole list to the server and adopt its answer")
    }

    pub fn from(_matches: &ArgMatches) -> Self {
        Self
    }

    pub async fn run(self, engine: &SyncEngine) -> Result<(), Box<dyn Error>> {
        tracing::debug!("reconciling with the server...");
        if !engine.sync_now().await {
            return Err("Could not sync with the server, changes are kept locally".into());
        }

        println!(
            "{} {} items at revision {}",
            "Synced".green(),
            engine.items().await.len(),
            engine.revision().await
        );
        Ok(())
    }
}
