// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf};

use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use futures::{FutureExt, future::BoxFuture};
use tick_core::{APP_NAME, SyncEngine};
use tracing_subscriber::EnvFilter;

use crate::arg::OutputFormat;
use crate::cmd_generate_completion::CmdGenerateCompletion;
use crate::cmd_item::{CmdAdd, CmdDelete, CmdDone, CmdEdit, CmdList, CmdUndo};
use crate::cmd_sync::CmdSync;
use crate::config::parse_config;

/// Run the tick command-line interface.
pub async fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();
    match Cli::parse() {
        Ok(cli) => {
            if let Err(e) = cli.run().await {
                eprintln!("{} {}", "Error:".red(), e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            std::process::exit(2);
        }
    }
    Ok(())
}

/// Logs go to stderr, filtered by `RUST_LOG`, warnings only by default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("An offline-first to-do list that keeps in step with its server.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(false) // defaults to list
            .arg_required_else_help(false)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $TICK_CONFIG, then $XDG_CONFIG_HOME/tick/config.toml on \
Linux and MacOS, %APPDATA%/tick/config.toml on Windows.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .subcommand(CmdList::command())
            .subcommand(CmdAdd::command())
            .subcommand(CmdEdit::command())
            .subcommand(CmdDone::command())
            .subcommand(CmdUndo::command())
            .subcommand(CmdDelete::command())
            .subcommand(CmdSync::command())
            .subcommand(CmdGenerateCompletion::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(&matches)
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(&matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        use Commands::{Add, Delete, Done, Edit, GenerateCompletion, List, Sync, Undo};
        let command = match matches.subcommand() {
            Some((CmdList::NAME, matches)) => List(CmdList::from(matches)),
            Some((CmdAdd::NAME, matches)) => Add(CmdAdd::from(matches)),
            Some((CmdEdit::NAME, matches)) => Edit(CmdEdit::from(matches)),
            Some((CmdDone::NAME, matches)) => Done(CmdDone::from(matches)),
            Some((CmdUndo::NAME, matches)) => Undo(CmdUndo::from(matches)),
            Some((CmdDelete::NAME, matches)) => Delete(CmdDelete::from(matches)),
            Some((CmdSync::NAME, matches)) => Sync(CmdSync::from(matches)),
            Some((CmdGenerateCompletion::NAME, matches)) => {
                GenerateCompletion(CmdGenerateCompletion::from(matches)?)
            }
            None => List(CmdList {
                output_format: OutputFormat::Table,
            }),
            Some((name, _)) => return Err(format!("Unknown command: {name}").into()),
        };

        let config = matches.get_one("config").cloned();
        Ok(Cli { config, command })
    }

    /// Run the command
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config).await
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// List items
    List(CmdList),

    /// Add a new item
    Add(CmdAdd),

    /// Edit an item
    Edit(CmdEdit),

    /// Mark items as done
    Done(CmdDone),

    /// Mark items as not done
    Undo(CmdUndo),

    /// Delete items
    Delete(CmdDelete),

    /// Reconcile with the server now
    Sync(CmdSync),

    /// Generate shell completion
    GenerateCompletion(CmdGenerateCompletion),
}

impl Commands {
    /// Run the command with the given configuration
    #[rustfmt::skip]
    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        use Commands::{Add, Delete, Done, Edit, GenerateCompletion, List, Sync, Undo};
        match self {
            List(a)   => Self::run_with(config, |x| a.run(x).boxed()).await,
            Add(a)    => Self::run_with(config, |x| a.run(x).boxed()).await,
            Edit(a)   => Self::run_with(config, |x| a.run(x).boxed()).await,
            Done(a)   => Self::run_with(config, |x| a.run(x).boxed()).await,
            Undo(a)   => Self::run_with(config, |x| a.run(x).boxed()).await,
            Delete(a) => Self::run_with(config, |x| a.run(x).boxed()).await,
            Sync(a)   => Self::run_with(config, |x| a.run(x).boxed()).await,
            GenerateCompletion(a) => a.run(),
        }
    }

    /// Loads the engine, runs `f` on it, then lets a pending catch-up finish.
    async fn run_with<F>(config: Option<PathBuf>, f: F) -> Result<(), Box<dyn Error>>
    where
        F: for<'a> FnOnce(&'a SyncEngine) -> BoxFuture<'a, Result<(), Box<dyn Error>>>,
    {
        tracing::debug!("parsing configuration...");
        let config = parse_config(config).await?;
        let online = config.remote.is_some();
        let engine = SyncEngine::open(config.core, config.remote)?;
        engine.load_all().await?;

        let result = f(&engine).await;

        engine.wait_idle().await;
        if online && engine.is_dirty().await {
            eprintln!(
                "{} not in sync with the server, changes are saved locally",
                "Warning:".yellow()
            );
        }
        result
    }
}
