// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use clap::{Arg, ArgMatches, arg, value_parser};
use tick_core::Importance;

/// The output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Clone, Copy)]
pub struct ItemArgs;

impl ItemArgs {
    pub fn id() -> Arg {
        arg!(id: <ID> "The id of the item, or a unique prefix of it")
    }

    pub fn get_id(matches: &ArgMatches) -> String {
        matches.get_one::<String>("id").cloned().unwrap_or_default()
    }

    pub fn ids() -> Arg {
        arg!(ids: <ID> "The ids of the items, or unique prefixes of them").num_args(1..)
    }

    pub fn get_ids(matches: &ArgMatches) -> Vec<String> {
        matches
            .get_many::<String>("ids")
            .map(|ids| ids.cloned().collect())
            .unwrap_or_default()
    }

    pub fn text(positional: bool) -> Arg {
        if positional {
            arg!(text: <TEXT> "What needs to be done")
        } else {
            arg!(text: -t --text <TEXT> "What needs to be done")
        }
    }

    pub fn get_text(matches: &ArgMatches) -> Option<String> {
        matches.get_one::<String>("text").cloned()
    }

    pub fn importance() -> Arg {
        arg!(-i --importance <IMPORTANCE> "How important the item is")
            .value_parser(value_parser!(Importance))
    }

    pub fn get_importance(matches: &ArgMatches) -> Option<Importance> {
        matches.get_one("importance").copied()
    }

    pub fn deadline() -> Arg {
        arg!(-d --deadline <DEADLINE> "Deadline, in the format YYYY-MM-DD[ HH:MM], empty to clear")
    }

    pub fn get_deadline(matches: &ArgMatches) -> Option<String> {
        matches.get_one::<String>("deadline").cloned()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CommonArgs;

impl CommonArgs {
    pub fn output_format() -> Arg {
        arg!(--"output-format" <FORMAT> "Output format")
            .value_parser(value_parser!(OutputFormat))
            .default_value("table")
    }

    pub fn get_output_format(matches: &ArgMatches) -> OutputFormat {
        matches
            .get_one("output-format")
            .copied()
            .unwrap_or(OutputFormat::Table)
    }
}
