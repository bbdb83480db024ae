// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, fs, io, path::PathBuf};

use clap::{ArgMatches, Command, ValueEnum, ValueHint, arg, value_parser};
use clap_complete::{Generator, generate};

use crate::Cli;

/// Prints a completion script for `tick`, or writes it to a file.
#[derive(Debug, Clone)]
pub struct CmdGenerateCompletion {
    pub shell: Shell,
    pub output: Option<PathBuf>,
}

impl CmdGenerateCompletion {
    pub const NAME: &str = "generate-completion";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Generate a shell completion script for tick")
            .hide(true)
            .arg(arg!(shell: <SHELL> "Target shell").value_parser(value_parser!(Shell)))
            .arg(
                arg!(-o --output <FILE> "Write the script to FILE instead of stdout")
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let shell = matches
            .get_one::<Shell>("shell")
            .copied()
            .ok_or("Missing shell")?;
        let output = matches.get_one::<PathBuf>("output").cloned();
        Ok(Self { shell, output })
    }

    pub fn run(self) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "generating shell completion...");
        match &self.output {
            Some(path) => {
                let mut file = fs::File::create(path)?;
                self.shell.write_script(&mut file);
                tracing::info!(path = %path.display(), "completion script written");
            }
            None => self.shell.write_script(&mut io::stdout().lock()),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Elvish,
    Fish,
    Nushell,
    #[clap(name = "powershell")]
    #[allow(clippy::enum_variant_names)]
    PowerShell,
    Zsh,
}

impl Shell {
    fn write_script(self, buf: &mut impl io::Write) {
        use clap_complete::Shell as ClapShell;
        match self {
            Shell::Bash => emit(ClapShell::Bash, buf),
            Shell::Elvish => emit(ClapShell::Elvish, buf),
            Shell::Fish => emit(ClapShell::Fish, buf),
            Shell::Nushell => emit(clap_complete_nushell::Nushell {}, buf),
            Shell::PowerShell => emit(ClapShell::PowerShell, buf),
            Shell::Zsh => emit(ClapShell::Zsh, buf),
        }
    }
}

fn emit(generator: impl Generator, buf: &mut impl io::Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(generator, &mut cmd, name, buf);
}
