//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Extract translatable messages from C++ sources
//! - `init`: Initialize trscan configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.common.verbose,
            Some(Command::Init(_)) | None => false,
        }
    }
}

/// Common arguments shared by all commands that read sources.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Source code root directory, also where the config file search starts
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Additional include search path (repeatable, searched after the config's)
    #[arg(short = 'I', long = "include-path", value_name = "DIR")]
    pub include_path: Vec<PathBuf>,

    /// Regex of include paths not to follow (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Respell localization calls, e.g. `tr+=i18n` or `translate=myTranslate`
    #[arg(long, value_name = "SPEC")]
    pub tr_function_alias: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per message, diagnostics on stderr
    #[default]
    Text,
    /// JSON array of messages on stdout
    Json,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct InitCommand {
    /// Directory to create the config in, defaults to the current one
    #[arg(long)]
    pub source_root: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable messages and their contexts
    Extract(ExtractCommand),
    /// Initialize a new .trscanrc.json configuration file
    Init(InitCommand),
}
