//! Command-line interface for abroad.
//!
//! This module provides the CLI structure for the `abroad` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::{Error, Result};
use crate::form::FormData;

pub use commands::{
    BrowseCommand, ConfigCommand, ExportCommand, FormInput, ImportCommand, InternshipFilterArgs,
    OutputFormat, StatusCommand, StudyFilterArgs, SubmitCommand, SuggestCommand,
};

/// abroad - Browse and collect study and internship abroad experiences
///
/// Loads a shared SQLite database of experience reports, lists them with
/// filters, and stores new or edited reports.
#[derive(Debug, Parser)]
#[command(name = "abroad")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Keep the database in memory instead of the configured file
    #[arg(long, global = true)]
    pub in_memory: bool,

    /// Load a snapshot or SQL script before running the command
    #[arg(long, global = true, value_name = "FILE")]
    pub load: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a SQLite snapshot or SQL script into the database
    Import(ImportCommand),

    /// Write the database to a snapshot file
    Export(ExportCommand),

    /// List stored experiences
    #[command(subcommand)]
    Browse(BrowseCommand),

    /// Submit an entry form
    #[command(subcommand)]
    Submit(SubmitCommand),

    /// Show the suggestion lists offered by the forms
    Suggest(SuggestCommand),

    /// Show database status
    Status(StatusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

impl FormInput {
    /// Collect the submitted fields: the form file first, then `name=value`
    /// arguments in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the form file cannot be read or parsed, or an
    /// argument has no `=`.
    pub async fn form_data(&self) -> Result<FormData> {
        let mut data = match &self.form_file {
            Some(path) => {
                let text = tokio::fs::read_to_string(path).await?;
                FormData::from_json(&text).map_err(|e| match e {
                    Error::FormInput { message } => {
                        Error::form_input(format!("{}: {message}", path.display()))
                    }
                    other => other,
                })?
            }
            None => FormData::new(),
        };
        for (name, value) in FormData::parse_pairs(&self.fields)?.iter() {
            data.set(name, value);
        }
        Ok(data)
    }
}
