//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// SQLite snapshot or SQL script to load
    pub file: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Destination file or directory (defaults to the working directory)
    pub target: Option<PathBuf>,
}

/// Listing commands.
#[derive(Debug, Subcommand)]
pub enum BrowseCommand {
    /// List study-abroad experiences grouped by country
    Study(StudyFilterArgs),

    /// List internship experiences
    Internships(InternshipFilterArgs),
}

/// Filters for the study listing.
#[derive(Debug, Args)]
pub struct StudyFilterArgs {
    /// Only show this continent (exact match)
    #[arg(long, default_value = "")]
    pub continent: String,

    /// Only show countries containing this text
    #[arg(long, default_value = "")]
    pub country: String,

    /// Only show universities containing this text
    #[arg(short, long, default_value = "")]
    pub university: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Filters for the internship listing.
#[derive(Debug, Args)]
pub struct InternshipFilterArgs {
    /// Only show countries containing this text
    #[arg(long, default_value = "")]
    pub country: String,

    /// Only show companies containing this text
    #[arg(long, default_value = "")]
    pub company: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Form submission commands.
#[derive(Debug, Subcommand)]
pub enum SubmitCommand {
    /// Add or edit a study-abroad experience
    Study {
        /// Edit the stored record with this id instead of adding one
        #[arg(short, long, value_name = "ID")]
        edit: Option<i64>,

        #[command(flatten)]
        input: FormInput,
    },

    /// Add an internship experience
    Internship {
        #[command(flatten)]
        input: FormInput,
    },
}

/// Where submitted field values come from.
#[derive(Debug, Args)]
pub struct FormInput {
    /// JSON object with the form fields
    #[arg(long, value_name = "FILE")]
    pub form_file: Option<PathBuf>,

    /// Field values as name=value, applied after the form file
    #[arg(value_name = "FIELD=VALUE")]
    pub fields: Vec<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Suggest command arguments.
#[derive(Debug, Args)]
pub struct SuggestCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// HTML markup for embedding in a page
    Html,
    /// JSON view model
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_output_format_debug() {
        let format = OutputFormat::Html;
        let debug_str = format!("{format:?}");
        assert_eq!(debug_str, "Html");
    }

    #[test]
    fn test_submit_command_debug() {
        let cmd = SubmitCommand::Study {
            edit: Some(3),
            input: FormInput {
                form_file: None,
                fields: vec!["city=Granada".to_string()],
                json: false,
            },
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("edit"));
        assert!(debug_str.contains("city=Granada"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
