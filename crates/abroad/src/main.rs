//! `abroad` - CLI for the experience database
//!
//! This binary loads, browses and extends a database of study- and
//! internship-abroad experience reports.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;

use abroad::cli::{
    BrowseCommand, Cli, Command, ConfigCommand, FormInput, OutputFormat, SubmitCommand,
};
use abroad::form::{InternshipForm, StudyForm};
use abroad::query::{InternshipFilter, StudyFilter};
use abroad::render::html::Html;
use abroad::render::plain::Plain;
use abroad::session::SubmitOutcome;
use abroad::{init_logging, Config, Session};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config =
        Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    if cli.in_memory {
        config.storage.in_memory = true;
    }

    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(&config, config_cmd),
        command => command,
    };

    let mut session = Session::start(config)
        .await
        .context("failed to open the experience database")?;

    if let Some(path) = &cli.load {
        let status = session.load_file(path).await?;
        eprintln!("{}", status.status_line());
    }

    // Execute the command
    match command {
        Command::Import(import_cmd) => {
            handle_import(&mut session, &import_cmd.file, import_cmd.json).await
        }
        Command::Export(export_cmd) => {
            let destination = session
                .export(export_cmd.target.as_deref())
                .context("export failed")?;
            println!("Exported to {}", destination.display());
            Ok(())
        }
        Command::Browse(browse_cmd) => handle_browse(&mut session, browse_cmd),
        Command::Submit(submit_cmd) => handle_submit(&mut session, submit_cmd).await,
        Command::Suggest(suggest_cmd) => handle_suggest(&session, suggest_cmd.json),
        Command::Status(status_cmd) => handle_status(&session, status_cmd.json),
        // handled before the session opens
        Command::Config(_) => Ok(()),
    }
}

async fn handle_import(session: &mut Session, file: &Path, json: bool) -> anyhow::Result<()> {
    let status = session.load_file(file).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{}", status.status_line());
    }
    if !status.is_loaded() {
        bail!("could not import {}", file.display());
    }
    Ok(())
}

fn handle_browse(session: &mut Session, cmd: BrowseCommand) -> anyhow::Result<()> {
    match cmd {
        BrowseCommand::Study(args) => {
            let filter = StudyFilter::new(&args.continent, &args.country, &args.university);
            let listing = session.browse_study(&filter);
            match args.format {
                OutputFormat::Plain => print!("{}", Plain(&listing)),
                OutputFormat::Html => print!("{}", Html(&listing)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
            }
        }
        BrowseCommand::Internships(args) => {
            let filter = InternshipFilter::new(&args.country, &args.company);
            let listing = session.browse_internships(&filter);
            match args.format {
                OutputFormat::Plain => print!("{}", Plain(&listing)),
                OutputFormat::Html => print!("{}", Html(&listing)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
            }
        }
    }
    Ok(())
}

async fn handle_submit(session: &mut Session, cmd: SubmitCommand) -> anyhow::Result<()> {
    let (outcome, json) = match cmd {
        SubmitCommand::Study { edit, input } => {
            let data = read_form(&input).await?;
            let form = match edit {
                Some(id) => {
                    let mut draft = session
                        .begin_edit(id)
                        .with_context(|| format!("cannot edit study record {id}"))?
                        .clone();
                    draft.apply(&data)?;
                    draft
                }
                None => StudyForm::from_form_data(&data)?,
            };
            (session.submit_study(form)?, input.json)
        }
        SubmitCommand::Internship { input } => {
            let data = read_form(&input).await?;
            let form = InternshipForm::from_form_data(&data);
            (session.submit_internship(&form)?, input.json)
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    match outcome {
        SubmitOutcome::Saved(receipt) => {
            if !json {
                println!("{} (id {})", receipt.message, receipt.id);
            }
            Ok(())
        }
        SubmitOutcome::Rejected(failure) => bail!("{failure}"),
    }
}

async fn read_form(input: &FormInput) -> anyhow::Result<abroad::form::FormData> {
    let data = input.form_data().await.context("invalid form input")?;
    if data.is_empty() {
        bail!("no form fields given; pass FIELD=VALUE arguments or --form-file");
    }
    Ok(data)
}

fn handle_suggest(session: &Session, json: bool) -> anyhow::Result<()> {
    let suggestions = session.suggestions();
    if json {
        println!("{}", serde_json::to_string_pretty(suggestions)?);
        return Ok(());
    }

    let lists = [
        ("Continents", &suggestions.continents),
        ("Study cities", &suggestions.study_cities),
        ("Universities", &suggestions.universities),
        ("Internship cities", &suggestions.internship_cities),
        ("Companies", &suggestions.companies),
    ];
    for (label, values) in lists {
        println!("{label}:");
        for value in values {
            println!("  {value}");
        }
    }
    Ok(())
}

fn handle_status(session: &Session, json: bool) -> anyhow::Result<()> {
    let stats = session.stats().ok();
    let location = match session.storage() {
        Some(storage) if storage.is_in_memory() => "in memory".to_string(),
        Some(storage) => storage.path().display().to_string(),
        None => "none".to_string(),
    };

    if json {
        let status = serde_json::json!({
            "database_name": session.database_name(),
            "location": location,
            "status": session.status(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("abroad status");
        println!("-------------");
        println!("Database:      {}", session.database_name());
        println!("Location:      {location}");
        if let Some(status) = session.status() {
            println!("Last load:     {status}");
        }
        match stats {
            Some(stats) => {
                println!("Study:         {}", stats.study_records);
                println!("Internships:   {}", stats.internship_records);
                println!("Size (bytes):  {}", stats.db_size_bytes);
            }
            None => println!("Records:       unavailable"),
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:       {}", config.database_path().display());
                println!("  In memory:           {}", config.storage.in_memory);
                println!(
                    "  Snapshot extensions: {}",
                    config.storage.snapshot_extensions.join(", ")
                );
                println!("  Export file name:    {}", config.storage.export_file_name);
                println!();
                println!("[Form]");
                println!("  Redirect delay (ms): {}", config.form.redirect_delay_ms);
                println!("  Status display (ms): {}", config.form.status_display_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
