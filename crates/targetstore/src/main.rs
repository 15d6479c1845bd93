//! `targetctl` - CLI for targetstore
//!
//! This binary validates and stores target records in a CSV file.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use targetstore::cli::output::{render_target, render_targets, render_validation_errors};
use targetstore::cli::{Cli, Command, ConfigCommand, FieldArgs};
use targetstore::{
    init_logging, Config, CsvStore, Error, FieldMap, TargetRepository, TargetService,
    ValidationMode,
};

type Service = TargetService<CsvStore>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    let data_path = cli.data.clone().unwrap_or_else(|| config.data_path());
    let service = TargetService::new(config.validator(), CsvStore::new(&data_path));

    match cli.command {
        Command::Init => {
            service
                .repository()
                .initialize()
                .with_context(|| format!("failed to initialize {}", data_path.display()))?;
            println!("Initialized {}", data_path.display());
        }
        Command::List(cmd) => {
            let targets = service.list()?;
            print!("{}", render_targets(&targets, cmd.format)?);
        }
        Command::Get(cmd) => {
            return report(service.get(&cmd.id), |target| {
                Ok(render_target(&target, cmd.format)?)
            });
        }
        Command::Create(cmd) => {
            let fields = read_fields(&cmd.fields)?;
            return report(service.create(&fields), |target| {
                Ok(render_target(&target, cmd.format)?)
            });
        }
        Command::Update(cmd) => {
            let fields = read_fields(&cmd.fields)?;
            return report(service.update(&cmd.id, &fields), |target| {
                Ok(render_target(&target, cmd.format)?)
            });
        }
        Command::Delete(cmd) => {
            return report(service.delete(&cmd.id), |target| {
                Ok(format!("Deleted {}\n", target.id))
            });
        }
        Command::Validate(cmd) => {
            let fields = read_fields(&cmd.fields)?;
            let mode = if cmd.partial {
                ValidationMode::Partial
            } else {
                ValidationMode::Full
            };
            let report = service.validate(&fields, mode);
            if report.is_ok() {
                println!("Valid.");
            } else {
                eprintln!("Invalid:");
                eprint!("{}", render_validation_errors(report.errors()));
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Status(cmd) => handle_status(&service, cmd.json)?,
        Command::Config(cmd) => return handle_config(&config, cmd),
    }
    Ok(ExitCode::SUCCESS)
}

fn read_fields(args: &FieldArgs) -> anyhow::Result<FieldMap> {
    args.to_field_map(&mut std::io::stdin().lock())
        .context("failed to read field values")
}

/// Print a successful result, or explain a validation or not-found failure.
///
/// Storage and other errors propagate.
fn report<T>(
    result: targetstore::Result<T>,
    render: impl FnOnce(T) -> anyhow::Result<String>,
) -> anyhow::Result<ExitCode> {
    match result {
        Ok(value) => {
            print!("{}", render(value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::Validation(errors)) => {
            eprintln!("Validation failed:");
            eprint!("{}", render_validation_errors(&errors));
            Ok(ExitCode::FAILURE)
        }
        Err(Error::NotFound { id }) => {
            eprintln!("Target not found: {id}");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

fn handle_status(service: &Service, json: bool) -> anyhow::Result<()> {
    let health = service.health()?;
    let stats = service.repository().stats()?;
    let path = service.repository().path();

    if json {
        let status = serde_json::json!({
            "health": health,
            "data_path": path,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("targetctl status");
        println!("----------------");
        println!("Status:        {}", health.status);
        println!("Version:       {}", health.version);
        println!("Data file:     {}", path.display());
        println!("Targets:       {}", stats.total_targets);
        println!("File size:     {} bytes", stats.file_size_bytes);
        match stats.modified {
            Some(modified) => println!("Last modified: {}", modified.to_rfc3339()),
            None => println!("Last modified: never"),
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data path:          {}", config.data_path().display());
                println!();
                println!("[Validation]");
                println!(
                    "  Frequency policy:   {}",
                    config.validation.frequency_policy
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            if let Err(e) = Config::load_from(Some(path)) {
                eprintln!("Configuration error: {e}");
                return Ok(ExitCode::FAILURE);
            }
            println!("Configuration is valid.");
        }
    }
    Ok(ExitCode::SUCCESS)
}
