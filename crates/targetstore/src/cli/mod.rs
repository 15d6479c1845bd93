//! Command-line interface for targetstore.
//!
//! This module provides the CLI structure and output rendering for the
//! `targetctl` binary.

mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, CreateCommand, DeleteCommand, FieldArgs, GetCommand, ListCommand,
    OutputFormat, StatusCommand, UpdateCommand, ValidateCommand,
};

use crate::logging::Verbosity;

/// targetctl - Manage a flat-file store of tracked targets
///
/// Every write is validated first; rejected input never reaches the file.
#[derive(Debug, Parser)]
#[command(name = "targetctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the backing CSV file (overrides configuration)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the backing file if it does not exist
    Init,

    /// List all targets
    List(ListCommand),

    /// Show one target
    Get(GetCommand),

    /// Validate and store a new target
    Create(CreateCommand),

    /// Validate and apply changes to a target
    Update(UpdateCommand),

    /// Remove a target
    Delete(DeleteCommand),

    /// Check field values without storing anything
    Validate(ValidateCommand),

    /// Show store status
    Status(StatusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}
