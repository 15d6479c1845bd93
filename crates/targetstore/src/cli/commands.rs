//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use serde_json::Value;

use crate::error::Result;
use crate::target::{Field, FieldMap};

/// Record fields supplied on the command line.
///
/// Each flag takes the raw text and hands it to the validator unchanged, so
/// `--latitude abc` is reported as a validation failure rather than a usage
/// error. Flags win over keys of the same name in `--json`.
#[derive(Debug, Default, Args)]
pub struct FieldArgs {
    /// Latitude in degrees, -90 to 90
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<String>,

    /// Longitude in degrees, -180 to 180
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<String>,

    /// Altitude, any number
    #[arg(long, allow_hyphen_values = true)]
    pub altitude: Option<String>,

    /// Frequency (433, 915, 2.4, 5.2 or 5.8 by default)
    #[arg(long, allow_hyphen_values = true)]
    pub frequency: Option<String>,

    /// Speed, zero or more
    #[arg(long, allow_hyphen_values = true)]
    pub speed: Option<String>,

    /// Bearing in degrees, 0 to 360
    #[arg(long, allow_hyphen_values = true)]
    pub bearing: Option<String>,

    /// Dotted-quad IPv4 address
    #[arg(long)]
    pub ip_address: Option<String>,

    /// Fields as a JSON object, or `-` to read it from stdin
    #[arg(long, value_name = "JSON")]
    pub json: Option<String>,
}

impl FieldArgs {
    fn flag(&self, field: Field) -> Option<&String> {
        match field {
            Field::Latitude => self.latitude.as_ref(),
            Field::Longitude => self.longitude.as_ref(),
            Field::Altitude => self.altitude.as_ref(),
            Field::Frequency => self.frequency.as_ref(),
            Field::Speed => self.speed.as_ref(),
            Field::Bearing => self.bearing.as_ref(),
            Field::IpAddress => self.ip_address.as_ref(),
        }
    }

    /// Merge `--json` and the field flags into one field map.
    ///
    /// `stdin` is only read when `--json -` was given.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin cannot be read or the JSON is not an object.
    pub fn to_field_map(&self, stdin: &mut dyn Read) -> Result<FieldMap> {
        let mut fields = match self.json.as_deref() {
            None => FieldMap::new(),
            Some("-") => {
                let mut text = String::new();
                stdin.read_to_string(&mut text)?;
                serde_json::from_str(&text)?
            }
            Some(text) => serde_json::from_str(text)?,
        };

        for field in Field::ALL {
            if let Some(raw) = self.flag(field) {
                fields.insert(field.name().to_string(), Value::String(raw.clone()));
            }
        }
        Ok(fields)
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Get command arguments.
#[derive(Debug, Args)]
pub struct GetCommand {
    /// Id of the target
    pub id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Create command arguments.
#[derive(Debug, Args)]
pub struct CreateCommand {
    /// Field values for the new target
    #[command(flatten)]
    pub fields: FieldArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Update command arguments.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Id of the target
    pub id: String,

    /// Field values to change; omitted fields keep their values
    #[command(flatten)]
    pub fields: FieldArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the target
    pub id: String,
}

/// Validate command arguments.
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Only check the fields that are present
    #[arg(short, long)]
    pub partial: bool,

    /// Field values to check
    #[command(flatten)]
    pub fields: FieldArgs,
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

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
