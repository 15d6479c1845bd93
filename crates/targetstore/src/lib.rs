//! `targetstore` - Validated CRUD over a flat-file collection of targets
//!
//! A target is a tracked emitter: position, motion, radio frequency, and an
//! IPv4 address. This library validates raw field maps, persists accepted
//! records to a CSV file, and exposes both through [`TargetService`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod storage;
pub mod target;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use service::{HealthReport, TargetService};
pub use storage::{CsvStore, MemoryStore, StoreStats, TargetRepository};
pub use target::{Field, FieldMap, NewTarget, Target, TargetPatch};
pub use validation::{
    FrequencyPolicy, ValidationErrors, ValidationMode, ValidationReport, Validator,
};
