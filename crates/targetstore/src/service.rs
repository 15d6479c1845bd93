//! Target service: validation in front of persistence.
//!
//! [`TargetService`] is what an outer layer (CLI, HTTP handler) talks to. It
//! owns an injected [`Validator`] and [`TargetRepository`], rejects bad input
//! before it reaches the store, and reports every outcome as exactly one of
//! success, [`Error::Validation`], [`Error::NotFound`], or a storage error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::TargetRepository;
use crate::target::{FieldMap, Target};
use crate::validation::{ValidationMode, ValidationReport, Validator};

/// Service health snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Always `"healthy"` when the store is readable.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// When the report was taken.
    pub timestamp: DateTime<Utc>,
    /// Number of stored records.
    pub total_targets: usize,
}

/// Validating front end to a target repository.
#[derive(Debug)]
pub struct TargetService<R> {
    validator: Validator,
    repository: R,
}

impl<R: TargetRepository> TargetService<R> {
    /// Compose a service from its collaborators.
    #[must_use]
    pub fn new(validator: Validator, repository: R) -> Self {
        Self {
            validator,
            repository,
        }
    }

    /// The validator in use.
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// The repository in use.
    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Check a field map without persisting anything.
    #[must_use]
    pub fn validate(&self, fields: &FieldMap, mode: ValidationMode) -> ValidationReport {
        self.validator.validate(fields, mode)
    }

    /// All records, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub fn list(&self) -> Result<Vec<Target>> {
        let targets = self.repository.list_all()?;
        debug!("Listing {} targets", targets.len());
        Ok(targets)
    }

    /// The record with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has that id, or a storage error.
    pub fn get(&self, id: &str) -> Result<Target> {
        debug!(id = %id, "Getting target");
        self.repository
            .get_by_id(id)?
            .ok_or_else(|| Error::not_found(id))
    }

    /// Validate a full record and persist it under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if any field is missing or invalid (the
    /// store is not touched), or a storage error.
    pub fn create(&self, fields: &FieldMap) -> Result<Target> {
        let new = match self.validator.parse_new(fields) {
            Ok(new) => new,
            Err(errors) => {
                warn!(%errors, "Rejected new target");
                return Err(errors.into());
            }
        };
        let target = self.repository.create(new)?;
        info!(id = %target.id, "Created target");
        Ok(target)
    }

    /// Validate a partial record and merge it into the record with the given id.
    ///
    /// An empty patch is valid and returns the record unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a supplied field is invalid,
    /// [`Error::NotFound`] if no record has that id, or a storage error.
    pub fn update(&self, id: &str, fields: &FieldMap) -> Result<Target> {
        let patch = match self.validator.parse_patch(fields) {
            Ok(patch) => patch,
            Err(errors) => {
                warn!(id = %id, %errors, "Rejected target update");
                return Err(errors.into());
            }
        };

        if patch.is_empty() {
            debug!(id = %id, "Empty update, returning record unchanged");
            return self.get(id);
        }

        let target = self
            .repository
            .update(id, &patch)?
            .ok_or_else(|| Error::not_found(id))?;
        info!(id = %id, "Updated target");
        Ok(target)
    }

    /// Remove the record with the given id, returning its prior values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has that id, or a storage error.
    pub fn delete(&self, id: &str) -> Result<Target> {
        let target = self
            .repository
            .delete(id)?
            .ok_or_else(|| Error::not_found(id))?;
        info!(id = %id, "Deleted target");
        Ok(target)
    }

    /// Report service health.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub fn health(&self) -> Result<HealthReport> {
        Ok(HealthReport {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            total_targets: self.repository.count()?,
        })
    }
}
