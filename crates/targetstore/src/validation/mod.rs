//! Field validation for target records.
//!
//! This module decides whether a candidate set of field values is acceptable:
//!
//! - **Full mode**: every field is required (record creation).
//! - **Partial mode**: only supplied fields are checked (partial update).
//!
//! Every field is checked independently, and all failures are reported
//! together as a map of field name to reason.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use targetstore::validation::{ValidationMode, Validator};
//! use targetstore::Field;
//!
//! let validator = Validator::default();
//! let fields = json!({"speed": -10}).as_object().cloned().unwrap_or_default();
//!
//! let report = validator.validate(&fields, ValidationMode::Partial);
//! assert!(!report.is_ok());
//! assert!(report.errors().contains(Field::Speed));
//! ```

mod rules;
mod validator;

pub use rules::{
    parse_number, Bound, FrequencyPolicy, Ipv4Rule, ALLOWED_FREQUENCIES, INVALID_IPV4,
    INVALID_NUMBER, IPV4_PATTERN, NOT_POSITIVE, REQUIRED,
};
pub use validator::{ValidationErrors, ValidationMode, ValidationReport, Validator};
