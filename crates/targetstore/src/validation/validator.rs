//! Record validator.
//!
//! Checks a raw [`FieldMap`] against the field rules, either as a full record
//! or as a partial update, and reports every failing field at once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use super::rules::{
    parse_number, Bound, FrequencyPolicy, Ipv4Rule, INVALID_IPV4, INVALID_NUMBER, REQUIRED,
};
use crate::target::{Field, FieldMap, NewTarget, TargetPatch};

/// Whether absent fields are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Every field is required (record creation).
    #[default]
    Full,
    /// Absent fields are skipped (partial update).
    Partial,
}

/// Per-field validation messages, keyed in canonical field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for a field, replacing any earlier message.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// The message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Check if a field failed.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over failures in canonical field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// The failing fields, in canonical order.
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        self.0.keys().copied().collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// The outcome of validating a field map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    ok: bool,
    errors: ValidationErrors,
}

impl ValidationReport {
    fn from_errors(errors: ValidationErrors) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
        }
    }

    /// True iff no field failed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// The per-field failures.
    #[must_use]
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

}

/// A checked field value.
enum Checked {
    Number(f64),
    Text(String),
}

/// Validator for target field maps.
///
/// Construct once and share; checking is pure and never mutates state.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    frequency_policy: FrequencyPolicy,
    ipv4: Ipv4Rule,
}

impl Validator {
    /// Create a validator with the given frequency policy.
    #[must_use]
    pub fn new(frequency_policy: FrequencyPolicy) -> Self {
        Self {
            frequency_policy,
            ipv4: Ipv4Rule::new(),
        }
    }

    /// The frequency policy in effect.
    #[must_use]
    pub fn frequency_policy(&self) -> FrequencyPolicy {
        self.frequency_policy
    }

    /// Validate a field map, reporting every failing field.
    #[must_use]
    pub fn validate(&self, fields: &FieldMap, mode: ValidationMode) -> ValidationReport {
        let (_, errors) = self.check_all(fields, mode);
        ValidationReport::from_errors(errors)
    }

    /// Validate a full record and convert it to a typed [`NewTarget`].
    ///
    /// # Errors
    ///
    /// Returns the per-field failures if any field is missing or invalid.
    pub fn parse_new(&self, fields: &FieldMap) -> Result<NewTarget, ValidationErrors> {
        let (patch, errors) = self.check_all(fields, ValidationMode::Full);
        if !errors.is_empty() {
            return Err(errors);
        }
        complete(&patch)
    }

    /// Validate a partial record and convert it to a typed [`TargetPatch`].
    ///
    /// # Errors
    ///
    /// Returns the per-field failures if any supplied field is invalid.
    pub fn parse_patch(&self, fields: &FieldMap) -> Result<TargetPatch, ValidationErrors> {
        let (patch, errors) = self.check_all(fields, ValidationMode::Partial);
        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }

    fn check_all(&self, fields: &FieldMap, mode: ValidationMode) -> (TargetPatch, ValidationErrors) {
        let mut patch = TargetPatch::default();
        let mut errors = ValidationErrors::new();

        for field in Field::ALL {
            match fields.get(field.name()) {
                None if mode == ValidationMode::Full => errors.insert(field, REQUIRED),
                None => {}
                Some(value) => match self.check_field(field, value) {
                    Ok(checked) => set(&mut patch, field, checked),
                    Err(message) => {
                        debug!(field = %field, reason = %message, "Field rejected");
                        errors.insert(field, message);
                    }
                },
            }
        }

        trace!(?mode, failed = errors.len(), "Validated field map");
        (patch, errors)
    }

    fn check_field(&self, field: Field, value: &Value) -> Result<Checked, String> {
        if field == Field::IpAddress {
            return match value {
                Value::String(text) if self.ipv4.matches(text) => Ok(Checked::Text(text.clone())),
                _ => Err(INVALID_IPV4.to_string()),
            };
        }

        let number = parse_number(value).ok_or_else(|| INVALID_NUMBER.to_string())?;
        Bound::for_field(field, self.frequency_policy).check(number)?;
        Ok(Checked::Number(number))
    }
}

fn set(patch: &mut TargetPatch, field: Field, checked: Checked) {
    match (field, checked) {
        (Field::IpAddress, Checked::Text(text)) => patch.ip_address = Some(text),
        (Field::Latitude, Checked::Number(n)) => patch.latitude = Some(n),
        (Field::Longitude, Checked::Number(n)) => patch.longitude = Some(n),
        (Field::Altitude, Checked::Number(n)) => patch.altitude = Some(n),
        (Field::Frequency, Checked::Number(n)) => patch.frequency = Some(n),
        (Field::Speed, Checked::Number(n)) => patch.speed = Some(n),
        (Field::Bearing, Checked::Number(n)) => patch.bearing = Some(n),
        _ => {}
    }
}

/// Turn a patch with every field set into a new record.
///
/// Only called after a clean full-mode check, so every field is present.
fn complete(patch: &TargetPatch) -> Result<NewTarget, ValidationErrors> {
    let TargetPatch {
        latitude: Some(latitude),
        longitude: Some(longitude),
        altitude: Some(altitude),
        frequency: Some(frequency),
        speed: Some(speed),
        bearing: Some(bearing),
        ip_address: Some(ip_address),
    } = patch
    else {
        let mut missing = ValidationErrors::new();
        for field in Field::ALL.into_iter().filter(|f| !patch.fields().contains(f)) {
            missing.insert(field, REQUIRED);
        }
        return Err(missing);
    };

    Ok(NewTarget {
        latitude: *latitude,
        longitude: *longitude,
        altitude: *altitude,
        frequency: *frequency,
        speed: *speed,
        bearing: *bearing,
        ip_address: ip_address.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_fields() -> FieldMap {
        let value = json!({
            "latitude": 32.0853,
            "longitude": 34.7818,
            "altitude": 150.5,
            "frequency": 2.4,
            "speed": 25.0,
            "bearing": 180.0,
            "ip_address": "192.168.1.1"
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn with(field: &str, value: Value) -> FieldMap {
        let mut fields = sample_fields();
        fields.insert(field.to_string(), value);
        fields
    }

    fn validator() -> Validator {
        Validator::default()
    }

    #[test]
    fn test_valid_target() {
        let report = validator().validate(&sample_fields(), ValidationMode::Full);
        assert!(report.is_ok());
        assert!(report.errors().is_empty());
    }

    #[test]
    fn test_missing_required_fields() {
        let report = validator().validate(&FieldMap::new(), ValidationMode::Full);
        assert!(!report.is_ok());
        assert_eq!(report.errors().len(), 7);
        for field in Field::ALL {
            assert_eq!(report.errors().get(field), Some(REQUIRED));
        }
    }

    #[test]
    fn test_partial_update_allows_missing_fields() {
        let mut fields = FieldMap::new();
        fields.insert("speed".to_string(), json!(30));
        let report = validator().validate(&fields, ValidationMode::Partial);
        assert!(report.is_ok());
    }

    #[test]
    fn test_empty_partial_is_ok() {
        let report = validator().validate(&FieldMap::new(), ValidationMode::Partial);
        assert!(report.is_ok());
    }

    #[test]
    fn test_single_out_of_domain_field_is_the_only_error() {
        let cases = [
            (Field::Latitude, json!(100)),
            (Field::Latitude, json!(-100)),
            (Field::Longitude, json!(200)),
            (Field::Frequency, json!(999)),
            (Field::Speed, json!(-10)),
            (Field::Bearing, json!(400)),
            (Field::Bearing, json!(-10)),
            (Field::IpAddress, json!("999.1.1.1")),
        ];

        for (field, value) in cases {
            let report =
                validator().validate(&with(field.name(), value.clone()), ValidationMode::Full);
            assert!(!report.is_ok(), "{field}={value} should fail");
            assert_eq!(report.errors().fields(), vec![field], "{field}={value}");
        }
    }

    #[test]
    fn test_all_fields_checked_without_short_circuit() {
        let mut fields = sample_fields();
        fields.insert("latitude".to_string(), json!("north"));
        fields.insert("bearing".to_string(), json!(720));
        fields.insert("ip_address".to_string(), json!("localhost"));

        let report = validator().validate(&fields, ValidationMode::Full);
        assert_eq!(
            report.errors().fields(),
            vec![Field::Latitude, Field::Bearing, Field::IpAddress]
        );
        assert_eq!(report.errors().get(Field::Latitude), Some(INVALID_NUMBER));
        assert_eq!(
            report.errors().get(Field::Bearing),
            Some("Must be between 0 and 360")
        );
        assert_eq!(report.errors().get(Field::IpAddress), Some(INVALID_IPV4));
    }

    #[test]
    fn test_hostile_values_become_field_errors() {
        for value in [json!(null), json!(true), json!([]), json!({}), json!("")] {
            let report = validator().validate(&with("altitude", value), ValidationMode::Full);
            assert_eq!(report.errors().get(Field::Altitude), Some(INVALID_NUMBER));
        }

        let report = validator().validate(&with("ip_address", json!(19216811)), ValidationMode::Full);
        assert_eq!(report.errors().get(Field::IpAddress), Some(INVALID_IPV4));
    }

    #[test]
    fn test_null_in_partial_mode_is_an_error() {
        let mut fields = FieldMap::new();
        fields.insert("speed".to_string(), Value::Null);
        let report = validator().validate(&fields, ValidationMode::Partial);
        assert_eq!(report.errors().get(Field::Speed), Some(INVALID_NUMBER));
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let report = validator().validate(&with("latitude", json!("45.0")), ValidationMode::Full);
        assert!(report.is_ok());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut fields = sample_fields();
        fields.insert("id".to_string(), json!("spoofed"));
        fields.insert("color".to_string(), json!("red"));
        assert!(validator().validate(&fields, ValidationMode::Full).is_ok());
    }

    #[test]
    fn test_valid_frequencies() {
        for freq in [433.0, 915.0, 2.4, 5.2, 5.8] {
            let report = validator().validate(&with("frequency", json!(freq)), ValidationMode::Full);
            assert!(report.is_ok(), "frequency {freq} should be valid");
        }
    }

    #[test]
    fn test_any_positive_frequency_policy() {
        let validator = Validator::new(FrequencyPolicy::AnyPositive);
        assert_eq!(validator.frequency_policy(), FrequencyPolicy::AnyPositive);
        assert!(validator
            .validate(&with("frequency", json!(999)), ValidationMode::Full)
            .is_ok());

        let report = validator.validate(&with("frequency", json!(-1)), ValidationMode::Full);
        assert_eq!(
            report.errors().get(Field::Frequency),
            Some("Must be a positive number")
        );
    }

    #[test]
    fn test_parse_new() {
        let new = validator().parse_new(&sample_fields()).unwrap();
        assert_eq!(new.latitude, 32.0853);
        assert_eq!(new.frequency, 2.4);
        assert_eq!(new.ip_address, "192.168.1.1");
    }

    #[test]
    fn test_parse_new_from_strings() {
        let new = validator()
            .parse_new(&with("speed", json!(" 12.5 ")))
            .unwrap();
        assert_eq!(new.speed, 12.5);
    }

    #[test]
    fn test_parse_new_rejects_incomplete() {
        let mut fields = sample_fields();
        fields.remove("bearing");
        let errors = validator().parse_new(&fields).unwrap_err();
        assert_eq!(errors.fields(), vec![Field::Bearing]);
    }

    #[test]
    fn test_complete_requires_every_field() {
        let patch = TargetPatch {
            speed: Some(1.0),
            ip_address: Some("10.0.0.1".to_string()),
            ..TargetPatch::default()
        };
        let errors = complete(&patch).unwrap_err();
        assert_eq!(
            errors.fields(),
            vec![
                Field::Latitude,
                Field::Longitude,
                Field::Altitude,
                Field::Frequency,
                Field::Bearing
            ]
        );

        let full = validator()
            .parse_patch(&sample_fields())
            .unwrap();
        let new = complete(&full).unwrap();
        assert_eq!(new.ip_address, "192.168.1.1");
        assert_eq!(new.bearing, 180.0);
    }

    #[test]
    fn test_parse_patch() {
        let mut fields = FieldMap::new();
        fields.insert("speed".to_string(), json!(50));
        fields.insert("ip_address".to_string(), json!("10.0.0.1"));

        let patch = validator().parse_patch(&fields).unwrap();
        assert_eq!(patch.speed, Some(50.0));
        assert_eq!(patch.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(patch.fields(), vec![Field::Speed, Field::IpAddress]);
    }

    #[test]
    fn test_parse_patch_rejects_invalid() {
        let mut fields = FieldMap::new();
        fields.insert("longitude".to_string(), json!(181));
        let errors = validator().parse_patch(&fields).unwrap_err();
        assert_eq!(
            errors.get(Field::Longitude),
            Some("Must be between -180 and 180")
        );
    }

    #[test]
    fn test_validation_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.insert(Field::Speed, "Must be a positive number");
        errors.insert(Field::Latitude, "Required field");
        assert_eq!(
            errors.to_string(),
            "latitude: Required field; speed: Must be a positive number"
        );
    }

    #[test]
    fn test_validation_errors_serialize_as_map() {
        let mut errors = ValidationErrors::new();
        errors.insert(Field::IpAddress, INVALID_IPV4);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, json!({"ip_address": "Must be a valid IPv4 address"}));
    }

    #[test]
    fn test_report_serializes_ok_flag() {
        let report = validator().validate(&FieldMap::new(), ValidationMode::Partial);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, json!({"ok": true, "errors": {}}));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let fields = with("bearing", json!("sideways"));
        let first = validator().validate(&fields, ValidationMode::Full);
        let second = validator().validate(&fields, ValidationMode::Full);
        assert_eq!(first, second);
    }
}
