//! Core target types for targetstore.
//!
//! This module defines the target record along with the shapes it takes at
//! the validation boundary: a raw field mapping, a fully typed new record,
//! and a partial patch.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw name-to-value mapping, as received from a caller.
///
/// Values are untrusted: they may be numbers, strings, or anything else JSON
/// can express. Keys that do not name a [`Field`] are ignored.
pub type FieldMap = serde_json::Map<String, Value>;

/// The writable fields of a target, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Latitude in degrees.
    Latitude,
    /// Longitude in degrees.
    Longitude,
    /// Altitude in meters.
    Altitude,
    /// Radio frequency.
    Frequency,
    /// Speed in m/s.
    Speed,
    /// Bearing in degrees.
    Bearing,
    /// IPv4 address of the target.
    IpAddress,
}

impl Field {
    /// Every field, in canonical order.
    pub const ALL: [Field; 7] = [
        Field::Latitude,
        Field::Longitude,
        Field::Altitude,
        Field::Frequency,
        Field::Speed,
        Field::Bearing,
        Field::IpAddress,
    ];

    /// The field's name as used in field maps and on disk.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Altitude => "altitude",
            Self::Frequency => "frequency",
            Self::Speed => "speed",
            Self::Bearing => "bearing",
            Self::IpAddress => "ip_address",
        }
    }

    /// Whether the field holds a number (every field except `ip_address`).
    #[must_use]
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::IpAddress)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown field: {s}"))
    }
}

/// A stored target record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Unique identifier, assigned by the store at creation.
    pub id: String,
    /// Latitude in degrees, within [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, within [-180, 180].
    pub longitude: f64,
    /// Altitude in meters; may be negative.
    pub altitude: f64,
    /// Radio frequency.
    pub frequency: f64,
    /// Speed in m/s, never negative.
    pub speed: f64,
    /// Bearing in degrees, within [0, 360].
    pub bearing: f64,
    /// Dotted-quad IPv4 address.
    pub ip_address: String,
}

/// A fully validated record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTarget {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in meters.
    pub altitude: f64,
    /// Radio frequency.
    pub frequency: f64,
    /// Speed in m/s.
    pub speed: f64,
    /// Bearing in degrees.
    pub bearing: f64,
    /// Dotted-quad IPv4 address.
    pub ip_address: String,
}

/// A validated partial update. Unset fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetPatch {
    /// New latitude, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// New longitude, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// New altitude, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// New frequency, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    /// New speed, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// New bearing, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    /// New IPv4 address, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl Target {
    /// Assign an id to a validated new record.
    #[must_use]
    pub fn from_new(id: impl Into<String>, new: NewTarget) -> Self {
        Self {
            id: id.into(),
            latitude: new.latitude,
            longitude: new.longitude,
            altitude: new.altitude,
            frequency: new.frequency,
            speed: new.speed,
            bearing: new.bearing,
            ip_address: new.ip_address,
        }
    }

    /// Render the record as a flat field mapping, `id` included.
    #[must_use]
    pub fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("id".to_string(), Value::from(self.id.clone()));
        for field in Field::ALL {
            let value = match field {
                Field::IpAddress => Value::from(self.ip_address.clone()),
                numeric => Value::from(self.numeric(numeric).unwrap_or_default()),
            };
            map.insert(field.name().to_string(), value);
        }
        map
    }

    /// Read a numeric field. Returns `None` for `ip_address`.
    #[must_use]
    pub fn numeric(&self, field: Field) -> Option<f64> {
        match field {
            Field::Latitude => Some(self.latitude),
            Field::Longitude => Some(self.longitude),
            Field::Altitude => Some(self.altitude),
            Field::Frequency => Some(self.frequency),
            Field::Speed => Some(self.speed),
            Field::Bearing => Some(self.bearing),
            Field::IpAddress => None,
        }
    }
}

impl TargetPatch {
    /// Check if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// The fields this patch sets, in canonical order.
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        let set = [
            self.latitude.is_some(),
            self.longitude.is_some(),
            self.altitude.is_some(),
            self.frequency.is_some(),
            self.speed.is_some(),
            self.bearing.is_some(),
            self.ip_address.is_some(),
        ];
        Field::ALL
            .into_iter()
            .zip(set)
            .filter_map(|(field, is_set)| is_set.then_some(field))
            .collect()
    }

    /// Merge the patch into a record, field by field.
    pub fn apply(&self, target: &mut Target) {
        if let Some(v) = self.latitude {
            target.latitude = v;
        }
        if let Some(v) = self.longitude {
            target.longitude = v;
        }
        if let Some(v) = self.altitude {
            target.altitude = v;
        }
        if let Some(v) = self.frequency {
            target.frequency = v;
        }
        if let Some(v) = self.speed {
            target.speed = v;
        }
        if let Some(v) = self.bearing {
            target.bearing = v;
        }
        if let Some(v) = &self.ip_address {
            target.ip_address.clone_from(v);
        }
    }
}
