use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::registration::parse_timestamp;
use super::vehicle::VehicleSummary;

/// Whether a scan represents a vehicle entering or leaving campus.
///
/// Has no `Default`: every scan needs an explicit choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Entry,
    Exit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Entry => "entry",
            Direction::Exit => "exit",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Invalid direction '{0}' (expected 'entry' or 'exit')")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry" => Ok(Direction::Entry),
            "exit" => Ok(Direction::Exit),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// One append-only attendance event, owned by the Backend API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    #[serde(default, alias = "code")]
    pub registration_code: Option<String>,
    #[serde(alias = "type")]
    pub direction: Direction,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub vehicle_registration: Option<RecordRegistration>,
}

/// Registration embedded in a record, with its vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRegistration {
    pub id: Option<i64>,
    pub code: Option<String>,
    pub valid_until: Option<String>,
    #[serde(default)]
    pub vehicle: Option<VehicleSummary>,
}

impl AttendanceRecord {
    /// Vehicle details embedded in the record, or an empty summary
    pub fn vehicle_summary(&self) -> VehicleSummary {
        self.vehicle_registration
            .as_ref()
            .and_then(|reg| reg.vehicle.clone())
            .unwrap_or_default()
    }

    /// The scanned code, from the record itself or its embedded registration
    pub fn code(&self) -> Option<&str> {
        self.registration_code.as_deref().or_else(|| {
            self.vehicle_registration
                .as_ref()
                .and_then(|reg| reg.code.as_deref())
        })
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!("entry".parse::<Direction>(), Ok(Direction::Entry));
        assert_eq!(" EXIT ".parse::<Direction>(), Ok(Direction::Exit));
        assert!("".parse::<Direction>().is_err());
        assert!("in".parse::<Direction>().is_err());
        assert!("entry/exit".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_wire_format() {
        assert_eq!(serde_json::to_string(&Direction::Exit).unwrap(), r#""exit""#);
        assert!(serde_json::from_str::<Direction>(r#""Entry""#).is_err());
    }

    #[test]
    fn test_record_accepts_type_field() {
        let json = r#"{
            "id": 55,
            "type": "entry",
            "recorded_at": "2025-03-01T07:45:00Z",
            "vehicle_registration": {
                "id": 9,
                "code": "ABC123",
                "valid_until": "2025-06-30",
                "vehicle": {"plate_number": "NBC 1234", "make": "Toyota", "model": "Vios"}
            }
        }"#;

        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.direction, Direction::Entry);
        assert_eq!(record.code(), Some("ABC123"));
        assert_eq!(record.vehicle_summary().label(), "Toyota Vios (Plate NBC 1234)");
    }

    #[test]
    fn test_record_without_embedded_registration() {
        let json = r#"{
            "id": 56,
            "registration_code": "XYZ",
            "direction": "exit",
            "recorded_at": "2025-03-01 09:02:10"
        }"#;

        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.direction, Direction::Exit);
        assert_eq!(record.recorded_at.to_rfc3339(), "2025-03-01T09:02:10+00:00");
        assert_eq!(record.code(), Some("XYZ"));
        assert_eq!(record.vehicle_summary(), VehicleSummary::default());
    }
}
