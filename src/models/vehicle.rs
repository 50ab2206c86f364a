use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::registration::VehicleRegistration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Car,
    Motorcycle,
    #[serde(other)]
    Other,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Motorcycle => "motorcycle",
            VehicleType::Other => "other",
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Invalid vehicle type '{0}' (expected car, motorcycle or other)")]
pub struct ParseVehicleTypeError(pub String);

impl FromStr for VehicleType {
    type Err = ParseVehicleTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(VehicleType::Car),
            "motorcycle" => Ok(VehicleType::Motorcycle),
            "other" => Ok(VehicleType::Other),
            _ => Err(ParseVehicleTypeError(s.to_string())),
        }
    }
}

/// Vehicle as returned by the Backend API, including its registration history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub user_id: Option<i64>,
    pub plate_number: String,
    pub make: Option<String>,
    pub model: Option<String>,
    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<VehicleType>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_registered: bool,
    pub image: Option<String>,
    #[serde(default, deserialize_with = "deserialize_registrations")]
    pub vehicle_registration: Vec<VehicleRegistration>,
}

impl Vehicle {
    /// "Make Model", falling back to the plate number
    pub fn display_name(&self) -> String {
        match (self.make.as_deref(), self.model.as_deref()) {
            (Some(make), Some(model)) => format!("{} {}", make, model),
            (Some(single), None) | (None, Some(single)) => single.to_string(),
            (None, None) => self.plate_number.clone(),
        }
    }

    pub fn summary(&self) -> VehicleSummary {
        VehicleSummary {
            id: Some(self.id),
            plate_number: Some(self.plate_number.clone()),
            make: self.make.clone(),
            model: self.model.clone(),
            color: self.color.clone(),
        }
    }
}

/// Body of `POST /vehicle`. Images are not uploaded from this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewVehicle {
    pub user_id: i64,
    pub plate_number: String,
    pub make: String,
    pub model: String,
    pub year: String,
    pub color: String,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    #[serde(serialize_with = "serialize_flag")]
    pub is_registered: bool,
}

/// Display subset of a vehicle, as embedded in scan responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub id: Option<i64>,
    pub plate_number: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

impl VehicleSummary {
    pub fn label(&self) -> String {
        let name = [self.make.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let plate = self.plate_number.as_deref().unwrap_or("Unknown");

        if name.is_empty() {
            format!("Plate {}", plate)
        } else {
            format!("{} (Plate {})", name, plate)
        }
    }
}

// The backend sends `is_registered` as 0/1 or as a boolean
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        Some(Flag::Str(s)) => matches!(s.trim(), "1" | "true"),
        None => false,
    })
}

// Sent back the way the backend stores it: 0/1
fn serialize_flag<S>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u8(u8::from(*flag))
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Int(i64),
        Str(String),
    }

    Ok(Option::<Year>::deserialize(deserializer)?.map(|year| match year {
        Year::Int(i) => i.to_string(),
        Year::Str(s) => s,
    }))
}

fn deserialize_registrations<'de, D>(deserializer: D) -> Result<Vec<VehicleRegistration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<VehicleRegistration>>::deserialize(deserializer)?.unwrap_or_default())
}
