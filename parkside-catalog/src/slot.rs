use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type SlotId = u32;

/// Vehicle categories a slot can serve
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Car,
    Bike,
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleType::Car => write!(f, "Car"),
            VehicleType::Bike => write!(f, "Bike"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown vehicle type: {0}")]
pub struct UnknownVehicleType(pub String);

impl FromStr for VehicleType {
    type Err = UnknownVehicleType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(VehicleType::Car),
            "bike" => Ok(VehicleType::Bike),
            other => Err(UnknownVehicleType(other.to_string())),
        }
    }
}

/// A single physical parking space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub floor: i32,
    pub vehicle_type: VehicleType,
    available: bool,
}

impl Slot {
    pub fn new(id: SlotId, floor: i32, vehicle_type: VehicleType) -> Self {
        Self {
            id,
            floor,
            vehicle_type,
            available: true,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub(crate) fn mark_booked(&mut self) {
        self.available = false;
    }

    pub(crate) fn mark_available(&mut self) {
        self.available = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_type_parsing_is_case_insensitive() {
        assert_eq!("CAR".parse::<VehicleType>().unwrap(), VehicleType::Car);
        assert_eq!(" bike ".parse::<VehicleType>().unwrap(), VehicleType::Bike);
        assert!("truck".parse::<VehicleType>().is_err());
    }

    #[test]
    fn test_slot_starts_available() {
        let slot = Slot::new(101, 1, VehicleType::Car);
        assert!(slot.is_available());
    }
}
