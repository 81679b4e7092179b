use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance unit for radius queries, named the way Redis names them.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceUnit {
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "mi")]
    Miles,
    #[serde(rename = "ft")]
    Feet,
}

impl DistanceUnit {
    pub fn to_meters(self, value: f64) -> f64 {
        value * self.meters_per_unit()
    }

    pub fn meters_per_unit(self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Kilometers => 1000.0,
            DistanceUnit::Miles => 1609.34,
            DistanceUnit::Feet => 0.3048,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Meters => "m",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
            DistanceUnit::Feet => "ft",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown distance unit: {0}")]
pub struct UnknownUnit(String);

impl FromStr for DistanceUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m" => Ok(DistanceUnit::Meters),
            "km" => Ok(DistanceUnit::Kilometers),
            "mi" => Ok(DistanceUnit::Miles),
            "ft" => Ok(DistanceUnit::Feet),
            _ => Err(UnknownUnit(s.to_string())),
        }
    }
}

impl From<DistanceUnit> for redis::geo::Unit {
    fn from(unit: DistanceUnit) -> Self {
        match unit {
            DistanceUnit::Meters => redis::geo::Unit::Meters,
            DistanceUnit::Kilometers => redis::geo::Unit::Kilometers,
            DistanceUnit::Miles => redis::geo::Unit::Miles,
            DistanceUnit::Feet => redis::geo::Unit::Feet,
        }
    }
}
