use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::CourierError;

/// Map zoom level at which one step is exactly `BASE_STEP_DEGREES`.
pub const REFERENCE_ZOOM: i32 = 14;
pub const BASE_STEP_DEGREES: f64 = 0.001;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Step size in degrees: halves per zoom level above the reference and
/// doubles per level below, so one step covers the same on-screen distance.
/// Out-of-range zooms saturate: far-out zooms give an infinite step, far-in
/// zooms a zero step.
pub fn step_degrees(zoom: i32) -> f64 {
    BASE_STEP_DEGREES / 2f64.powi(zoom.saturating_sub(REFERENCE_ZOOM))
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i64> for Direction {
    type Error = CourierError;

    /// Legacy numeric codes: 0 up, 1 down, 2 left, 3 right.
    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Down),
            2 => Ok(Direction::Left),
            3 => Ok(Direction::Right),
            other => Err(CourierError::InvalidDirection(other.to_string())),
        }
    }
}

impl FromStr for Direction {
    type Err = CourierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return Direction::try_from(code);
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(CourierError::InvalidDirection(s.to_string())),
        }
    }
}
