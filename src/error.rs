//! Configuration errors
//!
//! Raised when a session starts with values the simulation cannot run with.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A value that must be strictly positive was zero or negative
    NonPositive { field: &'static str, value: f64 },
    /// A value that must be zero or more was negative
    Negative { field: &'static str, value: f64 },
    /// NaN or infinity
    NonFinite { field: &'static str },
    /// Spawn range too wide to sample from (its span overflows)
    RangeTooWide { field: &'static str },
    /// Minimum spawn height above the maximum
    InvertedHeightRange { min: f32, max: f32 },
    /// Targets would despawn before (or where) they spawn
    DespawnBeforeSpawn { spawn_depth: f32, despawn_depth: f32 },
    /// Config text could not be parsed
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::Negative { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::NonFinite { field } => write!(f, "{field} must be a finite number"),
            Self::RangeTooWide { field } => write!(f, "{field} spans too wide a range"),
            Self::InvertedHeightRange { min, max } => {
                write!(f, "spawn height range inverted: min {min} > max {max}")
            }
            Self::DespawnBeforeSpawn {
                spawn_depth,
                despawn_depth,
            } => write!(
                f,
                "despawn depth {despawn_depth} must lie beyond spawn depth {spawn_depth}"
            ),
            Self::Parse(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
