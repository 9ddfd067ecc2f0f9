//! Gameplay and music configuration
//!
//! Fixed for the lifetime of a session. Validated once when the session
//! starts; a running session never sees an invalid value.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Soundtrack timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    pub tempo_bpm: f64,
    /// Scheduler wake-up period (ms)
    pub lookahead_ms: f64,
    /// Window ahead of the audio clock in which beats get committed (s)
    pub schedule_ahead_secs: f64,
    /// Offset of the first beat from the audio clock at music start (s)
    pub start_delay_secs: f64,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: TEMPO_BPM,
            lookahead_ms: LOOKAHEAD_MS,
            schedule_ahead_secs: SCHEDULE_AHEAD_SECS,
            start_delay_secs: MUSIC_START_DELAY_SECS,
        }
    }
}

impl MusicConfig {
    /// Seconds per beat
    pub fn beat_period(&self) -> f64 {
        60.0 / self.tempo_bpm
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tempo_bpm", self.tempo_bpm)?;
        positive("lookahead_ms", self.lookahead_ms)?;
        positive("schedule_ahead_secs", self.schedule_ahead_secs)?;
        non_negative("start_delay_secs", self.start_delay_secs)?;
        Ok(())
    }
}

/// Gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub spawn_interval_ms: f64,
    /// Units per second along the depth axis
    pub target_speed: f32,
    pub spawn_depth: f32,
    /// Strike plane, used by the autopilot to time punches
    pub hit_depth: f32,
    pub despawn_depth: f32,
    pub hit_radius: f32,
    /// Lane offsets are drawn from [-lane_width, lane_width]
    pub lane_width: f32,
    pub height_min: f32,
    pub height_max: f32,
    /// RNG seed for spawn placement; `None` lets the host pick one
    pub seed: Option<u64>,
    pub music: MusicConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            target_speed: TARGET_SPEED,
            spawn_depth: SPAWN_DEPTH,
            hit_depth: HIT_DEPTH,
            despawn_depth: DESPAWN_DEPTH,
            hit_radius: HIT_RADIUS,
            lane_width: LANE_WIDTH,
            height_min: LANE_HEIGHT_MIN,
            height_max: LANE_HEIGHT_MAX,
            seed: None,
            music: MusicConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("spawn_interval_ms", self.spawn_interval_ms)?;
        positive("target_speed", self.target_speed as f64)?;
        positive("hit_radius", self.hit_radius as f64)?;
        non_negative("lane_width", self.lane_width as f64)?;
        finite("spawn_depth", self.spawn_depth as f64)?;
        finite("hit_depth", self.hit_depth as f64)?;
        finite("despawn_depth", self.despawn_depth as f64)?;
        finite("height_min", self.height_min as f64)?;
        finite("height_max", self.height_max as f64)?;

        if self.height_min > self.height_max {
            return Err(ConfigError::InvertedHeightRange {
                min: self.height_min,
                max: self.height_max,
            });
        }
        // Spawn sampling needs a finite span in f32
        if !(2.0 * self.lane_width).is_finite() {
            return Err(ConfigError::RangeTooWide {
                field: "lane_width",
            });
        }
        if !(self.height_max - self.height_min).is_finite() {
            return Err(ConfigError::RangeTooWide { field: "height" });
        }
        // Targets travel toward +depth
        if self.despawn_depth <= self.spawn_depth {
            return Err(ConfigError::DespawnBeforeSpawn {
                spawn_depth: self.spawn_depth,
                despawn_depth: self.despawn_depth,
            });
        }

        self.music.validate()
    }

    /// Seconds between spawns
    pub fn spawn_interval_secs(&self) -> f64 {
        self.spawn_interval_ms / 1000.0
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
