//! XR Boxer - A rhythm boxing mini-game core
//!
//! Core modules:
//! - `sim`: Gameplay simulation (hands, spawning, collisions, scoring)
//! - `audio`: Audio sinks and the look-ahead beat scheduler
//! - `game`: Session orchestrator tying the two clocks together
//! - `platform`: Host clock and polled wake-up timer
//! - `config`: Validated gameplay/music configuration

pub mod audio;
pub mod config;
pub mod error;
pub mod game;
pub mod platform;
pub mod settings;
pub mod sim;

pub use config::{GameConfig, MusicConfig};
pub use error::ConfigError;
pub use game::{Game, GamePhase, TickReport};
pub use settings::Settings;

/// Game configuration defaults
pub mod consts {
    /// Time between target spawns (ms)
    pub const SPAWN_INTERVAL_MS: f64 = 600.0;
    /// Target approach speed (units/s)
    pub const TARGET_SPEED: f32 = 8.0;
    /// Depth at which targets appear
    pub const SPAWN_DEPTH: f32 = -12.0;
    /// Approximate depth of the player's strike plane
    pub const HIT_DEPTH: f32 = 0.5;
    /// Depth behind the player at which an unhit target counts as a miss
    pub const DESPAWN_DEPTH: f32 = 2.0;
    /// Collision tolerance between glove and target centers
    pub const HIT_RADIUS: f32 = 0.4;
    /// Horizontal half-spread of spawn lanes
    pub const LANE_WIDTH: f32 = 0.8;
    pub const LANE_HEIGHT_MIN: f32 = 1.0;
    pub const LANE_HEIGHT_MAX: f32 = 1.6;

    /// Soundtrack tempo
    pub const TEMPO_BPM: f64 = 100.0;
    /// Scheduler wake-up period (ms)
    pub const LOOKAHEAD_MS: f64 = 25.0;
    /// How far ahead of the audio clock beats are committed (s)
    pub const SCHEDULE_AHEAD_SECS: f64 = 0.1;
    /// Offset of the first beat from the audio clock at music start (s)
    pub const MUSIC_START_DELAY_SECS: f64 = 0.1;
    /// Beats per measure
    pub const BEATS_PER_MEASURE: u8 = 4;

    /// Base points for a hit before the combo multiplier
    pub const HIT_POINTS: u64 = 100;
}
