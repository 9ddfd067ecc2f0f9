//! Gameplay simulation module
//!
//! All gameplay logic lives here. This module stays free of audio and
//! rendering:
//! - Driven by the frame clock (variable delta)
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - Results reported as events; the caller decides what they sound like

pub mod autopilot;
pub mod collision;
pub mod hands;
pub mod scoring;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use collision::{striking_hand, within_radius};
pub use hands::resolve_hands;
pub use scoring::{ScoreState, hit_points};
pub use snapshot::{Snapshot, TargetView};
pub use state::{
    GameEvent, GameState, HandPose, HandState, Handedness, Hands, TargetEntity, TargetId,
    TargetStatus,
};
pub use tick::{TickInput, tick};
