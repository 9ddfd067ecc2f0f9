//! Read-only copies of the simulation for rendering and UI
//!
//! Renderers never see the live state; they get positions copied out after
//! the tick has finished.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::scoring::ScoreState;
use super::state::{GameState, Hands, TargetId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetView {
    pub id: TargetId,
    pub position: Vec3,
    pub spawn_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulation time of the tick this was taken after
    pub time: f64,
    pub targets: Vec<TargetView>,
    /// Glove visibility and pose
    pub hands: Hands,
    pub score: ScoreState,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            time: state.time,
            targets: state
                .targets
                .iter()
                .filter(|t| t.is_active())
                .map(|t| TargetView {
                    id: t.id,
                    position: t.position,
                    spawn_time: t.spawn_time,
                })
                .collect(),
            hands: state.hands,
            score: state.score,
        }
    }
}
