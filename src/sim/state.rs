//! Game state and core simulation types
//!
//! Everything the simulation tick mutates lives in [`GameState`]. A fresh
//! state is built for every session; nothing carries over between games.

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::scoring::ScoreState;
use crate::config::GameConfig;

/// Monotonic target identifier, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Lifecycle of a target. Leaves `Active` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetStatus {
    Active,
    /// Removed by a strike
    Hit,
    /// Passed the despawn depth unhit
    Missed,
}

/// A target approaching the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEntity {
    pub id: TargetId,
    /// (lane offset, height, depth)
    pub position: Vec3,
    /// Simulation time at creation (s)
    pub spawn_time: f64,
    status: TargetStatus,
}

impl TargetEntity {
    pub fn new(id: TargetId, position: Vec3, spawn_time: f64) -> Self {
        Self {
            id,
            position,
            spawn_time,
            status: TargetStatus::Active,
        }
    }

    pub fn status(&self) -> TargetStatus {
        self.status
    }

    /// Eligible for collision and rendering
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == TargetStatus::Active
    }

    /// Only meaningful once the target is inactive
    #[inline]
    pub fn was_hit(&self) -> bool {
        self.status == TargetStatus::Hit
    }

    /// Retire after a strike. Returns false if the target was already retired.
    pub fn retire_hit(&mut self) -> bool {
        self.retire(TargetStatus::Hit)
    }

    /// Retire after passing the player. Returns false if already retired.
    pub fn retire_missed(&mut self) -> bool {
        self.retire(TargetStatus::Missed)
    }

    fn retire(&mut self, outcome: TargetStatus) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = outcome;
        true
    }
}

/// Which hand a pose belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// Raw pose record from the tracking source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandPose {
    pub handedness: Handedness,
    pub position: Vec3,
    /// Relayed to glove rendering, not used for collision
    pub orientation: Quat,
}

impl HandPose {
    pub fn new(handedness: Handedness, position: Vec3) -> Self {
        Self {
            handedness,
            position,
            orientation: Quat::IDENTITY,
        }
    }
}

/// Per-hand snapshot for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandState {
    pub handedness: Handedness,
    /// Only valid when `present`
    pub position: Vec3,
    pub orientation: Quat,
    pub present: bool,
}

impl HandState {
    /// Untracked hand
    pub fn absent(handedness: Handedness) -> Self {
        Self {
            handedness,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            present: false,
        }
    }

    pub fn from_pose(pose: &HandPose) -> Self {
        Self {
            handedness: pose.handedness,
            position: pose.position,
            orientation: pose.orientation,
            present: true,
        }
    }

    /// Position if tracked this tick
    pub fn tracked_position(&self) -> Option<Vec3> {
        self.present.then_some(self.position)
    }
}

/// Both hands for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hands {
    pub left: HandState,
    pub right: HandState,
}

impl Default for Hands {
    fn default() -> Self {
        Self {
            left: HandState::absent(Handedness::Left),
            right: HandState::absent(Handedness::Right),
        }
    }
}

impl Hands {
    pub fn get(&self, handedness: Handedness) -> &HandState {
        match handedness {
            Handedness::Left => &self.left,
            Handedness::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, handedness: Handedness) -> &mut HandState {
        match handedness {
            Handedness::Left => &mut self.left,
            Handedness::Right => &mut self.right,
        }
    }

    /// Tracked hands in test order (left first)
    pub fn present(&self) -> impl Iterator<Item = &HandState> {
        [&self.left, &self.right].into_iter().filter(|h| h.present)
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned { id: TargetId, position: Vec3 },
    Hit {
        id: TargetId,
        hand: Handedness,
        points: u64,
    },
    Missed { id: TargetId },
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    /// Seed the spawn RNG was built from
    pub seed: u64,
    pub rng: Pcg32,
    /// Simulation time of the most recent tick (s)
    pub time: f64,
    /// Simulation time of the last spawn; `None` until the first one
    pub last_spawn: Option<f64>,
    /// Live targets, in spawn order
    pub targets: Vec<TargetEntity>,
    /// Hand snapshot of the current tick
    pub hands: Hands,
    pub score: ScoreState,
    pub tick_count: u64,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state. The config is expected to be validated.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            last_spawn: None,
            targets: Vec::new(),
            hands: Hands::default(),
            score: ScoreState::default(),
            tick_count: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_target_id(&mut self) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        id
    }
}
