//! Demo-mode player
//!
//! Produces hand poses the same way a tracking source would. Each target is
//! assigned to the glove on its side of the lane; a seeded fraction of
//! targets is deliberately let through so misses show up too.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{GameState, HandPose, Handedness, TargetId};

/// Guard position, low enough that a resting glove never touches a target
const REST_HEIGHT: f32 = 0.5;
const REST_LANE: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
    /// Probability of letting a target through (0.0 - 1.0)
    pub whiff_chance: f32,
    /// Per-target decision: true = let it through
    plans: Vec<(TargetId, bool)>,
}

impl Autopilot {
    pub fn new(seed: u64, whiff_chance: f32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            whiff_chance: whiff_chance.clamp(0.0, 1.0),
            plans: Vec::new(),
        }
    }

    /// Poses for the coming tick, based on the last tick's state
    pub fn poses(&mut self, state: &GameState) -> Vec<HandPose> {
        self.plans
            .retain(|(id, _)| state.targets.iter().any(|t| t.id == *id && t.is_active()));

        let strike_depth = state.config.hit_depth;
        let mut left = rest_position(Handedness::Left, strike_depth);
        let mut right = rest_position(Handedness::Right, strike_depth);
        let mut left_best = f32::INFINITY;
        let mut right_best = f32::INFINITY;

        for target in state.targets.iter().filter(|t| t.is_active()) {
            if self.plan_for(target.id) {
                continue;
            }
            let distance = (target.position.z - strike_depth).abs();
            let aim = Vec3::new(target.position.x, target.position.y, strike_depth);
            if target.position.x < 0.0 {
                if distance < left_best {
                    left_best = distance;
                    left = aim;
                }
            } else if distance < right_best {
                right_best = distance;
                right = aim;
            }
        }

        vec![
            HandPose::new(Handedness::Left, left),
            HandPose::new(Handedness::Right, right),
        ]
    }

    /// Whether to let `id` through, deciding on first sight
    fn plan_for(&mut self, id: TargetId) -> bool {
        if let Some((_, whiff)) = self.plans.iter().find(|(planned, _)| *planned == id) {
            return *whiff;
        }
        let whiff = self.rng.random::<f32>() < self.whiff_chance;
        self.plans.push((id, whiff));
        whiff
    }
}

fn rest_position(handedness: Handedness, strike_depth: f32) -> Vec3 {
    let lane = match handedness {
        Handedness::Left => -REST_LANE,
        Handedness::Right => REST_LANE,
    };
    Vec3::new(lane, REST_HEIGHT, strike_depth)
}
