//! Spawn and motion controller
//!
//! Targets appear on a fixed cadence at the spawn depth and travel toward
//! the player along +depth with the frame's variable delta.

use glam::Vec3;
use rand::Rng;

use super::state::{GameEvent, GameState, TargetEntity};

/// True when a spawn is due at `now` (all times in seconds).
///
/// The first call of a session always spawns.
pub fn spawn_due(now: f64, last_spawn: Option<f64>, interval_ms: f64) -> bool {
    match last_spawn {
        None => true,
        Some(last) => (now - last) * 1000.0 >= interval_ms,
    }
}

/// Spawn a target if the cadence allows it.
///
/// `last_spawn` is reset to `now` rather than advanced by the interval, so a
/// late tick delays the following spawns instead of bunching them up.
pub fn maybe_spawn(state: &mut GameState, now: f64, events: &mut Vec<GameEvent>) {
    if !spawn_due(now, state.last_spawn, state.config.spawn_interval_ms) {
        return;
    }
    state.last_spawn = Some(now);

    let position = spawn_position(state);
    let id = state.next_target_id();
    state.targets.push(TargetEntity::new(id, position, now));
    events.push(GameEvent::Spawned { id, position });
    log::debug!("Spawned target {} at {:?} (t={:.3})", id.0, position, now);
}

/// Random lane/height at the spawn depth
fn spawn_position(state: &mut GameState) -> Vec3 {
    let config = &state.config;
    let lane = state
        .rng
        .random_range(-config.lane_width..=config.lane_width);
    let height = state
        .rng
        .random_range(config.height_min..=config.height_max);
    Vec3::new(lane, height, config.spawn_depth)
}

/// Position after `dt` seconds of travel
#[inline]
pub fn advanced(position: Vec3, speed: f32, dt: f32) -> Vec3 {
    Vec3::new(position.x, position.y, position.z + speed * dt)
}

/// Move every active target toward the player
pub fn advance_targets(state: &mut GameState, dt: f32) {
    let speed = state.config.target_speed;
    for target in state.targets.iter_mut().filter(|t| t.is_active()) {
        target.position = advanced(target.position, speed, dt);
    }
}
