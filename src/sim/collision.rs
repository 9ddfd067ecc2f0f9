//! Glove/target collision
//!
//! A strike counts when a tracked glove is strictly closer than the hit
//! radius to a target's center. Left is tested before right; whichever
//! matches first is credited, so a target is never hit twice.

use glam::Vec3;

use super::state::{Handedness, Hands};

/// Strict sphere test
#[inline]
pub fn within_radius(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance(b) < radius
}

/// The hand striking a target at `target`, if any
pub fn striking_hand(target: Vec3, hands: &Hands, radius: f32) -> Option<Handedness> {
    hands
        .present()
        .find(|hand| within_radius(target, hand.position, radius))
        .map(|hand| hand.handedness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hands::resolve_hands;
    use crate::sim::state::HandPose;

    #[test]
    fn test_hit_inside_radius() {
        let target = Vec3::new(0.0, 1.2, 0.3);
        let hands = resolve_hands(&[HandPose::new(Handedness::Right, Vec3::new(0.0, 1.2, 0.0))]);
        assert_eq!(striking_hand(target, &hands, 0.4), Some(Handedness::Right));
    }

    #[test]
    fn test_miss_outside_radius() {
        // Distance sqrt(0.25 + 0.09) ~= 0.583
        let target = Vec3::new(0.0, 1.2, 0.3);
        let hands = resolve_hands(&[HandPose::new(Handedness::Right, Vec3::new(0.5, 1.2, 0.0))]);
        assert_eq!(striking_hand(target, &hands, 0.4), None);
    }

    #[test]
    fn test_boundary_is_not_a_hit() {
        assert!(!within_radius(Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0), 0.5));
        assert!(within_radius(Vec3::ZERO, Vec3::new(0.49, 0.0, 0.0), 0.5));
    }

    #[test]
    fn test_both_hands_credit_left_once() {
        let target = Vec3::new(0.0, 1.2, 0.0);
        let hands = resolve_hands(&[
            HandPose::new(Handedness::Right, Vec3::new(0.1, 1.2, 0.0)),
            HandPose::new(Handedness::Left, Vec3::new(-0.1, 1.2, 0.0)),
        ]);
        assert_eq!(striking_hand(target, &hands, 0.4), Some(Handedness::Left));
    }

    #[test]
    fn test_absent_hands_never_hit() {
        let hands = Hands::default();
        // Absent hands sit at the origin; a target there must still not count
        assert_eq!(striking_hand(Vec3::ZERO, &hands, 1.0), None);
    }
}
