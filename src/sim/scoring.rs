//! Score and combo state machine
//!
//! The only code that mutates [`ScoreState`]. A hit pays
//! `100 × (1 + combo × 0.1)` with the combo *before* the hit, then extends
//! the combo. A miss breaks the combo and leaves the score alone.

use serde::{Deserialize, Serialize};

use crate::consts::HIT_POINTS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
}

/// Points for a hit landed with `combo` consecutive hits behind it.
///
/// Every award is a whole number (100, 110, 120, ...), so this is kept in
/// integers: `100 × (10 + combo) / 10`.
pub fn hit_points(combo: u32) -> u64 {
    HIT_POINTS * (10 + combo as u64) / 10
}

impl ScoreState {
    /// Apply a hit; returns the points awarded
    pub fn register_hit(&mut self) -> u64 {
        let points = hit_points(self.combo);
        self.score = self.score.saturating_add(points);
        self.combo = self.combo.saturating_add(1);
        self.max_combo = self.max_combo.max(self.combo);
        points
    }

    /// Apply a miss
    pub fn register_miss(&mut self) {
        self.combo = 0;
    }

    /// Current multiplier, for display
    pub fn multiplier(&self) -> f32 {
        1.0 + self.combo as f32 * 0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_hits() {
        let mut score = ScoreState::default();
        assert_eq!(score.register_hit(), 100);
        assert_eq!(score.register_hit(), 110);
        assert_eq!(score.score, 210);
        assert_eq!(score.combo, 2);
        assert_eq!(score.max_combo, 2);
    }

    #[test]
    fn test_miss_resets_multiplier_base() {
        let mut score = ScoreState::default();
        score.register_hit();
        score.register_miss();
        assert_eq!(score.combo, 0);
        assert_eq!(score.score, 100);
        assert_eq!(score.max_combo, 1);
        assert_eq!(score.register_hit(), 100);
    }

    #[test]
    fn test_hit_points_table() {
        assert_eq!(hit_points(0), 100);
        assert_eq!(hit_points(1), 110);
        assert_eq!(hit_points(5), 150);
        assert_eq!(hit_points(20), 300);
    }

    proptest! {
        #[test]
        fn prop_score_invariants(events in prop::collection::vec(any::<bool>(), 0..200)) {
            let mut score = ScoreState::default();
            let mut streak = 0u32;

            for is_hit in events {
                let before = score;
                if is_hit {
                    let points = score.register_hit();
                    prop_assert_eq!(points, hit_points(before.combo));
                    streak += 1;
                } else {
                    score.register_miss();
                    streak = 0;
                    prop_assert_eq!(score.max_combo, before.max_combo);
                }

                prop_assert!(score.score >= before.score);
                prop_assert_eq!(score.combo, streak);
                prop_assert!(score.max_combo >= score.combo);
                prop_assert!(score.max_combo >= before.max_combo);
            }
        }
    }
}
