//! Hand tracker
//!
//! Turns the raw pose feed for one tick into a left/right snapshot. The
//! result fully replaces the previous tick's hands: a hand missing from the
//! feed is reported absent, never left at its last position.

use super::state::{HandPose, HandState, Hands};

/// Resolve this tick's hands from zero, one or two pose records.
///
/// Poses with a non-finite position count as untracked. If the feed reports
/// the same hand twice, the first record wins.
pub fn resolve_hands(poses: &[HandPose]) -> Hands {
    let mut hands = Hands::default();

    for pose in poses {
        if !pose.position.is_finite() {
            log::debug!("Ignoring {:?} pose with non-finite position", pose.handedness);
            continue;
        }
        let slot = hands.get_mut(pose.handedness);
        if slot.present {
            continue;
        }
        *slot = HandState::from_pose(pose);
    }

    hands
}
