//! Audio output
//!
//! The simulation never talks to an audio device. It emits fire-and-forget
//! requests through [`AudioSink`]: one-shot bursts for hits and misses, and
//! beat voices committed to an exact time on the audio clock by the
//! [`BeatScheduler`]. A sink without an output device turns every request
//! into a no-op; gameplay does not depend on audio.

pub mod offline;
pub mod scheduler;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use offline::{OfflineAudio, PlayedEffect, ScheduledVoice};
pub use scheduler::{Beat, BeatScheduler};
#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

use serde::{Deserialize, Serialize};

/// One-shot feedback bursts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Glove connected with a target
    Hit,
    /// Target passed the player
    Miss,
}

/// Soundtrack voices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Voice {
    /// Percussion on every beat
    Kick,
    /// Noise-burst accent on odd beats
    Hat,
    /// Bass tone on the downbeat
    Bass,
}

/// Destination for audio requests
pub trait AudioSink {
    /// Audio hardware clock in seconds, `None` without an output device
    fn current_time(&self) -> Option<f64>;

    /// Play a burst immediately
    fn play(&mut self, effect: SoundEffect);

    /// Commit `voice` to start at audio time `at`
    fn schedule(&mut self, voice: Voice, at: f64);
}

/// Host-side pause of an output device.
///
/// While paused, requests are dropped and must not wake the device back up;
/// only the host resumes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputGate {
    paused: bool,
}

impl OutputGate {
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Gain a request plays at, `None` if it should be dropped
    pub fn admit(&self, gain: f32) -> Option<f32> {
        (!self.paused && gain > 0.0).then_some(gain)
    }
}

/// Sink for hosts without audio output
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn current_time(&self) -> Option<f64> {
        None
    }

    fn play(&mut self, _effect: SoundEffect) {}

    fn schedule(&mut self, _voice: Voice, _at: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_drops_while_paused() {
        let mut gate = OutputGate::default();
        assert_eq!(gate.admit(0.5), Some(0.5));
        assert_eq!(gate.admit(0.0), None);

        gate.pause();
        assert_eq!(gate.admit(0.5), None);
        // Admitting requests never lifts the pause
        assert!(gate.is_paused());

        gate.resume();
        assert_eq!(gate.admit(0.5), Some(0.5));
    }
}
