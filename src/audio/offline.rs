//! Headless audio sink
//!
//! Keeps its own audio clock, advanced by the caller, and records every
//! request instead of rendering it. Used by the native binary and tests.

use serde::{Deserialize, Serialize};

use super::{AudioSink, OutputGate, SoundEffect, Voice};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayedEffect {
    pub effect: SoundEffect,
    /// Audio clock when the burst was requested
    pub at: f64,
    pub gain: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledVoice {
    pub voice: Voice,
    pub at: f64,
    pub gain: f32,
}

#[derive(Debug, Clone, Default)]
pub struct OfflineAudio {
    clock: f64,
    settings: Settings,
    gate: OutputGate,
    pub played: Vec<PlayedEffect>,
    pub scheduled: Vec<ScheduledVoice>,
}

impl OfflineAudio {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Advance the audio clock
    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.clock += dt;
        }
    }

    pub fn time(&self) -> f64 {
        self.clock
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Stop recording requests until [`resume`](Self::resume). The clock keeps running.
    pub fn pause(&mut self) {
        self.gate.pause();
    }

    pub fn resume(&mut self) {
        self.gate.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    /// Count of recorded bursts of one kind
    pub fn played_count(&self, effect: SoundEffect) -> usize {
        self.played.iter().filter(|p| p.effect == effect).count()
    }

    /// Scheduled beats that start within `[from, to)`
    pub fn scheduled_between(&self, from: f64, to: f64) -> impl Iterator<Item = &ScheduledVoice> {
        self.scheduled
            .iter()
            .filter(move |s| s.at >= from && s.at < to)
    }
}

impl AudioSink for OfflineAudio {
    fn current_time(&self) -> Option<f64> {
        Some(self.clock)
    }

    fn play(&mut self, effect: SoundEffect) {
        let Some(gain) = self.gate.admit(self.settings.effective_sfx_volume()) else {
            return;
        };
        self.played.push(PlayedEffect {
            effect,
            at: self.clock,
            gain,
        });
    }

    fn schedule(&mut self, voice: Voice, at: f64) {
        let Some(gain) = self.gate.admit(self.settings.effective_music_volume()) else {
            return;
        };
        if at < self.clock {
            log::warn!("{voice:?} scheduled {:.4}s in the past", self.clock - at);
        }
        self.scheduled.push(ScheduledVoice { voice, at, gain });
    }
}
