//! Audio sink using Web Audio API
//!
//! Procedurally generated sounds - no external files needed! The
//! AudioContext clock is the audio clock the beat scheduler runs against.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use web_sys::{AudioContext, BiquadFilterType, GainNode, OscillatorNode, OscillatorType};

use super::{AudioSink, OutputGate, SoundEffect, Voice};
use crate::settings::Settings;

/// Hat noise burst length (s)
const HAT_LENGTH: f32 = 0.05;

/// Web Audio backed sink
pub struct WebAudio {
    ctx: Option<AudioContext>,
    settings: Settings,
    /// Paused by the page (window blur), not by the autoplay lock
    gate: OutputGate,
    /// Noise source for hats
    rng: Pcg32,
}

impl WebAudio {
    pub fn new(settings: Settings, seed: u64) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            settings,
            gate: OutputGate::default(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Resume audio context (required after user gesture, and after
    /// [`suspend`](Self::suspend))
    pub fn resume(&mut self) {
        self.gate.resume();
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Pause output while the page is in the background. Requests are
    /// dropped until [`resume`](Self::resume).
    pub fn suspend(&mut self) {
        self.gate.pause();
        if let Some(ctx) = &self.ctx {
            let _ = ctx.suspend();
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Context ready to take requests at the given gain
    fn ready(&self, vol: f32) -> Option<&AudioContext> {
        self.gate.admit(vol)?;
        let ctx = self.ctx.as_ref()?;
        // Still locked by the autoplay policy; retry the unlock
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some(ctx)
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Hit - punchy square drop
    fn play_hit(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = Self::create_osc(ctx, 150.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(150.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(40.0, t + 0.1)
            .ok();
        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// Miss - low sawtooth groan
    fn play_miss(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = Self::create_osc(ctx, 100.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(100.0, t).ok();
        osc.frequency()
            .linear_ramp_to_value_at_time(80.0, t + 0.2)
            .ok();
        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(0.01, t + 0.2)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.2).ok();
    }

    /// Kick - sine thump falling away
    fn schedule_kick(ctx: &AudioContext, vol: f32, t: f64) {
        let Some((osc, gain)) = Self::create_osc(ctx, 150.0, OscillatorType::Sine) else {
            return;
        };

        osc.frequency().set_value_at_time(150.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();
        gain.gain().set_value_at_time(vol * 0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + 0.5).ok();
    }

    /// Hat - short burst of high-passed white noise
    fn schedule_hat(&mut self, vol: f32, t: f64) {
        let Some(ctx) = self.ctx.as_ref() else { return };

        let sample_rate = ctx.sample_rate();
        let len = (sample_rate * HAT_LENGTH) as u32;
        let Ok(buffer) = ctx.create_buffer(1, len, sample_rate) else {
            return;
        };
        let mut data: Vec<f32> = (0..len)
            .map(|_| self.rng.random_range(-1.0f32..1.0))
            .collect();
        if buffer.copy_to_channel(&mut data, 0).is_err() {
            return;
        }

        let Ok(noise) = ctx.create_buffer_source() else {
            return;
        };
        let Ok(filter) = ctx.create_biquad_filter() else {
            return;
        };
        let Ok(gain) = ctx.create_gain() else { return };

        noise.set_buffer(Some(&buffer));
        filter.set_type(BiquadFilterType::Highpass);
        filter.frequency().set_value(1000.0);
        gain.gain().set_value(vol * 0.1);

        if noise.connect_with_audio_node(&filter).is_err()
            || filter.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(&ctx.destination()).is_err()
        {
            return;
        }
        noise.start_with_when(t).ok();
    }

    /// Bass - sawtooth root on the downbeat
    fn schedule_bass(ctx: &AudioContext, vol: f32, t: f64) {
        let Some((osc, gain)) = Self::create_osc(ctx, 60.0, OscillatorType::Sawtooth) else {
            return;
        };

        osc.frequency().set_value_at_time(60.0, t).ok();
        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.001, t + 0.4)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + 0.4).ok();
    }
}

impl AudioSink for WebAudio {
    fn current_time(&self) -> Option<f64> {
        self.ctx.as_ref().map(|ctx| ctx.current_time())
    }

    fn play(&mut self, effect: SoundEffect) {
        let vol = self.settings.effective_sfx_volume();
        let Some(ctx) = self.ready(vol) else { return };

        match effect {
            SoundEffect::Hit => Self::play_hit(ctx, vol),
            SoundEffect::Miss => Self::play_miss(ctx, vol),
        }
    }

    fn schedule(&mut self, voice: Voice, at: f64) {
        let vol = self.settings.effective_music_volume();
        let Some(ctx) = self.ready(vol) else { return };

        match voice {
            Voice::Kick => Self::schedule_kick(ctx, vol, at),
            Voice::Bass => Self::schedule_bass(ctx, vol, at),
            Voice::Hat => self.schedule_hat(vol, at),
        }
    }
}
