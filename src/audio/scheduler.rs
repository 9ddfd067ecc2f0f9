//! Look-ahead beat scheduler
//!
//! Frame timing is far too jittery to trigger music from, so the soundtrack
//! runs on its own short periodic wake-up. Each wake-up commits every beat
//! that starts within `schedule_ahead_secs` of the audio clock, stamped with
//! its own exact audio time. The sink fires them on time no matter when the
//! wake-up itself ran.
//!
//! The grid is accumulated: `next_event_time` advances by exactly one period
//! per beat and is never re-read from the clock, so tempo cannot drift.

use super::{AudioSink, Voice};
use crate::config::MusicConfig;
use crate::consts::BEATS_PER_MEASURE;

/// A beat committed to the audio clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beat {
    /// Position in the measure (0-based)
    pub index: u8,
    /// Audio clock time the beat starts at (s)
    pub time: f64,
}

impl Beat {
    /// Voices sounding on this beat: kick always, hat on odd beats, bass on
    /// the downbeat
    pub fn voices(&self) -> impl Iterator<Item = Voice> {
        let hat = self.index % 2 == 1;
        let bass = self.index == 0;
        [
            Some(Voice::Kick),
            hat.then_some(Voice::Hat),
            bass.then_some(Voice::Bass),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone)]
pub struct BeatScheduler {
    config: MusicConfig,
    /// Audio time of the next beat not yet committed
    next_event_time: f64,
    beat_index: u8,
    running: bool,
    beats_scheduled: u64,
}

impl BeatScheduler {
    pub fn new(config: MusicConfig) -> Self {
        Self {
            config,
            next_event_time: 0.0,
            beat_index: 0,
            running: false,
            beats_scheduled: 0,
        }
    }

    /// Begin the soundtrack relative to the audio clock.
    ///
    /// Returns false (and changes nothing) if already running.
    pub fn start(&mut self, audio_now: f64) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.beat_index = 0;
        self.beats_scheduled = 0;
        self.next_event_time = audio_now + self.config.start_delay_secs;
        log::info!(
            "Music started at {:.0} BPM, first beat at {:.3}s",
            self.config.tempo_bpm,
            self.next_event_time
        );
        true
    }

    /// Halt scheduling. Beats already committed to the sink still play.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Music stopped after {} beats", self.beats_scheduled);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds per beat
    pub fn beat_period(&self) -> f64 {
        self.config.beat_period()
    }

    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    pub fn beat_index(&self) -> u8 {
        self.beat_index
    }

    pub fn beats_scheduled(&self) -> u64 {
        self.beats_scheduled
    }

    /// Collect every beat due before `audio_now + schedule_ahead_secs`.
    ///
    /// Beats on the grid that already lie behind the clock (the wake-up ran
    /// late) are not dropped: they are spread over the start of the window,
    /// ahead of the next on-grid beat, so none is stamped in the past. The
    /// grid itself keeps accumulating one period per beat.
    pub fn wake(&mut self, audio_now: f64, out: &mut Vec<Beat>) -> usize {
        if !self.running || !audio_now.is_finite() {
            return 0;
        }

        let horizon = audio_now + self.config.schedule_ahead_secs;
        let period = self.beat_period();
        let mut count = 0usize;

        let mut stale = 0usize;
        let mut on_grid = self.next_event_time;
        while on_grid < audio_now {
            stale += 1;
            on_grid += period;
        }
        if stale > 0 {
            log::warn!(
                "Beat scheduler {:.3}s behind the audio clock, catching up {} beats",
                audio_now - self.next_event_time,
                stale
            );
            let spacing = (on_grid.min(horizon) - audio_now) / stale as f64;
            for k in 0..stale {
                self.commit(audio_now + k as f64 * spacing, out);
            }
            self.next_event_time = on_grid;
            count += stale;
        }

        while self.next_event_time < horizon {
            let time = self.next_event_time;
            self.commit(time, out);
            self.next_event_time += period;
            count += 1;
        }
        count
    }

    fn commit(&mut self, time: f64, out: &mut Vec<Beat>) {
        out.push(Beat {
            index: self.beat_index,
            time,
        });
        self.beat_index = (self.beat_index + 1) % BEATS_PER_MEASURE;
        self.beats_scheduled += 1;
    }

    /// One wake-up against a sink's clock. No clock, no music.
    pub fn wake_into(&mut self, sink: &mut dyn AudioSink) -> usize {
        let Some(audio_now) = sink.current_time() else {
            return 0;
        };

        let mut beats = Vec::new();
        let count = self.wake(audio_now, &mut beats);
        for beat in &beats {
            for voice in beat.voices() {
                sink.schedule(voice, beat.time);
            }
        }
        count
    }
}
