//! Game loop orchestrator
//!
//! Owns one [`Session`] per game. Two independent schedules drive it:
//! - [`Game::tick`], once per rendered frame, runs the simulation and fires
//!   hit/miss bursts for what happened during the tick
//! - [`Game::wake_music`] / [`Game::poll_music`], on the scheduler's own
//!   short timer, commits upcoming beats against the audio clock
//!
//! The two share no mutable state; the simulation only ever sends
//! fire-and-forget requests to the audio sink.

use serde::{Deserialize, Serialize};

use crate::audio::{AudioSink, BeatScheduler, SoundEffect};
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::platform::WakeTimer;
use crate::sim::{self, GameEvent, GameState, ScoreState, Snapshot, TickInput};

/// Top-level phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No session; ticks are ignored
    Menu,
    Playing,
}

/// What a tick produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    /// Score after the tick
    pub score: ScoreState,
    /// True if the score state differs from before the tick
    pub score_changed: bool,
}

/// Everything owned by one game, built fresh on every start
#[derive(Debug)]
struct Session {
    state: GameState,
    scheduler: BeatScheduler,
    wake_timer: WakeTimer,
}

#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    phase: GamePhase,
    session: Option<Session>,
    /// Score of the most recently stopped session, for the menu screen
    last_score: Option<ScoreState>,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            phase: GamePhase::Menu,
            session: None,
            last_score: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Start a new game.
    ///
    /// The config is validated here; an invalid one leaves the game in the
    /// menu. `seed` is used unless the config pins one. Starting while a game
    /// is running changes nothing.
    pub fn start(
        &mut self,
        seed: u64,
        host_now: f64,
        audio: &mut dyn AudioSink,
    ) -> Result<(), ConfigError> {
        if self.session.is_some() {
            log::debug!("start() ignored: game already running");
            return Ok(());
        }
        self.config.validate()?;

        let seed = self.config.seed.unwrap_or(seed);
        let mut session = Session {
            state: GameState::new(self.config.clone(), seed),
            scheduler: BeatScheduler::new(self.config.music.clone()),
            wake_timer: WakeTimer::new(self.config.music.lookahead_ms),
        };

        match audio.current_time() {
            Some(audio_now) => {
                session.scheduler.start(audio_now);
                session.wake_timer.arm(host_now);
            }
            None => log::warn!("No audio clock available - music disabled"),
        }

        log::info!("Game started (seed {seed})");
        self.session = Some(session);
        self.phase = GamePhase::Playing;
        Ok(())
    }

    /// End the current game. Pending wake-ups are cancelled; beats already
    /// handed to the audio sink are left to finish.
    pub fn stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.scheduler.stop();
            session.wake_timer.cancel();
            let score = session.state.score;
            log::info!(
                "Game stopped: score {}, best combo {}",
                score.score,
                score.max_combo
            );
            self.last_score = Some(score);
        }
        self.phase = GamePhase::Menu;
    }

    /// Run one simulation tick and fire feedback bursts for its hits and
    /// misses. Does nothing outside a game.
    pub fn tick(&mut self, input: &TickInput, audio: &mut dyn AudioSink) -> TickReport {
        let Some(session) = self.session.as_mut() else {
            return TickReport::default();
        };

        let before = session.state.score;
        let mut events = Vec::new();
        sim::tick(&mut session.state, input, &mut events);

        for event in &events {
            match event {
                GameEvent::Hit { .. } => audio.play(SoundEffect::Hit),
                GameEvent::Missed { .. } => audio.play(SoundEffect::Miss),
                GameEvent::Spawned { .. } => {}
            }
        }

        TickReport {
            events,
            score: session.state.score,
            score_changed: session.state.score != before,
        }
    }

    /// Scheduler wake-up body, for hosts with their own interval timer.
    /// Returns the number of beats committed.
    pub fn wake_music(&mut self, audio: &mut dyn AudioSink) -> usize {
        match self.session.as_mut() {
            Some(session) => session.scheduler.wake_into(audio),
            None => 0,
        }
    }

    /// Scheduler wake-up for polled hosts: runs only when the session's
    /// wake timer is due at `host_now`.
    pub fn poll_music(&mut self, host_now: f64, audio: &mut dyn AudioSink) -> usize {
        let Some(session) = self.session.as_mut() else {
            return 0;
        };
        if !session.wake_timer.poll(host_now) {
            return 0;
        }
        session.scheduler.wake_into(audio)
    }

    /// Wake-up period for host timers (ms)
    pub fn music_lookahead_ms(&self) -> f64 {
        self.config.music.lookahead_ms
    }

    /// Live simulation state of the running game
    pub fn state(&self) -> Option<&GameState> {
        self.session.as_ref().map(|session| &session.state)
    }

    /// Copy of the live state for rendering
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.session
            .as_ref()
            .map(|session| Snapshot::capture(&session.state))
    }

    /// Score of the running game, zero in the menu
    pub fn score(&self) -> ScoreState {
        self.session
            .as_ref()
            .map(|session| session.state.score)
            .unwrap_or_default()
    }

    /// Score of the last finished game
    pub fn last_score(&self) -> Option<ScoreState> {
        self.last_score
    }

    pub fn music_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.scheduler.is_running())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{NullAudio, OfflineAudio, Voice};
    use crate::sim::{Autopilot, HandPose, Handedness};
    use glam::Vec3;

    const DT: f64 = 1.0 / 60.0;

    fn frame(now: f64, poses: Vec<HandPose>) -> TickInput {
        TickInput {
            now,
            dt: DT as f32,
            poses,
        }
    }

    #[test]
    fn test_invalid_config_rejected_at_start() {
        let mut game = Game::new(GameConfig {
            target_speed: 0.0,
            ..Default::default()
        });
        let result = game.start(1, 0.0, &mut NullAudio);
        assert!(result.is_err());
        assert_eq!(game.phase(), GamePhase::Menu);
        assert!(game.snapshot().is_none());
    }

    #[test]
    fn test_menu_ignores_ticks() {
        let mut game = Game::new(GameConfig::default());
        let report = game.tick(&frame(0.0, vec![]), &mut NullAudio);
        assert_eq!(report, TickReport::default());
    }

    #[test]
    fn test_gameplay_without_audio() {
        let mut game = Game::new(GameConfig::default());
        game.start(3, 0.0, &mut NullAudio).unwrap();
        assert!(game.is_playing());
        assert!(!game.music_running());

        for k in 0..600 {
            game.tick(&frame(k as f64 * DT, vec![]), &mut NullAudio);
            assert_eq!(game.poll_music(k as f64 * DT, &mut NullAudio), 0);
        }

        // Targets kept spawning and passing unhit
        let snapshot = game.snapshot().unwrap();
        assert!(!snapshot.targets.is_empty());
        assert_eq!(game.score().score, 0);
    }

    #[test]
    fn test_hit_and_miss_bursts() {
        let mut game = Game::new(GameConfig {
            lane_width: 0.0,
            height_min: 1.2,
            height_max: 1.2,
            ..Default::default()
        });
        let mut audio = OfflineAudio::default();
        game.start(1, 0.0, &mut audio).unwrap();

        let hand = HandPose::new(Handedness::Right, Vec3::new(0.0, 1.2, 0.5));
        let mut changed = 0;
        for k in 0..240 {
            // Guard up for the first two seconds, then drop it
            let poses = if k < 120 { vec![hand] } else { vec![] };
            let report = game.tick(&frame(k as f64 * DT, poses), &mut audio);
            if report.score_changed {
                changed += 1;
            }
        }

        // First target is punched, the next three fly past
        assert_eq!(audio.played_count(SoundEffect::Hit), 1);
        assert_eq!(audio.played_count(SoundEffect::Miss), 3);
        // Only the hit and the combo-breaking miss change the score state
        assert_eq!(changed, 2);
        assert_eq!(game.score().combo, 0);
        assert_eq!(game.score().max_combo, 1);
    }

    #[test]
    fn test_misses_without_combo_leave_score_unchanged() {
        let mut game = Game::new(GameConfig::default());
        let mut audio = OfflineAudio::default();
        game.start(4, 0.0, &mut audio).unwrap();

        let mut misses = 0;
        for k in 0..300 {
            let report = game.tick(&frame(k as f64 * DT, vec![]), &mut audio);
            misses += report
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::Missed { .. }))
                .count();
            assert!(!report.score_changed);
        }
        assert!(misses >= 2);
        assert_eq!(audio.played_count(SoundEffect::Miss), misses);
    }

    #[test]
    fn test_lost_glove_is_hidden_in_snapshot() {
        let mut game = Game::new(GameConfig::default());
        game.start(2, 0.0, &mut NullAudio).unwrap();

        let hand = HandPose::new(Handedness::Right, Vec3::new(0.3, 1.2, 0.5));
        game.tick(&frame(0.0, vec![hand]), &mut NullAudio);
        let tracked = game.snapshot().unwrap();
        assert!(tracked.hands.right.present);
        assert_eq!(tracked.hands.right.position, hand.position);

        game.tick(&frame(DT, vec![]), &mut NullAudio);
        let lost = game.snapshot().unwrap();
        assert!(!lost.hands.right.present);
        assert!(!lost.hands.left.present);
    }

    #[test]
    fn test_music_runs_on_its_own_timer() {
        let mut game = Game::new(GameConfig::default());
        let mut audio = OfflineAudio::default();
        game.start(1, 0.0, &mut audio).unwrap();
        assert!(game.music_running());

        // Host polls every 5ms; audio clock runs in lockstep
        let mut host_now = 0.0;
        let mut beats = 0;
        for _ in 0..1200 {
            beats += game.poll_music(host_now, &mut audio);
            host_now += 0.005;
            audio.advance(0.005);
        }

        assert!(beats >= 9);
        let kicks: Vec<f64> = audio
            .scheduled
            .iter()
            .filter(|s| s.voice == Voice::Kick)
            .map(|s| s.at)
            .collect();
        for pair in kicks.windows(2) {
            assert!((pair[1] - pair[0] - 0.6).abs() < 1e-9);
        }
    }

    #[test]
    fn test_stop_cancels_wakeups_and_keeps_committed_beats() {
        let mut game = Game::new(GameConfig::default());
        let mut audio = OfflineAudio::default();
        game.start(1, 0.0, &mut audio).unwrap();

        audio.advance(0.05);
        assert_eq!(game.wake_music(&mut audio), 1);
        let committed = audio.scheduled.len();

        game.stop();
        assert_eq!(game.phase(), GamePhase::Menu);
        audio.advance(5.0);
        assert_eq!(game.wake_music(&mut audio), 0);
        assert_eq!(game.poll_music(5.0, &mut audio), 0);
        assert_eq!(audio.scheduled.len(), committed);
    }

    #[test]
    fn test_restart_resets_state() {
        let mut game = Game::new(GameConfig::default());
        let mut audio = OfflineAudio::default();
        let mut pilot = Autopilot::new(1, 0.0);

        game.start(9, 0.0, &mut audio).unwrap();
        for k in 0..600 {
            let poses = game
                .state()
                .map(|state| pilot.poses(state))
                .unwrap_or_default();
            game.tick(&frame(k as f64 * DT, poses), &mut audio);
        }
        let first = game.score();
        assert!(first.score > 0);

        game.stop();
        assert_eq!(game.last_score(), Some(first));
        assert_eq!(game.score(), ScoreState::default());

        game.start(9, 100.0, &mut audio).unwrap();
        assert_eq!(game.score(), ScoreState::default());
        let report = game.tick(&frame(100.0, vec![]), &mut audio);
        assert!(matches!(
            report.events[0],
            GameEvent::Spawned {
                id: sim::TargetId(1),
                ..
            }
        ));
    }

    #[test]
    fn test_start_while_playing_is_noop() {
        let mut game = Game::new(GameConfig::default());
        let mut audio = OfflineAudio::default();
        game.start(1, 0.0, &mut audio).unwrap();
        game.tick(&frame(0.0, vec![]), &mut audio);
        game.start(2, 1.0, &mut audio).unwrap();
        assert_eq!(game.snapshot().unwrap().targets.len(), 1);
    }
}
