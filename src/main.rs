//! XR Boxer entry point
//!
//! Native: headless demo run with the autopilot on a simulated audio clock.
//! Web: pointer-driven right glove, Web Audio soundtrack and a DOM HUD.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use xr_boxer::audio::WebAudio;
    use xr_boxer::platform::HostClock;
    use xr_boxer::sim::{HandPose, Handedness, TickInput};
    use xr_boxer::{Game, GameConfig, Settings};

    /// Longest frame delta fed to the simulation (s)
    const MAX_FRAME_DT: f64 = 0.1;
    /// Glove height at the bottom and top of the canvas
    const GLOVE_HEIGHT_RANGE: (f32, f32) = (0.6, 2.0);

    /// Running soundtrack wake-up timer
    struct MusicInterval {
        id: i32,
        _callback: Closure<dyn FnMut()>,
    }

    /// Page-wide app state
    struct App {
        game: Game,
        audio: WebAudio,
        clock: HostClock,
        last_now: Option<f64>,
        /// Right glove from the pointer, while it is over the canvas
        glove: Option<Vec3>,
        music: Option<MusicInterval>,
    }

    impl App {
        fn new(config: GameConfig, seed: u64) -> Self {
            Self {
                game: Game::new(config),
                audio: WebAudio::new(Settings::load(), seed),
                clock: HostClock::new(),
                last_now: None,
                glove: None,
                music: None,
            }
        }

        /// Map a canvas position onto the strike plane
        fn pointer_to_glove(&self, x: f32, y: f32, w: f32, h: f32) -> Vec3 {
            let config = self.game.config();
            let u = (x / w.max(1.0)).clamp(0.0, 1.0);
            let v = (y / h.max(1.0)).clamp(0.0, 1.0);
            let reach = config.lane_width + config.hit_radius;
            let (low, high) = GLOVE_HEIGHT_RANGE;
            Vec3::new(
                (u * 2.0 - 1.0) * reach,
                high - v * (high - low),
                config.hit_depth,
            )
        }

        fn frame(&mut self) {
            let now = self.clock.now();
            let dt = self
                .last_now
                .map(|last| (now - last).clamp(0.0, MAX_FRAME_DT))
                .unwrap_or(0.0);
            self.last_now = Some(now);

            let poses = self
                .glove
                .map(|position| vec![HandPose::new(Handedness::Right, position)])
                .unwrap_or_default();
            let input = TickInput {
                now,
                dt: dt as f32,
                poses,
            };
            let report = self.game.tick(&input, &mut self.audio);
            if report.score_changed {
                self.update_hud();
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let score = self.game.score();

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&score.score.to_string()));
            }

            // Combo only shown from 2 up
            if let Some(el) = document.get_element_by_id("hud-combo") {
                if score.combo > 1 {
                    let _ = el.set_attribute("class", "hud-item");
                    if let Some(val) = document.query_selector("#hud-combo .hud-value").ok().flatten() {
                        val.set_text_content(Some(&score.combo.to_string()));
                    }
                    if let Some(mult) = document.query_selector("#hud-combo .multiplier").ok().flatten() {
                        mult.set_text_content(Some(&format!("x{:.1}", score.multiplier())));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            if let Some(el) = document.get_element_by_id("menu") {
                let class = if self.game.is_playing() { "hidden" } else { "" };
                let _ = el.set_attribute("class", class);
            }
            if let Some(last) = self.game.last_score() {
                if let Some(el) = document.get_element_by_id("final-score") {
                    el.set_text_content(Some(&last.score.to_string()));
                }
                if let Some(el) = document.get_element_by_id("final-combo") {
                    el.set_text_content(Some(&last.max_combo.to_string()));
                }
            }
        }
    }

    fn start_game(app: &Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut a = app.borrow_mut();
        if a.game.is_playing() {
            return;
        }
        a.audio.resume();

        let seed = js_sys::Date::now() as u64;
        let host_now = a.clock.now();
        let App { game, audio, .. } = &mut *a;
        if let Err(e) = game.start(seed, host_now, audio) {
            log::error!("Cannot start game: {e}");
            return;
        }
        // First wake-up right away, then on the lookahead period
        game.wake_music(audio);
        let period_ms = game.music_lookahead_ms().round() as i32;

        let handle = app.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            let mut a = handle.borrow_mut();
            let App { game, audio, .. } = &mut *a;
            game.wake_music(audio);
        });
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            period_ms,
        ) {
            Ok(id) => {
                a.music = Some(MusicInterval {
                    id,
                    _callback: callback,
                })
            }
            Err(_) => log::warn!("setInterval failed - music disabled"),
        }

        a.last_now = None;
        a.update_hud();
    }

    fn stop_game(app: &Rc<RefCell<App>>) {
        let mut a = app.borrow_mut();
        if !a.game.is_playing() {
            return;
        }
        a.game.stop();
        if let Some(music) = a.music.take() {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(music.id);
            }
        }
        a.glove = None;
        a.update_hud();
    }

    /// Flip the mute preference and persist it
    fn toggle_mute(app: &Rc<RefCell<App>>) {
        let mut a = app.borrow_mut();
        let mut settings = a.audio.settings().clone();
        settings.muted = !settings.muted;
        settings.save();
        log::info!("Audio {}", if settings.muted { "muted" } else { "unmuted" });
        a.audio.set_settings(settings);
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("XR Boxer starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(GameConfig::default(), seed)));
        app.borrow().update_hud();

        setup_input_handlers(&canvas, app.clone())?;
        setup_focus_handlers(app.clone())?;

        request_animation_frame(app);

        log::info!("XR Boxer running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        // Pointer drives the right glove
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let w = canvas_clone.client_width() as f32;
                let h = canvas_clone.client_height() as f32;
                let glove = a.pointer_to_glove(event.offset_x() as f32, event.offset_y() as f32, w, h);
                a.glove = Some(glove);
            });
            canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pointer left the canvas: glove untracked
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().glove = None;
            });
            canvas.add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Click starts a game (also unlocks audio)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                start_game(&app);
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().ok_or("no window")?;
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    " " | "Enter" => start_game(&app),
                    "Escape" => stop_game(&app),
                    "m" | "M" => toggle_mute(&app),
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_focus_handlers(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Tab hidden: frames stop arriving, so end the game
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    log::info!("Tab hidden - stopping game");
                    stop_game(&app);
                }
            });
            document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Window blur/focus: suspend output if the player asked for it
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut a = app.borrow_mut();
                if a.audio.settings().mute_on_blur {
                    a.audio.suspend();
                }
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().audio.resume();
            });
            window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>) {
        app.borrow_mut().frame();
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use serde::Serialize;

    use xr_boxer::audio::{OfflineAudio, SoundEffect, Voice};
    use xr_boxer::sim::{Autopilot, GameEvent, ScoreState, Snapshot, TickInput};
    use xr_boxer::{ConfigError, Game, GameConfig, Settings};

    /// Length of the demo run (s)
    const RUN_SECS: f64 = 60.0;
    /// Nominal headset frame time (s)
    const FRAME_DT: f64 = 1.0 / 72.0;
    /// Share of targets the autopilot lets through
    const WHIFF_CHANCE: f32 = 0.15;
    const DEFAULT_SEED: u64 = 0xB0CE;

    /// Printed at the end of a run
    #[derive(Debug, Serialize)]
    struct RunSummary {
        seed: u64,
        duration_secs: f64,
        frames: u64,
        score: ScoreState,
        hits: usize,
        misses: usize,
        beats: usize,
        final_state: Option<Snapshot>,
    }

    fn load_config() -> Result<GameConfig, ConfigError> {
        match std::env::args().nth(1) {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::Parse(format!("{path}: {e}")))?;
                log::info!("Loaded config from {path}");
                GameConfig::from_json(&json)
            }
            None => Ok(GameConfig::default()),
        }
    }

    pub fn run() -> Result<(), ConfigError> {
        let config = load_config()?;
        let seed = config.seed.unwrap_or(DEFAULT_SEED);

        let mut game = Game::new(config);
        let mut audio = OfflineAudio::new(Settings::load());
        let mut pilot = Autopilot::new(seed, WHIFF_CHANCE);
        let mut jitter = Pcg32::seed_from_u64(seed.wrapping_add(1));

        game.start(seed, 0.0, &mut audio)?;

        let mut now = 0.0;
        let mut frames = 0u64;
        while now < RUN_SECS {
            let dt = FRAME_DT * jitter.random_range(0.8..1.3);
            now += dt;
            audio.advance(dt);
            frames += 1;

            game.poll_music(now, &mut audio);

            let poses = game
                .state()
                .map(|state| pilot.poses(state))
                .unwrap_or_default();
            let input = TickInput {
                now,
                dt: dt as f32,
                poses,
            };
            let report = game.tick(&input, &mut audio);
            for event in &report.events {
                if let GameEvent::Hit { hand, points, .. } = event {
                    log::debug!("{hand:?} hit +{points} (combo {})", report.score.combo);
                }
            }
        }

        let final_state = game.snapshot();
        let score = game.score();
        game.stop();

        let summary = RunSummary {
            seed,
            duration_secs: now,
            frames,
            score,
            hits: audio.played_count(SoundEffect::Hit),
            misses: audio.played_count(SoundEffect::Miss),
            beats: audio
                .scheduled
                .iter()
                .filter(|s| s.voice == Voice::Kick)
                .count(),
            final_state,
        };
        log::info!(
            "Run finished: {} hits, {} misses, {} beats, score {}",
            summary.hits,
            summary.misses,
            summary.beats,
            summary.score.score
        );

        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to serialize summary: {e}"),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("XR Boxer (native) starting...");

    if let Err(e) = headless::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
