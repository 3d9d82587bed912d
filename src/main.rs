//! Canvas Quest entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use canvas_quest::Coordinator;
    use canvas_quest::persistence::SaveRecord;
    use canvas_quest::platform::{HeldKeys, InputAction, canvas_to_playfield, key_role, now_ms};
    use canvas_quest::renderer::{CanvasSurface, FloatingNumbers, Surface};
    use canvas_quest::scheduler::CancelToken;
    use canvas_quest::settings::Settings;
    use canvas_quest::sim::{EventLog, FeedbackEvent, ResourcePool, RunMode};

    /// Save slot used for auto-save
    const SAVE_SLOT: u32 = 0;

    /// Interval pump period for regen/respawn timers
    const TIMER_PUMP_MS: i32 = 250;

    /// Game instance holding all state
    struct Game {
        coordinator: Coordinator,
        settings: Settings,
        surface: Option<CanvasSurface>,
        held: HeldKeys,
        events: EventLog,
        floats: FloatingNumbers,
        dpr: f64,
        last_mode: RunMode,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            Self {
                coordinator: Coordinator::new(seed, settings.difficulty, now_ms()),
                settings,
                surface: None,
                held: HeldKeys::default(),
                events: EventLog::new(),
                floats: FloatingNumbers::new(),
                dpr: 1.0,
                last_mode: RunMode::Idle,
            }
        }

        /// One animation frame for the loop holding `token`.
        /// Returns whether to request another.
        fn frame(&mut self, token: &CancelToken, time: f64) -> bool {
            if let Some(surface) = self.surface.as_ref() {
                surface.resize(self.dpr);
                surface.begin_frame();
            }

            let input = self.held.tick_input();
            let running = self.coordinator.frame(
                token,
                &input,
                time,
                &mut self.events,
                self.surface.as_mut().map(|s| s as &mut dyn Surface),
            );

            self.drain_feedback();
            self.floats.update();
            if self.settings.damage_numbers {
                if let Some(surface) = self.surface.as_mut() {
                    self.floats.draw(surface);
                }
            }

            // Auto-save when entering pause
            let mode = self.coordinator.mode();
            if mode != self.last_mode {
                if mode == RunMode::Paused {
                    self.save_game();
                }
                self.last_mode = mode;
            }
            self.update_hud();
            running
        }

        /// Route recorded feedback to the floating numbers and DOM
        fn drain_feedback(&mut self) {
            let events: Vec<FeedbackEvent> = self.events.drain().collect();
            for event in &events {
                self.floats.ingest(event);
                match event {
                    FeedbackEvent::BarsChanged { hp, mana } => update_bars(*hp, *mana),
                    FeedbackEvent::PlayerDefeated => show("defeat", true),
                    _ => {}
                }
            }
        }

        fn action(&mut self, action: InputAction) {
            let outcome = self
                .coordinator
                .handle_action(action, now_ms(), &mut self.events);
            log::debug!("{:?} -> {:?}", action, outcome);
        }

        fn pump_timers(&mut self) {
            self.coordinator.advance_timers(now_ms(), &mut self.events);
        }

        fn toggle_overlay(&mut self) {
            if self.coordinator.mode() == RunMode::Paused {
                self.coordinator.close_overlay();
            } else {
                self.coordinator.open_overlay();
                self.held.release_all();
            }
            show("pause-menu", self.coordinator.mode() == RunMode::Paused);
        }

        fn save_game(&self) {
            let Some(record) = self.coordinator.save_record(js_sys::Date::now()) else {
                return;
            };
            if let Err(e) = record.save_slot(SAVE_SLOT) {
                log::warn!("Save failed: {e}");
            }
        }

        /// Update HUD text in DOM
        fn update_hud(&self) {
            let state = self.coordinator.state();
            if let Some(player) = state.player.as_ref() {
                set_text("hud-class", player.class.display_name());
                set_text("hud-level", &player.level.to_string());
                set_text(
                    "hud-xp",
                    &format!("{}/{}", player.experience, player.experience_to_next),
                );
            }
            set_text("hud-kills", &state.kills.to_string());
        }
    }

    fn document() -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn show(id: &str, visible: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Mirror pools into the DOM bars
    fn update_bars(hp: ResourcePool, mana: ResourcePool) {
        let Some(document) = document() else {
            return;
        };
        for (name, pool) in [("hp", hp), ("mana", mana)] {
            if let Some(fill) = document.get_element_by_id(&format!("{name}-bar-fill")) {
                let _ = fill.set_attribute("style", &format!("width: {:.1}%", pool.fraction() * 100.0));
            }
            set_text(
                &format!("{name}-text"),
                &format!("{:.0} / {:.0}", pool.current(), pool.max()),
            );
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Canvas Quest starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        show("loading", false);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let settings = Settings::load();
        // Store back with missing fields filled in
        settings.save();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));
        {
            let mut g = game.borrow_mut();
            g.dpr = window.device_pixel_ratio();
            g.surface = CanvasSurface::new(canvas.clone());
            if g.surface.is_none() {
                log::warn!("Canvas has no 2D context");
            }
            if let Some(record) = SaveRecord::load_slot(SAVE_SLOT) {
                g.coordinator.load_record(&record);
            }
        }

        log::info!("Game initialized with seed: {}", seed);

        setup_buttons(&canvas, game.clone());
        setup_timer_pump(game.clone());
        setup_auto_pause(game);

        log::info!("Canvas Quest ready");
    }

    fn explore(canvas: &HtmlCanvasElement, game: &Rc<RefCell<Game>>) {
        let start = {
            let mut g = game.borrow_mut();
            let Game {
                coordinator,
                events,
                ..
            } = &mut *g;
            coordinator.explore_started(now_ms(), events)
        };
        if start.bind_inputs {
            setup_input_handlers(canvas, game.clone());
        }
        if let Some(token) = start.loop_token {
            request_animation_frame(game.clone(), token);
        }
        show("title", false);
        show("hud", true);
    }

    fn setup_buttons(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("explore-btn") {
            let game = game.clone();
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                explore(&canvas, &game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("resume-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().toggle_overlay();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("defeat-ok-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                if game.borrow_mut().coordinator.acknowledge_defeat() {
                    show("defeat", false);
                    show("title", true);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down: held movement or one-shot ability
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut g = game.borrow_mut();
                if key == "Escape" {
                    g.toggle_overlay();
                    return;
                }
                let Some(role) = key_role(&g.settings.bindings, &key) else {
                    return;
                };
                event.prevent_default();
                if g.held.set(role, true) || event.repeat() {
                    return;
                }
                if let Some(action) = role.action() {
                    g.action(action);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if let Some(role) = key_role(&g.settings.bindings, &event.key()) {
                    g.held.set(role, false);
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer click: ranged attack toward the cursor
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let offset = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                let client = Vec2::new(
                    canvas_clone.client_width() as f32,
                    canvas_clone.client_height() as f32,
                );
                let target = canvas_to_playfield(offset, client);
                game.borrow_mut().action(InputAction::Ranged { target });
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Feed wall-clock time into the regen/respawn scheduler
    fn setup_timer_pump(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || {
            game.borrow_mut().pump_timers();
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            TIMER_PUMP_MS,
        );
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, token: CancelToken) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, token, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, token: CancelToken, time: f64) {
        let keep_going = game.borrow_mut().frame(&token, time);
        if keep_going {
            request_animation_frame(game, token);
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.settings.pause_on_blur && g.coordinator.mode() == RunMode::Exploring {
                        g.toggle_overlay();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.held.release_all();
                if g.settings.pause_on_blur && g.coordinator.mode() == RunMode::Exploring {
                    g.toggle_overlay();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Canvas Quest (native) starting...");
    log::info!("Native mode runs a headless demo - serve the wasm build for the real game");

    headless::run(42, 60 * 60);
}

/// Scripted exploration without a window
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use canvas_quest::Coordinator;
    use canvas_quest::Difficulty;
    use canvas_quest::platform::InputAction;
    use canvas_quest::renderer::{Color, FloatingNumbers, Surface};
    use canvas_quest::sim::{EventLog, FeedbackEvent, RunMode, TickInput};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Counts draw calls so the scene path is exercised
    #[derive(Default)]
    struct TallySurface {
        calls: u64,
    }

    impl Surface for TallySurface {
        fn fill_rect(&mut self, _pos: Vec2, _size: Vec2, _color: Color) {
            self.calls += 1;
        }
        fn fill_circle(&mut self, _center: Vec2, _radius: f32, _color: Color) {
            self.calls += 1;
        }
        fn stroke_circle(&mut self, _center: Vec2, _radius: f32, _width: f32, _color: Color) {
            self.calls += 1;
        }
        fn text(&mut self, _pos: Vec2, _text: &str, _size_px: f32, _color: Color) {
            self.calls += 1;
        }
    }

    /// Walk in a slow square, swinging and casting on a fixed rhythm
    fn scripted_input(frame: u64) -> TickInput {
        let leg = (frame / 90) % 4;
        TickInput {
            up: leg == 0,
            right: leg == 1,
            down: leg == 2,
            left: leg == 3,
            sprint: frame % 300 < 60,
        }
    }

    pub fn run(seed: u64, frames: u64) {
        let mut game = Coordinator::new(seed, Difficulty::Normal, 0.0);
        let mut events = EventLog::new();
        let mut floats = FloatingNumbers::new();
        let mut surface = TallySurface::default();
        let mut defeats = 0;

        let mut loop_token = game.explore_started(0.0, &mut events).loop_token.unwrap_or_default();

        for frame in 0..frames {
            let now = frame as f64 * FRAME_MS;
            game.advance_timers(now, &mut events);

            let nearest = game.state().player.as_ref().and_then(|p| {
                game.state()
                    .enemies
                    .iter()
                    .min_by(|a, b| a.pos.distance(p.pos).total_cmp(&b.pos.distance(p.pos)))
                    .map(|e| e.pos)
            });
            if frame % 30 == 0 {
                game.handle_action(InputAction::Melee, now, &mut events);
            }
            if frame % 20 == 0 {
                if let Some(target) = nearest {
                    game.handle_action(InputAction::Ranged { target }, now, &mut events);
                }
            }
            if frame % 120 == 0 {
                game.handle_action(InputAction::Spell, now, &mut events);
            }
            let low_hp = game
                .state()
                .player
                .as_ref()
                .is_some_and(|p| p.hp.fraction() < 0.5);
            if low_hp {
                game.handle_action(InputAction::Heal, now, &mut events);
            }

            game.frame(
                &loop_token,
                &scripted_input(frame),
                now,
                &mut events,
                Some(&mut surface as &mut dyn Surface),
            );

            for event in events.drain() {
                if matches!(event, FeedbackEvent::PlayerDefeated) {
                    defeats += 1;
                }
                floats.ingest(&event);
            }
            floats.update();
            floats.draw(&mut surface);

            if game.mode() == RunMode::Defeated {
                log::info!("Defeated at frame {}, restarting", frame);
                game.acknowledge_defeat();
                if let Some(token) = game.explore_started(now, &mut events).loop_token {
                    loop_token = token;
                }
            }
        }

        let state = game.state();
        if let Some(player) = state.player.as_ref() {
            log::info!(
                "Demo finished: {} frames, {} kills, {} defeats, {} level {}, hp {:.0}/{:.0}, mana {:.0}/{:.0}",
                state.frame,
                state.kills,
                defeats,
                player.class.display_name(),
                player.level,
                player.hp.current(),
                player.hp.max(),
                player.mana.current(),
                player.mana.max()
            );
        }
        log::info!("{} draw calls", surface.calls);

        if let Some(record) = game.save_record(0.0) {
            match record.to_json() {
                Ok(json) => log::debug!("Save record: {}", json),
                Err(e) => log::warn!("Could not encode save record: {e}"),
            }
        }
        game.stop();
    }
}
