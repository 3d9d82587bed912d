//! Lifecycle coordinator
//!
//! Owns the simulation context and the interval scheduler, and reacts to UI
//! transitions: explore start, overlay open/close, defeat, acknowledgment
//! and stop. The frame loop and both timers share one cancel token, so a
//! single `stop` tears everything down.

use crate::consts::{
    HP_REGEN_AMOUNT, INITIAL_ENEMY_COUNT, MANA_REGEN_AMOUNT, REGEN_INTERVAL_MS,
    RESPAWN_INTERVAL_MS,
};
use crate::persistence::{DEFAULT_NAME, SaveRecord};
use crate::platform::InputAction;
use crate::renderer::{Surface, draw_scene};
use crate::scheduler::{CancelToken, Scheduler, TaskId, TaskKind};
use crate::settings::Difficulty;
use crate::sim::{
    self, AbilityOutcome, ClassKind, GameState, Player, PresentationSink, RunMode, TickInput,
};

/// What the frontend must do after an explore start
#[derive(Debug, Clone, Default)]
pub struct ExploreStart {
    /// First start: attach input listeners
    pub bind_inputs: bool,
    /// Set when a new frame loop was started. The loop passes it to every
    /// `frame` call and stops once it is cancelled.
    pub loop_token: Option<CancelToken>,
}

impl ExploreStart {
    /// A first frame needs to be requested
    pub fn start_loop(&self) -> bool {
        self.loop_token.is_some()
    }
}

pub struct Coordinator {
    state: GameState,
    scheduler: Scheduler,
    /// Shared by the frame loop and both timers
    run_token: Option<CancelToken>,
    regen_task: Option<TaskId>,
    respawn_task: Option<TaskId>,
    inputs_bound: bool,
    warned_no_surface: bool,
}

impl Coordinator {
    pub fn new(seed: u64, difficulty: Difficulty, now: f64) -> Self {
        Self::with_state(GameState::new(seed, difficulty), now)
    }

    /// Wrap an existing context (tests use scripted dice)
    pub fn with_state(state: GameState, now: f64) -> Self {
        Self {
            state,
            scheduler: Scheduler::new(now),
            run_token: None,
            regen_task: None,
            respawn_task: None,
            inputs_bound: false,
            warned_no_surface: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn mode(&self) -> RunMode {
        self.state.mode
    }

    pub fn inputs_bound(&self) -> bool {
        self.inputs_bound
    }

    /// True while the frame callback should keep rescheduling itself
    pub fn loop_running(&self) -> bool {
        self.run_token.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// "Explore started". Safe to call repeatedly.
    pub fn explore_started(&mut self, now: f64, sink: &mut dyn PresentationSink) -> ExploreStart {
        if self.state.mode == RunMode::Defeated {
            log::warn!("Explore requested before defeat was acknowledged");
            return ExploreStart::default();
        }
        self.advance_timers(now, sink);

        if self.state.player.is_none() {
            log::info!("No character loaded, creating default {}", DEFAULT_NAME);
            self.state.player = Some(Player::new(DEFAULT_NAME, ClassKind::default()));
        }

        let bind_inputs = !self.inputs_bound;
        self.inputs_bound = true;

        if self.state.enemies.is_empty() {
            for _ in 0..INITIAL_ENEMY_COUNT {
                self.state.spawn_enemy_random();
            }
        }

        if self.state.mode != RunMode::Exploring {
            log::info!("Exploring ({} enemies)", self.state.enemies.len());
        }
        self.state.mode = RunMode::Exploring;

        let loop_token = if self.loop_running() {
            None
        } else {
            let token = CancelToken::new();
            self.run_token = Some(token.clone());
            log::info!("Frame loop started");
            Some(token)
        };
        let token = self.run_token.clone().unwrap_or_default();

        if !self.task_live(self.regen_task) {
            self.regen_task = Some(self.scheduler.every(
                TaskKind::Regenerate,
                REGEN_INTERVAL_MS,
                token.clone(),
            ));
        }
        if !self.task_live(self.respawn_task) {
            self.respawn_task = Some(self.scheduler.every(
                TaskKind::Respawn,
                RESPAWN_INTERVAL_MS,
                token,
            ));
        }

        if let Some(player) = self.state.player.as_ref() {
            sink.bars_changed(player.hp, player.mana);
        }

        ExploreStart {
            bind_inputs,
            loop_token,
        }
    }

    fn task_live(&self, task: Option<TaskId>) -> bool {
        task.is_some_and(|id| self.scheduler.is_live(id))
    }

    /// An overlay (inventory, menu) opened over the playfield
    pub fn open_overlay(&mut self) {
        if self.state.mode == RunMode::Exploring {
            self.state.mode = RunMode::Paused;
            log::info!("Paused");
        }
    }

    pub fn close_overlay(&mut self) {
        if self.state.mode == RunMode::Paused {
            self.state.mode = RunMode::Exploring;
            log::info!("Resumed");
        }
    }

    /// Whether `token` belongs to the loop that is currently running
    pub fn owns_loop(&self, token: &CancelToken) -> bool {
        !token.is_cancelled() && self.run_token.as_ref().is_some_and(|t| t.same_as(token))
    }

    /// One frame callback on behalf of the loop holding `token`.
    /// Returns whether that loop should be rescheduled.
    pub fn frame(
        &mut self,
        token: &CancelToken,
        input: &TickInput,
        now: f64,
        sink: &mut dyn PresentationSink,
        surface: Option<&mut dyn Surface>,
    ) -> bool {
        if !self.owns_loop(token) {
            return false;
        }

        sim::tick(&mut self.state, input, now, sink);
        if self.state.mode == RunMode::Defeated {
            self.halt_timers();
        }

        match surface {
            Some(surface) => draw_scene(surface, &self.state),
            None if !self.warned_no_surface => {
                log::warn!("No render surface, frame not drawn");
                self.warned_no_surface = true;
            }
            None => {}
        }
        true
    }

    /// Cancel regen and respawn, keeping the frame loop alive
    fn halt_timers(&mut self) {
        for task in [self.regen_task.take(), self.respawn_task.take()]
            .into_iter()
            .flatten()
        {
            if self.scheduler.cancel(task) {
                log::info!("Timers stopped after defeat");
            }
        }
    }

    /// Advance virtual time and run due tasks. Returns the tasks that fired.
    pub fn advance_timers(&mut self, now: f64, sink: &mut dyn PresentationSink) -> Vec<TaskKind> {
        let fired = self.scheduler.advance_to(now);
        for kind in &fired {
            match kind {
                TaskKind::Regenerate => self.regenerate(sink),
                TaskKind::Respawn => self.respawn(),
            }
        }
        fired
    }

    fn regenerate(&mut self, sink: &mut dyn PresentationSink) {
        if !self.state.is_exploring() {
            return;
        }
        if let Some(player) = self.state.player.as_mut() {
            if !player.is_alive() {
                return;
            }
            player.hp.regenerate(HP_REGEN_AMOUNT);
            player.mana.regenerate(MANA_REGEN_AMOUNT);
            sink.bars_changed(player.hp, player.mana);
        }
    }

    fn respawn(&mut self) {
        if self.state.is_exploring() && self.state.enemies.is_empty() {
            let id = self.state.spawn_enemy_random();
            log::info!("Respawned enemy {}", id);
        }
    }

    /// Route a one-shot input to the ability resolver
    pub fn handle_action(
        &mut self,
        action: InputAction,
        now: f64,
        sink: &mut dyn PresentationSink,
    ) -> AbilityOutcome {
        match action {
            InputAction::Melee => sim::melee_attack(&mut self.state, now, sink),
            InputAction::Spell => sim::cast_spell(&mut self.state, now, sink),
            InputAction::Heal => sim::heal(&mut self.state, now, sink),
            InputAction::Ranged { target } => sim::ranged_attack(&mut self.state, target, now, sink),
        }
    }

    /// Defeat screen dismissed: fresh character of the same class, empty field
    pub fn acknowledge_defeat(&mut self) -> bool {
        if self.state.mode != RunMode::Defeated {
            return false;
        }
        if let Some(old) = self.state.player.take() {
            self.state.player = Some(Player::new(old.name, old.class));
        }
        self.state.clear_field();
        self.state.mode = RunMode::Idle;
        log::info!("Defeat acknowledged, character reset");
        true
    }

    /// Stop the frame loop and both timers. Idempotent.
    pub fn stop(&mut self) {
        let Some(token) = self.run_token.take() else {
            return;
        };
        token.cancel();
        self.regen_task = None;
        self.respawn_task = None;
        if matches!(self.state.mode, RunMode::Exploring | RunMode::Paused) {
            self.state.mode = RunMode::Idle;
        }
        log::info!("Frame loop stopped");
    }

    /// Replace the character with a saved one
    pub fn load_record(&mut self, record: &SaveRecord) {
        self.state.player = Some(record.to_player());
        self.state.difficulty = record.difficulty;
        log::info!("Loaded {} (level {})", record.name, record.level);
    }

    /// Snapshot the current character, if any
    pub fn save_record(&self, timestamp: f64) -> Option<SaveRecord> {
        let player = self.state.player.as_ref()?;
        Some(SaveRecord::capture(player, self.state.difficulty, timestamp))
    }
}
