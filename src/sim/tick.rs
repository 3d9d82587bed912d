//! One simulation step of the frame loop
//!
//! Called once per animation frame. Does nothing unless the run mode is
//! `Exploring` and a player exists; the caller still renders either way.

use glam::Vec2;

use super::ai;
use super::collision;
use super::feedback::PresentationSink;
use super::projectile;
use super::state::GameState;
use crate::clamp_to_playfield;
use crate::consts::SPRINT_MULTIPLIER;

/// Held inputs sampled for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
}

impl TickInput {
    /// Unit movement direction (screen coords, +Y down), zero when idle
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }
}

/// Advance the simulation by one frame. Returns false if the step was skipped.
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    now: f64,
    sink: &mut dyn PresentationSink,
) -> bool {
    if !state.is_exploring() || state.player.is_none() {
        return false;
    }

    state.frame += 1;

    ai::update_enemies(state, now, sink);
    collision::resolve_player_enemy(state);
    projectile::update(state, sink);

    if let Some(player) = state.player.as_mut() {
        let speed = if input.sprint {
            player.speed * SPRINT_MULTIPLIER
        } else {
            player.speed
        };
        player.pos = clamp_to_playfield(player.pos + input.direction() * speed, player.radius);
        sink.bars_changed(player.hp, player.mana);
    }

    state.check_defeat(sink);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Difficulty;
    use crate::sim::class::ClassKind;
    use crate::sim::feedback::{EventLog, FeedbackEvent, NullSink};
    use crate::sim::state::{Player, RunMode};

    fn exploring(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Difficulty::Normal);
        state.mode = RunMode::Exploring;
        state.player = Some(Player::new("Test", ClassKind::Warrior));
        state
    }

    #[test]
    fn test_tick_skipped_unless_exploring() {
        let mut state = exploring(1);
        state.mode = RunMode::Paused;
        state.spawn_enemy_at(Vec2::new(100.0, 100.0));
        let before = state.enemies[0].pos;

        assert!(!tick(&mut state, &TickInput::default(), 0.0, &mut NullSink));
        assert_eq!(state.enemies[0].pos, before);
        assert_eq!(state.frame, 0);

        state.mode = RunMode::Exploring;
        state.player = None;
        assert!(!tick(&mut state, &TickInput::default(), 0.0, &mut NullSink));
    }

    #[test]
    fn test_movement_and_sprint() {
        let mut state = exploring(1);
        let start = state.player.as_ref().unwrap().pos;
        let speed = state.player.as_ref().unwrap().speed;

        let walk = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &walk, 0.0, &mut NullSink);
        assert!((state.player.as_ref().unwrap().pos.x - (start.x + speed)).abs() < 1e-4);

        let sprint = TickInput {
            right: true,
            sprint: true,
            ..Default::default()
        };
        tick(&mut state, &sprint, 16.0, &mut NullSink);
        let expected = start.x + speed + speed * SPRINT_MULTIPLIER;
        assert!((state.player.as_ref().unwrap().pos.x - expected).abs() < 1e-4);
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let input = TickInput {
            up: true,
            left: true,
            ..Default::default()
        };
        assert!((input.direction().length() - 1.0).abs() < 1e-5);
        let cancel = TickInput {
            up: true,
            down: true,
            ..Default::default()
        };
        assert_eq!(cancel.direction(), Vec2::ZERO);
    }

    #[test]
    fn test_player_clamped_at_edge() {
        let mut state = exploring(1);
        state.player.as_mut().unwrap().pos = Vec2::new(PLAYER_RADIUS, 300.0);
        let input = TickInput {
            left: true,
            ..Default::default()
        };
        tick(&mut state, &input, 0.0, &mut NullSink);
        assert_eq!(state.player.as_ref().unwrap().pos.x, PLAYER_RADIUS);
    }

    #[test]
    fn test_tick_refreshes_bars() {
        let mut state = exploring(1);
        let mut log = EventLog::new();
        tick(&mut state, &TickInput::default(), 0.0, &mut log);
        assert_eq!(log.count(|e| matches!(e, FeedbackEvent::BarsChanged { .. })), 1);
    }

    #[test]
    fn test_determinism() {
        let mut a = exploring(99999);
        let mut b = exploring(99999);
        for state in [&mut a, &mut b] {
            for _ in 0..4 {
                state.spawn_enemy_random();
            }
        }

        let inputs = [
            TickInput {
                up: true,
                ..Default::default()
            },
            TickInput {
                left: true,
                sprint: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for frame in 0..120 {
            let input = &inputs[frame % inputs.len()];
            let now = frame as f64 * 16.0;
            tick(&mut a, input, now, &mut NullSink);
            tick(&mut b, input, now, &mut NullSink);
        }

        assert_eq!(a.frame, b.frame);
        assert_eq!(a.enemies, b.enemies);
        assert_eq!(a.player, b.player);
    }
}
