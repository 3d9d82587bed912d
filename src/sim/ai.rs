//! Enemy AI: separation, then chase-or-attack, then clamp
//!
//! There is no persisted state machine. Each tick the behavior is re-derived
//! from the distance to the player.

use glam::Vec2;

use super::feedback::{FeedbackColor, PresentationSink};
use super::state::{Enemy, GameState};
use crate::clamp_to_playfield;
use crate::consts::*;

/// Per-tick behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Out of attack range: move toward the player
    Seeking,
    /// In attack range: hit the player when the cooldown allows
    Attacking,
}

/// Decide behavior from distance alone
pub fn decide(enemy: &Enemy, player_pos: Vec2) -> Behavior {
    if enemy.pos.distance(player_pos) > enemy.attack_range {
        Behavior::Seeking
    } else {
        Behavior::Attacking
    }
}

/// Repulsion for enemy `index` from every neighbor within `SEPARATION_RADIUS`.
///
/// Strength per neighbor is `(R - d) / R`, floored at `SEPARATION_MIN_STRENGTH`,
/// times `SEPARATION_FORCE`. Coincident pairs split along X by id order.
pub fn separation_displacement(enemies: &[Enemy], index: usize) -> Vec2 {
    let me = &enemies[index];
    let mut push = Vec2::ZERO;

    for (j, other) in enemies.iter().enumerate() {
        if j == index {
            continue;
        }
        let delta = me.pos - other.pos;
        let dist = delta.length();
        if dist >= SEPARATION_RADIUS {
            continue;
        }

        let away = if dist > f32::EPSILON {
            delta / dist
        } else if me.id < other.id {
            -Vec2::X
        } else {
            Vec2::X
        };
        let strength = ((SEPARATION_RADIUS - dist) / SEPARATION_RADIUS).max(SEPARATION_MIN_STRENGTH);
        push += away * strength * SEPARATION_FORCE;
    }

    push
}

/// Apply separation to every enemy from a single position snapshot
pub fn apply_separation(enemies: &mut [Enemy]) {
    let pushes: Vec<Vec2> = (0..enemies.len())
        .map(|i| separation_displacement(enemies, i))
        .collect();
    for (enemy, push) in enemies.iter_mut().zip(pushes) {
        enemy.pos = clamp_to_playfield(enemy.pos + push, enemy.radius);
    }
}

/// Advance every live enemy by one tick. Returns damage dealt to the player.
pub fn update_enemies(state: &mut GameState, now: f64, sink: &mut dyn PresentationSink) -> f32 {
    let Some(player) = state.player.as_mut() else {
        return 0.0;
    };

    apply_separation(&mut state.enemies);

    let mut total = 0.0;
    for enemy in state.enemies.iter_mut().filter(|e| !e.is_dead()) {
        match decide(enemy, player.pos) {
            Behavior::Seeking => {
                let dir = crate::direction_to(enemy.pos, player.pos);
                enemy.pos += dir * enemy.speed;
            }
            Behavior::Attacking => {
                // A dead player takes no further hits this tick
                if player.is_alive() && enemy.attack_ready(now) {
                    let taken = player.take_hit(enemy.attack_damage);
                    enemy.last_attack = Some(now);
                    total += taken;
                    sink.floating_number(player.pos, &format!("-{}", taken.round()), FeedbackColor::Hurt);
                }
            }
        }
        enemy.pos = clamp_to_playfield(enemy.pos, enemy.radius);
    }

    total
}
