//! Projectile lifecycle: spawn, integrate, hit, compact
//!
//! 1. Spawned by the ranged ability, aimed at the pointer target
//! 2. Each tick: move by velocity, count down lifetime
//! 3. Expired or out-of-bounds projectiles are marked spent
//! 4. Live projectiles hit at most one enemy, then are marked spent
//! 5. Spent projectiles and dead enemies are filtered out at end of tick

use glam::Vec2;

use super::abilities::{refund_hit, strike_enemy};
use super::collision::circles_touch;
use super::feedback::PresentationSink;
use super::state::{GameState, Projectile};
use crate::consts::*;
use crate::{direction_to, in_playfield};

/// Spawn a projectile at `origin` heading toward `target`. Returns its id.
pub fn spawn(state: &mut GameState, origin: Vec2, target: Vec2, damage: f32) -> u32 {
    let mut dir = direction_to(origin, target);
    if dir == Vec2::ZERO {
        // Clicked on the player; fire to the right
        dir = Vec2::X;
    }

    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        pos: origin,
        vel: dir * PROJECTILE_SPEED,
        damage,
        ttl_frames: PROJECTILE_LIFETIME_FRAMES,
        radius: PROJECTILE_RADIUS,
        spent: false,
    });
    id
}

/// Integrate positions and expire projectiles
pub fn advance(state: &mut GameState) {
    for projectile in state.projectiles.iter_mut().filter(|p| !p.spent) {
        projectile.pos += projectile.vel;
        projectile.ttl_frames = projectile.ttl_frames.saturating_sub(1);
        if projectile.ttl_frames == 0 || !in_playfield(projectile.pos) {
            projectile.spent = true;
        }
    }
}

/// Resolve projectile-enemy hits. Returns the number of hits.
pub fn resolve_hits(state: &mut GameState, sink: &mut dyn PresentationSink) -> usize {
    let mut hits = 0;

    for projectile in state.projectiles.iter_mut().filter(|p| !p.spent) {
        for enemy in state.enemies.iter_mut().filter(|e| !e.is_dead()) {
            if !circles_touch(projectile.pos, projectile.radius, enemy.pos, enemy.radius) {
                continue;
            }

            strike_enemy(enemy, projectile.damage, &mut state.dice, sink);
            if let Some(player) = state.player.as_mut() {
                refund_hit(player, sink);
            }
            projectile.spent = true;
            hits += 1;
            break;
        }
    }

    hits
}

/// Full per-tick projectile step with end-of-tick compaction
pub fn update(state: &mut GameState, sink: &mut dyn PresentationSink) -> usize {
    advance(state);
    let hits = resolve_hits(state, sink);
    state.reap_projectiles();
    state.reap_dead_enemies(sink);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;
    use crate::sim::class::ClassKind;
    use crate::sim::dice::Dice;
    use crate::sim::feedback::NullSink;
    use crate::sim::state::Player;

    fn state() -> GameState {
        GameState::with_dice(Dice::fixed(0.5), Difficulty::Normal)
    }

    #[test]
    fn test_spawn_unit_direction() {
        let mut state = state();
        spawn(&mut state, Vec2::new(100.0, 100.0), Vec2::new(100.0, 400.0), 10.0);
        let p = &state.projectiles[0];
        assert!((p.vel.length() - PROJECTILE_SPEED).abs() < 1e-4);
        assert!(p.vel.y > 0.0 && p.vel.x.abs() < 1e-6);
        assert_eq!(p.ttl_frames, PROJECTILE_LIFETIME_FRAMES);
    }

    #[test]
    fn test_spawn_on_origin_fires_right() {
        let mut state = state();
        spawn(&mut state, Vec2::new(50.0, 50.0), Vec2::new(50.0, 50.0), 10.0);
        assert_eq!(state.projectiles[0].vel, Vec2::X * PROJECTILE_SPEED);
    }

    #[test]
    fn test_lifetime_expiry() {
        let mut state = state();
        // Aim along the long axis so it stays in bounds for the whole lifetime
        spawn(&mut state, Vec2::new(10.0, 300.0), Vec2::new(11.0, 300.0), 10.0);
        state.projectiles[0].vel = Vec2::new(0.1, 0.0);

        for _ in 0..PROJECTILE_LIFETIME_FRAMES - 1 {
            update(&mut state, &mut NullSink);
        }
        assert_eq!(state.projectiles.len(), 1);
        update(&mut state, &mut NullSink);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_leaving_bounds_removes() {
        let mut state = state();
        spawn(&mut state, Vec2::new(PLAYFIELD_WIDTH - 2.0, 300.0), Vec2::new(PLAYFIELD_WIDTH, 300.0), 10.0);
        update(&mut state, &mut NullSink);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_hits_one_enemy_and_refunds() {
        let mut state = state();
        let mut player = Player::new("Archer", ClassKind::Ranger);
        player.mana.spend(10.0);
        let mana = player.mana.current();
        state.player = Some(player);

        // Two enemies stacked on the projectile path
        state.spawn_enemy_at(Vec2::new(108.0, 300.0));
        state.spawn_enemy_at(Vec2::new(110.0, 300.0));
        spawn(&mut state, Vec2::new(100.0, 300.0), Vec2::new(200.0, 300.0), 12.0);

        assert_eq!(update(&mut state, &mut NullSink), 1);
        assert!(state.projectiles.is_empty());
        let damaged = state.enemies.iter().filter(|e| e.hp.current() < ENEMY_HP).count();
        assert_eq!(damaged, 1);
        assert_eq!(state.enemies[0].hp.current(), ENEMY_HP - 12.0);
        assert_eq!(
            state.player.as_ref().unwrap().mana.current(),
            mana + MANA_REFUND_PER_HIT
        );
    }

    #[test]
    fn test_lethal_hit_removes_enemy() {
        let mut state = state();
        state.spawn_enemy_at(Vec2::new(108.0, 300.0));
        state.enemies[0].hp.drain(ENEMY_HP - 1.0);
        spawn(&mut state, Vec2::new(100.0, 300.0), Vec2::new(200.0, 300.0), 12.0);

        update(&mut state, &mut NullSink);
        assert!(state.enemies.is_empty());
        assert_eq!(state.kills, 1);
    }
}
