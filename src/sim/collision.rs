//! Circle collision detection and player-vs-enemy overlap resolution

use glam::Vec2;

use super::state::GameState;
use crate::clamp_to_playfield;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit normal pointing from `b` toward `a`, for pushing `a` out
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between circle `a` and circle `b`.
///
/// Coincident centers resolve along +X so the push is never NaN.
pub fn circle_collision(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> CollisionResult {
    let delta = a_pos - b_pos;
    let dist = delta.length();
    let penetration = a_radius + b_radius - dist;

    if penetration <= 0.0 {
        return CollisionResult::miss();
    }

    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::X
    };

    CollisionResult {
        hit: true,
        normal,
        penetration,
    }
}

/// Touch test with inclusive boundary (projectile hits)
#[inline]
pub fn circles_touch(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    a_pos.distance(b_pos) <= a_radius + b_radius
}

/// Push the player and overlapping enemies apart.
///
/// The player moves half the overlap along the normal, the enemy a quarter
/// the other way. Both end up clamped to the playfield.
/// Returns the number of enemies that overlapped.
pub fn resolve_player_enemy(state: &mut GameState) -> usize {
    let Some(player) = state.player.as_mut() else {
        return 0;
    };

    let mut resolved = 0;
    for enemy in state.enemies.iter_mut() {
        let result = circle_collision(player.pos, player.radius, enemy.pos, enemy.radius);
        if !result.hit {
            continue;
        }
        player.pos += result.normal * (result.penetration * 0.5);
        enemy.pos -= result.normal * (result.penetration * 0.25);
        enemy.pos = clamp_to_playfield(enemy.pos, enemy.radius);
        resolved += 1;
    }

    player.pos = clamp_to_playfield(player.pos, player.radius);
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;
    use crate::sim::class::ClassKind;
    use crate::sim::state::Player;

    #[test]
    fn test_circle_collision_overlap() {
        let result = circle_collision(Vec2::new(10.0, 0.0), 8.0, Vec2::ZERO, 5.0);
        assert!(result.hit);
        assert!((result.penetration - 3.0).abs() < 1e-5);
        assert_eq!(result.normal, Vec2::X);
    }

    #[test]
    fn test_circle_collision_miss() {
        let result = circle_collision(Vec2::new(20.0, 0.0), 8.0, Vec2::ZERO, 5.0);
        assert!(!result.hit);
        // Exactly touching is not an overlap
        let result = circle_collision(Vec2::new(13.0, 0.0), 8.0, Vec2::ZERO, 5.0);
        assert!(!result.hit);
    }

    #[test]
    fn test_circle_collision_coincident() {
        let result = circle_collision(Vec2::ONE, 4.0, Vec2::ONE, 4.0);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::X);
        assert!(result.normal.is_finite());
    }

    #[test]
    fn test_circles_touch_inclusive() {
        assert!(circles_touch(Vec2::new(13.0, 0.0), 8.0, Vec2::ZERO, 5.0));
        assert!(!circles_touch(Vec2::new(13.1, 0.0), 8.0, Vec2::ZERO, 5.0));
    }

    #[test]
    fn test_resolve_player_enemy_asymmetric_push() {
        let mut state = GameState::new(1, Difficulty::Normal);
        let mut player = Player::new("Test", ClassKind::Warrior);
        player.pos = Vec2::new(400.0, 300.0);
        state.player = Some(player);
        // Player r=20, enemy r=18: centers 30 apart -> overlap 8
        state.spawn_enemy_at(Vec2::new(370.0, 300.0));

        assert_eq!(resolve_player_enemy(&mut state), 1);
        let player = state.player.as_ref().unwrap();
        assert!((player.pos.x - 404.0).abs() < 1e-4);
        assert!((state.enemies[0].pos.x - 368.0).abs() < 1e-4);
    }

    #[test]
    fn test_resolve_player_enemy_clamps_player() {
        let mut state = GameState::new(1, Difficulty::Normal);
        let mut player = Player::new("Test", ClassKind::Warrior);
        player.pos = Vec2::new(20.0, 300.0);
        state.player = Some(player);
        state.spawn_enemy_at(Vec2::new(40.0, 300.0));

        resolve_player_enemy(&mut state);
        let player = state.player.as_ref().unwrap();
        assert_eq!(player.pos.x, player.radius);
    }

    #[test]
    fn test_resolve_player_enemy_clamps_enemy() {
        let mut state = GameState::new(1, Difficulty::Normal);
        let mut player = Player::new("Test", ClassKind::Warrior);
        player.pos = Vec2::new(40.0, 300.0);
        state.player = Some(player);
        // Enemy pinned to the left wall, 16 overlap pushes it 4 further out
        state.spawn_enemy_at(Vec2::new(0.0, 300.0));

        assert_eq!(resolve_player_enemy(&mut state), 1);
        let enemy = &state.enemies[0];
        assert_eq!(enemy.pos.x, enemy.radius);
        assert!(crate::in_playfield(enemy.pos));
        assert!((state.player.as_ref().unwrap().pos.x - 48.0).abs() < 1e-4);
    }

    #[test]
    fn test_resolve_without_player() {
        let mut state = GameState::new(1, Difficulty::Normal);
        state.spawn_enemy_at(Vec2::new(40.0, 300.0));
        assert_eq!(resolve_player_enemy(&mut state), 0);
    }
}
