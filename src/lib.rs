//! Canvas Quest - A browser action RPG on a 2D canvas
//!
//! Core modules:
//! - `sim`: Simulation core (entities, abilities, enemy AI, projectiles, collisions)
//! - `scheduler`: Virtual-time interval tasks (regeneration, respawn)
//! - `lifecycle`: Starts/stops the frame loop and timers on UI transitions
//! - `renderer`: 2D drawing surface and scene drawing
//! - `platform`: Browser input mapping and clock
//! - `persistence`: Save record load/save with per-field fallbacks
//! - `settings`: Difficulty and key bindings

pub mod lifecycle;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use lifecycle::Coordinator;
pub use settings::{Difficulty, KeyBindings, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (canvas pixels)
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Player collision radius (sprite size 40)
    pub const PLAYER_RADIUS: f32 = 20.0;
    pub const PLAYER_SPRITE_SIZE: f32 = 40.0;
    /// Held-direction movement multiplier while sprinting
    pub const SPRINT_MULTIPLIER: f32 = 1.6;

    /// Enemy defaults (Normal difficulty)
    pub const ENEMY_RADIUS: f32 = 18.0;
    pub const ENEMY_HP: f32 = 50.0;
    /// Units per tick while seeking
    pub const ENEMY_SPEED: f32 = 1.2;
    pub const ENEMY_ATTACK_RANGE: f32 = 42.0;
    pub const ENEMY_ATTACK_COOLDOWN_MS: f64 = 1000.0;
    pub const ENEMY_ATTACK_DAMAGE: f32 = 8.0;
    /// Experience granted to the player per kill
    pub const ENEMY_XP_REWARD: u32 = 20;

    /// Enemy-enemy separation
    pub const SEPARATION_RADIUS: f32 = 40.0;
    pub const SEPARATION_FORCE: f32 = 1.5;
    /// Lower bound on the (R - d) / R falloff so overlapping enemies always part
    pub const SEPARATION_MIN_STRENGTH: f32 = 0.05;

    /// Critical hits
    pub const CRIT_CHANCE: f32 = 0.10;
    pub const CRIT_MULTIPLIER: f32 = 2.0;

    /// Mana refunded per landed melee or projectile hit
    pub const MANA_REFUND_PER_HIT: f32 = 3.0;

    /// Ranged attack
    pub const RANGED_MANA_COST: f32 = 2.0;
    pub const RANGED_COOLDOWN_MS: f64 = 350.0;
    pub const PROJECTILE_SPEED: f32 = 8.0;
    pub const PROJECTILE_LIFETIME_FRAMES: u32 = 90;
    pub const PROJECTILE_RADIUS: f32 = 5.0;

    /// Area spell
    pub const SPELL_MANA_COST: f32 = 20.0;
    pub const SPELL_COOLDOWN_MS: f64 = 1500.0;
    pub const SPELL_RADIUS: f32 = 150.0;
    /// Per-target damage variance (+/- fraction)
    pub const SPELL_VARIANCE: f32 = 0.10;

    /// Self heal
    pub const HEAL_MANA_COST: f32 = 30.0;
    pub const HEAL_COOLDOWN_MS: f64 = 3000.0;

    /// Regeneration task
    pub const REGEN_INTERVAL_MS: f64 = 2000.0;
    pub const HP_REGEN_AMOUNT: f32 = 1.0;
    pub const MANA_REGEN_AMOUNT: f32 = 2.0;

    /// Respawn task
    pub const RESPAWN_INTERVAL_MS: f64 = 6000.0;
    /// Enemies spawned when exploration starts with an empty field
    pub const INITIAL_ENEMY_COUNT: usize = 3;

    /// Level growth
    pub const LEVEL_GROWTH_FACTOR: f32 = 1.08;
    pub const LEVEL_HP_BONUS: f32 = 12.0;
    pub const LEVEL_MANA_BONUS: f32 = 6.0;
    pub const XP_THRESHOLD_GROWTH: f32 = 1.25;
    pub const BASE_XP_TO_NEXT: u32 = 100;
}

/// Clamp a circle of `radius` so it stays fully inside the playfield
#[inline]
pub fn clamp_to_playfield(pos: Vec2, radius: f32) -> Vec2 {
    use consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
    let radius = radius.clamp(0.0, PLAYFIELD_WIDTH.min(PLAYFIELD_HEIGHT) / 2.0);
    Vec2::new(
        pos.x.clamp(radius, PLAYFIELD_WIDTH - radius),
        pos.y.clamp(radius, PLAYFIELD_HEIGHT - radius),
    )
}

/// Whether a point lies inside the playfield rectangle
#[inline]
pub fn in_playfield(pos: Vec2) -> bool {
    use consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
    (0.0..=PLAYFIELD_WIDTH).contains(&pos.x) && (0.0..=PLAYFIELD_HEIGHT).contains(&pos.y)
}

/// Unit vector from `from` toward `to`, or zero when they coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}
