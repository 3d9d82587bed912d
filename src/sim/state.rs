//! Game state and core simulation types
//!
//! Everything the frame loop, input handlers and timers read or write lives
//! in `GameState`, which is passed explicitly to every operation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::abilities::AbilityKind;
use super::class::{ClassKind, ClassModifiers};
use super::dice::Dice;
use super::feedback::{FeedbackColor, PresentationSink};
use super::pool::ResourcePool;
use crate::consts::*;
use crate::settings::Difficulty;

/// Current run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunMode {
    /// Menus, character select, no exploration running
    #[default]
    Idle,
    /// Active simulation
    Exploring,
    /// An overlay (inventory, save list, console) is open
    Paused,
    /// Player reached 0 HP; waiting for acknowledgment
    Defeated,
}

/// Last-triggered timestamps (ms), tracked per ability kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldowns {
    pub melee: Option<f64>,
    pub ranged: Option<f64>,
    pub spell: Option<f64>,
    pub heal: Option<f64>,
}

impl Cooldowns {
    pub fn last(&self, ability: AbilityKind) -> Option<f64> {
        match ability {
            AbilityKind::Melee => self.melee,
            AbilityKind::Ranged => self.ranged,
            AbilityKind::Spell => self.spell,
            AbilityKind::Heal => self.heal,
        }
    }

    /// True if `ability` has never fired or `cooldown_ms` has elapsed
    pub fn ready(&self, ability: AbilityKind, now: f64, cooldown_ms: f64) -> bool {
        self.last(ability)
            .is_none_or(|last| now - last >= cooldown_ms)
    }

    pub fn mark(&mut self, ability: AbilityKind, now: f64) {
        let slot = match ability {
            AbilityKind::Melee => &mut self.melee,
            AbilityKind::Ranged => &mut self.ranged,
            AbilityKind::Spell => &mut self.spell,
            AbilityKind::Heal => &mut self.heal,
        };
        *slot = Some(now);
    }
}

/// The player character
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    pub class: ClassKind,
    pub pos: Vec2,
    pub radius: f32,
    pub hp: ResourcePool,
    pub mana: ResourcePool,
    /// Melee base damage
    pub attack_damage: f32,
    pub ranged_damage: f32,
    pub spell_damage: f32,
    pub heal_amount: f32,
    pub armor: f32,
    /// Movement units per tick
    pub speed: f32,
    pub attack_range: f32,
    pub attack_cooldown_ms: f64,
    pub cooldowns: Cooldowns,
    pub level: u32,
    pub experience: u32,
    pub experience_to_next: u32,
}

impl Player {
    /// Fresh level-1 character at the playfield center
    pub fn new(name: impl Into<String>, class: ClassKind) -> Self {
        let base = class.base_stats();
        Self {
            name: name.into(),
            class,
            pos: Vec2::new(PLAYFIELD_WIDTH / 2.0, PLAYFIELD_HEIGHT / 2.0),
            radius: PLAYER_RADIUS,
            hp: ResourcePool::full(base.health),
            mana: ResourcePool::full(base.mana),
            attack_damage: base.attack,
            ranged_damage: base.ranged_attack,
            spell_damage: base.spell_power,
            heal_amount: base.heal_power,
            armor: base.armor,
            speed: base.speed,
            attack_range: base.attack_range,
            attack_cooldown_ms: base.attack_cooldown_ms,
            cooldowns: Cooldowns::default(),
            level: 1,
            experience: 0,
            experience_to_next: BASE_XP_TO_NEXT,
        }
    }

    pub fn modifiers(&self) -> ClassModifiers {
        self.class.modifiers()
    }

    pub fn is_alive(&self) -> bool {
        !self.hp.is_empty()
    }

    /// Apply an enemy hit after armor. Returns damage taken.
    pub fn take_hit(&mut self, raw: f32) -> f32 {
        let dealt = (raw - self.armor).max(1.0);
        self.hp.drain(dealt)
    }

    /// Add experience; returns how many levels were gained
    pub fn grant_experience(&mut self, amount: u32) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.experience >= self.experience_to_next {
            self.experience -= self.experience_to_next;
            self.level_up();
            gained += 1;
        }
        gained
    }

    fn level_up(&mut self) {
        self.level = self.level.saturating_add(1);
        self.hp.grow(LEVEL_HP_BONUS);
        self.mana.grow(LEVEL_MANA_BONUS);
        self.attack_damage *= LEVEL_GROWTH_FACTOR;
        self.ranged_damage *= LEVEL_GROWTH_FACTOR;
        self.spell_damage *= LEVEL_GROWTH_FACTOR;
        self.heal_amount *= LEVEL_GROWTH_FACTOR;
        self.experience_to_next =
            ((self.experience_to_next as f32) * XP_THRESHOLD_GROWTH).round() as u32;
        log::info!("{} reached level {}", self.name, self.level);
    }
}

/// A hostile entity
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub hp: ResourcePool,
    /// Units per tick while seeking
    pub speed: f32,
    pub attack_range: f32,
    pub attack_cooldown_ms: f64,
    pub attack_damage: f32,
    pub last_attack: Option<f64>,
    pub radius: f32,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, difficulty: Difficulty) -> Self {
        Self {
            id,
            pos,
            hp: ResourcePool::full(ENEMY_HP * difficulty.enemy_hp_scale()),
            speed: ENEMY_SPEED,
            attack_range: ENEMY_ATTACK_RANGE,
            attack_cooldown_ms: ENEMY_ATTACK_COOLDOWN_MS,
            attack_damage: ENEMY_ATTACK_DAMAGE * difficulty.enemy_damage_scale(),
            last_attack: None,
            radius: ENEMY_RADIUS,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp.is_empty()
    }

    pub fn attack_ready(&self, now: f64) -> bool {
        self.last_attack
            .is_none_or(|last| now - last >= self.attack_cooldown_ms)
    }
}

/// A ranged attack in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Units per tick
    pub vel: Vec2,
    /// Class-scaled damage before the crit roll
    pub damage: f32,
    pub ttl_frames: u32,
    pub radius: f32,
    /// Marked for end-of-tick removal
    pub spent: bool,
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct GameState {
    pub mode: RunMode,
    pub player: Option<Player>,
    /// Live enemies (sorted by id)
    pub enemies: Vec<Enemy>,
    /// Live projectiles (sorted by id)
    pub projectiles: Vec<Projectile>,
    pub difficulty: Difficulty,
    pub dice: Dice,
    /// Simulated frame counter
    pub frame: u64,
    /// Enemies killed this session
    pub kills: u32,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        Self::with_dice(Dice::seeded(seed), difficulty)
    }

    pub fn with_dice(dice: Dice, difficulty: Difficulty) -> Self {
        Self {
            mode: RunMode::Idle,
            player: None,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            difficulty,
            dice,
            frame: 0,
            kills: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_exploring(&self) -> bool {
        self.mode == RunMode::Exploring
    }

    /// Spawn an enemy at `pos` (clamped into the playfield). Returns its id.
    pub fn spawn_enemy_at(&mut self, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let pos = crate::clamp_to_playfield(pos, ENEMY_RADIUS);
        self.enemies.push(Enemy::new(id, pos, self.difficulty));
        id
    }

    /// Spawn an enemy at a random in-bounds position
    pub fn spawn_enemy_random(&mut self) -> u32 {
        let x = self
            .dice
            .range(ENEMY_RADIUS, PLAYFIELD_WIDTH - ENEMY_RADIUS);
        let y = self
            .dice
            .range(ENEMY_RADIUS, PLAYFIELD_HEIGHT - ENEMY_RADIUS);
        let id = self.spawn_enemy_at(Vec2::new(x, y));
        log::debug!("Spawned enemy {} at ({:.0}, {:.0})", id, x, y);
        id
    }

    /// Compact away dead enemies, granting experience for each kill.
    /// Returns the number removed.
    pub fn reap_dead_enemies(&mut self, sink: &mut dyn PresentationSink) -> usize {
        let before = self.enemies.len();
        self.enemies.retain(|e| !e.is_dead());
        let killed = before - self.enemies.len();
        if killed == 0 {
            return 0;
        }

        self.kills += killed as u32;
        if let Some(player) = self.player.as_mut() {
            let xp = ENEMY_XP_REWARD * killed as u32;
            let gained = player.grant_experience(xp);
            sink.floating_number(player.pos, &format!("+{xp} XP"), FeedbackColor::Experience);
            if gained > 0 {
                sink.level_up(player.level, player.pos);
            }
        }
        killed
    }

    /// Compact away spent projectiles
    pub fn reap_projectiles(&mut self) {
        self.projectiles.retain(|p| !p.spent);
    }

    /// Transition to `Defeated` if the player just died. Fires at most once per run.
    pub fn check_defeat(&mut self, sink: &mut dyn PresentationSink) -> bool {
        let dead = self.player.as_ref().is_some_and(|p| !p.is_alive());
        if dead && self.mode == RunMode::Exploring {
            self.mode = RunMode::Defeated;
            log::info!("Player defeated after {} kills", self.kills);
            sink.player_defeated();
            return true;
        }
        false
    }

    /// Clear the field for a fresh run
    pub fn clear_field(&mut self) {
        self.enemies.clear();
        self.projectiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::feedback::{EventLog, FeedbackEvent, NullSink};

    #[test]
    fn test_cooldowns_are_per_ability() {
        let mut cd = Cooldowns::default();
        assert!(cd.ready(AbilityKind::Spell, 0.0, 1500.0));
        cd.mark(AbilityKind::Spell, 1000.0);
        assert!(!cd.ready(AbilityKind::Spell, 2000.0, 1500.0));
        assert!(cd.ready(AbilityKind::Spell, 2500.0, 1500.0));
        assert!(cd.ready(AbilityKind::Heal, 1001.0, 3000.0));
    }

    #[test]
    fn test_level_up_growth() {
        let mut player = Player::new("Test", ClassKind::Warrior);
        let max_hp = player.hp.max();
        let attack = player.attack_damage;

        assert_eq!(player.grant_experience(99), 0);
        assert_eq!(player.grant_experience(1), 1);
        assert_eq!(player.level, 2);
        assert_eq!(player.experience, 0);
        assert_eq!(player.hp.max(), max_hp + LEVEL_HP_BONUS);
        assert!((player.attack_damage - attack * LEVEL_GROWTH_FACTOR).abs() < 1e-4);
        assert_eq!(player.experience_to_next, 125);
    }

    #[test]
    fn test_multiple_level_ups_from_one_grant() {
        let mut player = Player::new("Test", ClassKind::Mage);
        // 100 + 125 = 225 needed for two levels
        assert_eq!(player.grant_experience(230), 2);
        assert_eq!(player.level, 3);
        assert_eq!(player.experience, 5);
    }

    #[test]
    fn test_experience_saturates_near_max() {
        let mut player = Player::new("Test", ClassKind::Warrior);
        player.experience = u32::MAX - 6;
        player.experience_to_next = u32::MAX;

        assert_eq!(player.grant_experience(20), 1);
        assert_eq!(player.level, 2);
        assert_eq!(player.experience, 0);
        assert_eq!(player.experience_to_next, u32::MAX);
    }

    #[test]
    fn test_armor_floor() {
        let mut player = Player::new("Tank", ClassKind::Warrior);
        let hp = player.hp.current();
        assert_eq!(player.take_hit(2.0), 1.0);
        assert_eq!(player.hp.current(), hp - 1.0);
    }

    #[test]
    fn test_reap_dead_enemies_grants_xp() {
        let mut state = GameState::new(1, Difficulty::Normal);
        state.player = Some(Player::new("Test", ClassKind::Warrior));
        let a = state.spawn_enemy_at(Vec2::new(100.0, 100.0));
        state.spawn_enemy_at(Vec2::new(200.0, 100.0));
        state.enemies.iter_mut().find(|e| e.id == a).unwrap().hp.drain(999.0);

        let mut log = EventLog::new();
        assert_eq!(state.reap_dead_enemies(&mut log), 1);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.kills, 1);
        assert_eq!(state.player.as_ref().unwrap().experience, ENEMY_XP_REWARD);
        assert_eq!(
            log.count(|e| matches!(e, FeedbackEvent::FloatingNumber { color: FeedbackColor::Experience, .. })),
            1
        );
    }

    #[test]
    fn test_spawn_random_in_bounds() {
        let mut state = GameState::new(7, Difficulty::Hard);
        for _ in 0..50 {
            state.spawn_enemy_random();
        }
        for e in &state.enemies {
            assert!(e.pos.x >= ENEMY_RADIUS && e.pos.x <= PLAYFIELD_WIDTH - ENEMY_RADIUS);
            assert!(e.pos.y >= ENEMY_RADIUS && e.pos.y <= PLAYFIELD_HEIGHT - ENEMY_RADIUS);
            assert_eq!(e.hp.max(), ENEMY_HP * 1.5);
        }
    }

    #[test]
    fn test_check_defeat_only_once() {
        let mut state = GameState::new(1, Difficulty::Normal);
        state.mode = RunMode::Exploring;
        let mut player = Player::new("Test", ClassKind::Warrior);
        player.hp.drain(1000.0);
        state.player = Some(player);

        assert!(state.check_defeat(&mut NullSink));
        assert_eq!(state.mode, RunMode::Defeated);
        assert!(!state.check_defeat(&mut NullSink));
    }
}
