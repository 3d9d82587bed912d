//! Character save records
//!
//! Features:
//! - camelCase JSON record matching the browser save slots
//! - Lenient decode: every field has a fallback, so a load never fails
//! - Per-class defaults for missing stats
//! - LocalStorage slots on wasm, no-op stubs natively

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::consts::{PLAYER_SPRITE_SIZE, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::settings::Difficulty;
use crate::sim::{ClassKind, Cooldowns, Player, ResourcePool};

/// Errors on the save path. Loading has no error type.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Record could not be serialized
    #[error("Failed to encode save record: {0}")]
    Encode(#[from] serde_json::Error),

    /// No LocalStorage (private mode, sandboxed iframe, native build)
    #[error("Local storage is unavailable")]
    StorageUnavailable,

    /// LocalStorage rejected the write (quota, security)
    #[error("Local storage write failed: {0}")]
    Storage(String),
}

/// Stat block of a save record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSnapshot {
    pub health: f32,
    pub mana: f32,
    pub attack: f32,
    pub spell_power: f32,
    pub heal_power: f32,
    pub ranged_attack: f32,
    pub armor: f32,
    pub speed: f32,
    pub current_hp: f32,
    pub max_hp: f32,
    pub current_mana: f32,
    pub max_mana: f32,
    pub experience: u32,
    pub experience_to_next_level: u32,
}

impl StatSnapshot {
    /// Fresh level-1 stats for a class
    pub fn defaults_for(class: ClassKind) -> Self {
        Self::from_player(&Player::new("", class))
    }

    pub fn from_player(player: &Player) -> Self {
        Self {
            health: player.hp.max(),
            mana: player.mana.max(),
            attack: player.attack_damage,
            spell_power: player.spell_damage,
            heal_power: player.heal_amount,
            ranged_attack: player.ranged_damage,
            armor: player.armor,
            speed: player.speed,
            current_hp: player.hp.current(),
            max_hp: player.hp.max(),
            current_mana: player.mana.current(),
            max_mana: player.mana.max(),
            experience: player.experience,
            experience_to_next_level: player.experience_to_next,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// A persisted character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    pub name: String,
    pub class: ClassKind,
    pub stats: StatSnapshot,
    pub level: u32,
    pub difficulty: Difficulty,
    pub position: Position,
    pub sprite_size: f32,
    /// Unix timestamp (ms) of the save
    pub timestamp: f64,
}

/// Largest sprite that still fits the playfield
const MAX_SPRITE_SIZE: f32 = PLAYFIELD_HEIGHT / 2.0;

/// Name used when a record has none
pub const DEFAULT_NAME: &str = "Adventurer";

impl SaveRecord {
    /// LocalStorage key prefix (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_PREFIX: &'static str = "canvas_quest_save_";

    /// Fallback record for a class
    pub fn default_for(class: ClassKind) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            class,
            stats: StatSnapshot::defaults_for(class),
            level: 1,
            difficulty: Difficulty::default(),
            position: Position {
                x: PLAYFIELD_WIDTH / 2.0,
                y: PLAYFIELD_HEIGHT / 2.0,
            },
            sprite_size: PLAYER_SPRITE_SIZE,
            timestamp: 0.0,
        }
    }

    /// Snapshot a live player
    pub fn capture(player: &Player, difficulty: Difficulty, timestamp: f64) -> Self {
        Self {
            name: player.name.clone(),
            class: player.class,
            stats: StatSnapshot::from_player(player),
            level: player.level,
            difficulty,
            position: Position {
                x: player.pos.x,
                y: player.pos.y,
            },
            sprite_size: player.radius * 2.0,
            timestamp,
        }
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a record, falling back field by field. Never fails.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                log::warn!("Save record is not JSON ({e}), using defaults");
                Self::default_for(ClassKind::default())
            }
        }
    }

    /// Decode from an already-parsed JSON value
    pub fn from_value(value: &Value) -> Self {
        let class = value
            .get("class")
            .and_then(Value::as_str)
            .and_then(ClassKind::from_str)
            .unwrap_or_default();
        let fallback = Self::default_for(class);

        let name = value
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or(fallback.name);

        let stats = value.get("stats");
        let d = &fallback.stats;
        let float = |key: &str, default: f32| read_f32(stats, key).unwrap_or(default);
        let whole = |key: &str, default: u32| read_u32(stats, key).unwrap_or(default);

        let health = float("health", d.health);
        let mana = float("mana", d.mana);
        let max_hp = float("maxHp", health);
        let max_mana = float("maxMana", mana);
        let stats = StatSnapshot {
            health,
            mana,
            attack: float("attack", d.attack),
            spell_power: float("spellPower", d.spell_power),
            heal_power: float("healPower", d.heal_power),
            ranged_attack: float("rangedAttack", d.ranged_attack),
            armor: float("armor", d.armor),
            speed: float("speed", d.speed),
            current_hp: float("currentHp", max_hp),
            max_hp,
            current_mana: float("currentMana", max_mana),
            max_mana,
            experience: 0,
            experience_to_next_level: whole("experienceToNextLevel", d.experience_to_next_level)
                .max(1),
        };
        // Progress always sits below the threshold
        let stats = StatSnapshot {
            experience: whole("experience", d.experience).min(stats.experience_to_next_level - 1),
            ..stats
        };

        let position = value.get("position");
        let position = Position {
            x: read_f32(position, "x").unwrap_or(fallback.position.x),
            y: read_f32(position, "y").unwrap_or(fallback.position.y),
        };

        Self {
            name,
            class,
            stats,
            level: read_u32(Some(value), "level").unwrap_or(1).max(1),
            difficulty: value
                .get("difficulty")
                .and_then(Value::as_str)
                .and_then(Difficulty::from_str)
                .unwrap_or(fallback.difficulty),
            position,
            sprite_size: read_f32(Some(value), "spriteSize")
                .filter(|s| *s > 0.0 && *s <= MAX_SPRITE_SIZE)
                .unwrap_or(fallback.sprite_size),
            timestamp: value
                .get("timestamp")
                .and_then(Value::as_f64)
                .unwrap_or(fallback.timestamp),
        }
    }

    /// Rebuild the live player (position clamped into the playfield)
    pub fn to_player(&self) -> Player {
        let s = &self.stats;
        let radius = self.sprite_size / 2.0;
        Player {
            name: self.name.clone(),
            class: self.class,
            pos: crate::clamp_to_playfield(Vec2::new(self.position.x, self.position.y), radius),
            radius,
            hp: ResourcePool::new(s.current_hp, s.max_hp),
            mana: ResourcePool::new(s.current_mana, s.max_mana),
            attack_damage: s.attack,
            ranged_damage: s.ranged_attack,
            spell_damage: s.spell_power,
            heal_amount: s.heal_power,
            armor: s.armor,
            speed: s.speed,
            attack_range: self.class.base_stats().attack_range,
            attack_cooldown_ms: self.class.base_stats().attack_cooldown_ms,
            cooldowns: Cooldowns::default(),
            level: self.level,
            experience: s.experience,
            experience_to_next: s.experience_to_next_level,
        }
    }

    /// Load a save slot from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load_slot(slot: u32) -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        let json = storage
            .get_item(&format!("{}{}", Self::STORAGE_PREFIX, slot))
            .ok()??;
        let record = Self::from_json(&json);
        log::info!("Loaded save slot {} ({})", slot, record.name);
        Some(record)
    }

    /// Save to a LocalStorage slot (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save_slot(&self, slot: u32) -> Result<(), SaveError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(SaveError::StorageUnavailable)?;
        let json = self.to_json()?;
        storage
            .set_item(&format!("{}{}", Self::STORAGE_PREFIX, slot), &json)
            .map_err(|e| SaveError::Storage(format!("{e:?}")))?;
        log::info!("Saved {} to slot {}", self.name, slot);
        Ok(())
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_slot(_slot: u32) -> Option<Self> {
        None
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_slot(&self, _slot: u32) -> Result<(), SaveError> {
        Err(SaveError::StorageUnavailable)
    }
}

fn read_f32(obj: Option<&Value>, key: &str) -> Option<f32> {
    obj?.get(key)?
        .as_f64()
        .map(|v| v as f32)
        .filter(|v| v.is_finite())
}

fn read_u32(obj: Option<&Value>, key: &str) -> Option<u32> {
    let v = obj?.get(key)?;
    v.as_u64()
        .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        .and_then(|v| u32::try_from(v).ok())
}
