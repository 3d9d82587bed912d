//! Character classes: base stats and per-ability multipliers

use serde::{Deserialize, Serialize};

/// Playable class keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Warrior,
    Mage,
    Ranger,
    Cleric,
}

/// Starting stats for a class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseStats {
    pub health: f32,
    pub mana: f32,
    pub attack: f32,
    pub spell_power: f32,
    pub heal_power: f32,
    pub ranged_attack: f32,
    pub armor: f32,
    /// Movement units per tick
    pub speed: f32,
    pub attack_range: f32,
    pub attack_cooldown_ms: f64,
}

/// Multipliers applied on top of base stats when an ability resolves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassModifiers {
    pub melee: f32,
    pub ranged: f32,
    pub spell: f32,
    pub heal: f32,
}

impl ClassModifiers {
    pub const NEUTRAL: Self = Self {
        melee: 1.0,
        ranged: 1.0,
        spell: 1.0,
        heal: 1.0,
    };
}

impl ClassKind {
    pub const ALL: [ClassKind; 4] = [
        ClassKind::Warrior,
        ClassKind::Mage,
        ClassKind::Ranger,
        ClassKind::Cleric,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassKind::Warrior => "warrior",
            ClassKind::Mage => "mage",
            ClassKind::Ranger => "ranger",
            ClassKind::Cleric => "cleric",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "warrior" | "knight" => Some(ClassKind::Warrior),
            "mage" | "wizard" => Some(ClassKind::Mage),
            "ranger" | "archer" => Some(ClassKind::Ranger),
            "cleric" | "priest" => Some(ClassKind::Cleric),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ClassKind::Warrior => "Warrior",
            ClassKind::Mage => "Mage",
            ClassKind::Ranger => "Ranger",
            ClassKind::Cleric => "Cleric",
        }
    }

    pub fn base_stats(&self) -> BaseStats {
        match self {
            ClassKind::Warrior => BaseStats {
                health: 120.0,
                mana: 40.0,
                attack: 15.0,
                spell_power: 20.0,
                heal_power: 20.0,
                ranged_attack: 8.0,
                armor: 3.0,
                speed: 3.0,
                attack_range: 60.0,
                attack_cooldown_ms: 500.0,
            },
            ClassKind::Mage => BaseStats {
                health: 80.0,
                mana: 100.0,
                attack: 8.0,
                spell_power: 40.0,
                heal_power: 20.0,
                ranged_attack: 10.0,
                armor: 1.0,
                speed: 3.0,
                attack_range: 50.0,
                attack_cooldown_ms: 650.0,
            },
            ClassKind::Ranger => BaseStats {
                health: 95.0,
                mana: 60.0,
                attack: 10.0,
                spell_power: 25.0,
                heal_power: 20.0,
                ranged_attack: 14.0,
                armor: 2.0,
                speed: 3.4,
                attack_range: 55.0,
                attack_cooldown_ms: 550.0,
            },
            ClassKind::Cleric => BaseStats {
                health: 100.0,
                mana: 80.0,
                attack: 10.0,
                spell_power: 40.0,
                heal_power: 30.0,
                ranged_attack: 9.0,
                armor: 2.0,
                speed: 3.0,
                attack_range: 55.0,
                attack_cooldown_ms: 600.0,
            },
        }
    }

    pub fn modifiers(&self) -> ClassModifiers {
        match self {
            ClassKind::Warrior => ClassModifiers {
                melee: 1.5,
                ..ClassModifiers::NEUTRAL
            },
            ClassKind::Mage => ClassModifiers {
                spell: 1.8,
                ..ClassModifiers::NEUTRAL
            },
            ClassKind::Ranger => ClassModifiers {
                ranged: 1.4,
                ..ClassModifiers::NEUTRAL
            },
            ClassKind::Cleric => ClassModifiers {
                spell: 1.6,
                heal: 1.5,
                ..ClassModifiers::NEUTRAL
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_key_round_trip() {
        for class in ClassKind::ALL {
            assert_eq!(ClassKind::from_str(class.as_str()), Some(class));
        }
        assert_eq!(ClassKind::from_str("  ARCHER "), Some(ClassKind::Ranger));
        assert_eq!(ClassKind::from_str("bard"), None);
    }

    #[test]
    fn test_display_names_are_distinct() {
        assert_eq!(ClassKind::Ranger.display_name(), "Ranger");
        let mut names: Vec<_> = ClassKind::ALL.iter().map(|c| c.display_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ClassKind::ALL.len());
    }

    #[test]
    fn test_each_class_has_a_specialty() {
        assert_eq!(ClassKind::Warrior.modifiers().melee, 1.5);
        assert_eq!(ClassKind::Mage.modifiers().spell, 1.8);
        assert_eq!(ClassKind::Ranger.modifiers().ranged, 1.4);
        assert_eq!(ClassKind::Cleric.modifiers().spell, 1.6);
    }
}
