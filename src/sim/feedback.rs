//! Presentation sink: fire-and-forget feedback from the simulation
//!
//! The sim never asks whether anyone is listening. Every hook has a no-op
//! default, so `NullSink` is just an empty impl.

use glam::Vec2;

use super::abilities::AbilityKind;
use super::pool::ResourcePool;

/// Semantic color of a floating number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackColor {
    /// Damage dealt to an enemy
    Damage,
    /// Critical damage dealt to an enemy
    Crit,
    /// Damage taken by the player
    Hurt,
    Heal,
    Mana,
    Experience,
}

/// Hooks consumed by the visual-effects and HUD layers
pub trait PresentationSink {
    fn floating_number(&mut self, _pos: Vec2, _text: &str, _color: FeedbackColor) {}
    fn ability_cast(&mut self, _ability: AbilityKind, _pos: Vec2) {}
    fn insufficient_resource(&mut self, _ability: AbilityKind, _pos: Vec2) {}
    fn critical_hit(&mut self, _pos: Vec2) {}
    fn level_up(&mut self, _level: u32, _pos: Vec2) {}
    fn player_defeated(&mut self) {}
    fn bars_changed(&mut self, _hp: ResourcePool, _mana: ResourcePool) {}
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PresentationSink for NullSink {}

/// A recorded feedback call
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackEvent {
    FloatingNumber {
        pos: Vec2,
        text: String,
        color: FeedbackColor,
    },
    AbilityCast {
        ability: AbilityKind,
        pos: Vec2,
    },
    InsufficientResource {
        ability: AbilityKind,
        pos: Vec2,
    },
    CriticalHit {
        pos: Vec2,
    },
    LevelUp {
        level: u32,
        pos: Vec2,
    },
    PlayerDefeated,
    BarsChanged {
        hp: ResourcePool,
        mana: ResourcePool,
    },
}

/// Sink that records every call, drained by the frontend each frame
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<FeedbackEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, FeedbackEvent> {
        self.events.drain(..)
    }

    pub fn count(&self, pred: impl Fn(&FeedbackEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Latest bar snapshot, if any was recorded
    pub fn last_bars(&self) -> Option<(ResourcePool, ResourcePool)> {
        self.events.iter().rev().find_map(|e| match e {
            FeedbackEvent::BarsChanged { hp, mana } => Some((*hp, *mana)),
            _ => None,
        })
    }
}

impl PresentationSink for EventLog {
    fn floating_number(&mut self, pos: Vec2, text: &str, color: FeedbackColor) {
        self.events.push(FeedbackEvent::FloatingNumber {
            pos,
            text: text.to_string(),
            color,
        });
    }

    fn ability_cast(&mut self, ability: AbilityKind, pos: Vec2) {
        self.events.push(FeedbackEvent::AbilityCast { ability, pos });
    }

    fn insufficient_resource(&mut self, ability: AbilityKind, pos: Vec2) {
        self.events
            .push(FeedbackEvent::InsufficientResource { ability, pos });
    }

    fn critical_hit(&mut self, pos: Vec2) {
        self.events.push(FeedbackEvent::CriticalHit { pos });
    }

    fn level_up(&mut self, level: u32, pos: Vec2) {
        self.events.push(FeedbackEvent::LevelUp { level, pos });
    }

    fn player_defeated(&mut self) {
        self.events.push(FeedbackEvent::PlayerDefeated);
    }

    fn bars_changed(&mut self, hp: ResourcePool, mana: ResourcePool) {
        self.events.push(FeedbackEvent::BarsChanged { hp, mana });
    }
}
