//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (monotonic ms clock)
//! - Input events (key bindings, held directions, pointer targeting)

use glam::Vec2;

use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::settings::KeyBindings;
use crate::sim::TickInput;

/// What a bound key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Up,
    Down,
    Left,
    Right,
    Sprint,
    Melee,
    Spell,
    Heal,
}

/// One-shot player actions routed to the ability resolver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Melee,
    Spell,
    Heal,
    /// Pointer click, in playfield coordinates
    Ranged { target: Vec2 },
}

impl KeyRole {
    /// The one-shot action for this key, if it is not a held key
    pub fn action(&self) -> Option<InputAction> {
        match self {
            KeyRole::Melee => Some(InputAction::Melee),
            KeyRole::Spell => Some(InputAction::Spell),
            KeyRole::Heal => Some(InputAction::Heal),
            _ => None,
        }
    }
}

fn key_matches(bound: &str, key: &str) -> bool {
    if bound.chars().count() == 1 {
        bound.eq_ignore_ascii_case(key)
    } else {
        bound == key
    }
}

/// Look up the role of a `KeyboardEvent.key` value
pub fn key_role(bindings: &KeyBindings, key: &str) -> Option<KeyRole> {
    let table: [(&Vec<String>, KeyRole); 8] = [
        (&bindings.up, KeyRole::Up),
        (&bindings.down, KeyRole::Down),
        (&bindings.left, KeyRole::Left),
        (&bindings.right, KeyRole::Right),
        (&bindings.sprint, KeyRole::Sprint),
        (&bindings.melee, KeyRole::Melee),
        (&bindings.spell, KeyRole::Spell),
        (&bindings.heal, KeyRole::Heal),
    ];
    table
        .iter()
        .find(|(keys, _)| keys.iter().any(|k| key_matches(k, key)))
        .map(|(_, role)| *role)
}

/// Currently held movement keys
#[derive(Debug, Clone, Copy, Default)]
pub struct HeldKeys {
    input: TickInput,
}

impl HeldKeys {
    /// Update held state. Returns false for non-held roles.
    pub fn set(&mut self, role: KeyRole, down: bool) -> bool {
        let slot = match role {
            KeyRole::Up => &mut self.input.up,
            KeyRole::Down => &mut self.input.down,
            KeyRole::Left => &mut self.input.left,
            KeyRole::Right => &mut self.input.right,
            KeyRole::Sprint => &mut self.input.sprint,
            _ => return false,
        };
        *slot = down;
        true
    }

    /// Drop everything (window blur loses keyup events)
    pub fn release_all(&mut self) {
        self.input = TickInput::default();
    }

    pub fn tick_input(&self) -> TickInput {
        self.input
    }
}

/// Map a pointer position on the displayed canvas to playfield coordinates
pub fn canvas_to_playfield(offset: Vec2, client_size: Vec2) -> Vec2 {
    if client_size.x <= 0.0 || client_size.y <= 0.0 {
        return offset;
    }
    Vec2::new(
        offset.x * PLAYFIELD_WIDTH / client_size.x,
        offset.y * PLAYFIELD_HEIGHT / client_size.y,
    )
}

/// Monotonic clock in milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Monotonic clock in milliseconds since first call
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}
