//! Explore/combat simulation
//!
//! All gameplay logic lives here. This module must stay free of rendering
//! and platform dependencies:
//! - Explicit `GameState` context, no globals
//! - Seeded or scripted rolls only
//! - Stable iteration order (by entity ID)
//! - Collections are compacted with `retain`, never edited mid-iteration

pub mod abilities;
pub mod ai;
pub mod class;
pub mod collision;
pub mod dice;
pub mod feedback;
pub mod pool;
pub mod projectile;
pub mod state;
pub mod tick;

pub use abilities::{AbilityKind, AbilityOutcome, cast_spell, heal, melee_attack, ranged_attack};
pub use ai::{Behavior, apply_separation, separation_displacement, update_enemies};
pub use class::{BaseStats, ClassKind, ClassModifiers};
pub use collision::{CollisionResult, circle_collision, circles_touch, resolve_player_enemy};
pub use dice::Dice;
pub use feedback::{EventLog, FeedbackColor, FeedbackEvent, NullSink, PresentationSink};
pub use pool::ResourcePool;
pub use state::{Cooldowns, Enemy, GameState, Player, Projectile, RunMode};
pub use tick::{TickInput, tick};
