//! Clamped resource pools (HP and mana)

use serde::{Deserialize, Serialize};

/// A numeric pool with a maximum capacity.
///
/// Invariant: `0 <= current <= max` after every operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    current: f32,
    max: f32,
}

impl ResourcePool {
    /// A full pool
    pub fn full(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// A pool with an explicit current value (clamped into range)
    pub fn new(current: f32, max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: current.clamp(0.0, max),
            max,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    /// Fraction full (0-1) for bar displays
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }

    /// Spend `amount` if available. No partial spend.
    pub fn spend(&mut self, amount: f32) -> bool {
        if amount > self.current {
            return false;
        }
        self.current = (self.current - amount.max(0.0)).clamp(0.0, self.max);
        true
    }

    /// Add `amount`, clamped to max. Returns the amount actually restored.
    pub fn restore(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + amount.max(0.0)).min(self.max);
        self.current - before
    }

    /// Periodic regeneration tick
    pub fn regenerate(&mut self, rate: f32) -> f32 {
        self.restore(rate)
    }

    /// Take damage, flooring at zero. Returns the amount actually removed.
    pub fn drain(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current - amount.max(0.0)).max(0.0);
        before - self.current
    }

    /// Raise the capacity by `bonus` and refill
    pub fn grow(&mut self, bonus: f32) {
        self.max = (self.max + bonus).max(0.0);
        self.current = self.max;
    }
}
