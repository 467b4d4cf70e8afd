//! Common types for creatures

use serde::{Deserialize, Serialize};

/// Identifier of a creature within one world
///
/// Ids are handed out by the owner of the creature list; a freshly spawned
/// body carries `CreatureId::UNASSIGNED` until it is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CreatureId(u64);

impl CreatureId {
    pub const UNASSIGNED: CreatureId = CreatureId(0);

    pub fn from_raw(id: u64) -> Self {
        CreatureId(id)
    }

    /// Get the raw u64 value (useful for debugging)
    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for CreatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Creature({})", self.0)
    }
}

/// Energy store of a creature, bounded to `[0, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    pub current: f32,
    pub max: f32,
}

impl Energy {
    /// Upper bound of every creature's energy store
    pub const MAX: f32 = 200.0;

    pub fn new(current: f32) -> Self {
        Energy {
            current: current.clamp(0.0, Self::MAX),
            max: Self::MAX,
        }
    }

    /// Spend energy, never going below zero.
    /// Returns true if the store is depleted
    pub fn drain(&mut self, amount: f32) -> bool {
        self.current = (self.current - amount).max(0.0);
        self.is_depleted()
    }

    /// Add energy up to the cap
    pub fn gain(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Energy as a fraction of the cap (0.0 - 1.0)
    pub fn ratio(&self) -> f32 {
        if self.max > 0.0 {
            (self.current / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Default for Energy {
    fn default() -> Self {
        Self::new(100.0)
    }
}
