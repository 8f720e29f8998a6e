//! Persisted player progress

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::levels::LevelUnlockTracker;
use crate::consts::*;

/// A key index outside `0..KEY_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("key index {0} out of range (expected < {max})", max = KEY_COUNT)]
pub struct InvalidKeyIndex(pub usize);

/// Validated index of one of the collectible keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyIndex(u8);

impl KeyIndex {
    pub const FIRST: KeyIndex = KeyIndex(0);
    pub const SECOND: KeyIndex = KeyIndex(1);
    pub const THIRD: KeyIndex = KeyIndex(2);
    pub const ALL: [KeyIndex; KEY_COUNT] = [Self::FIRST, Self::SECOND, Self::THIRD];

    pub fn get(self) -> usize {
        usize::from(self.0)
    }
}

impl TryFrom<usize> for KeyIndex {
    type Error = InvalidKeyIndex;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        if index < KEY_COUNT {
            Ok(KeyIndex(index as u8))
        } else {
            Err(InvalidKeyIndex(index))
        }
    }
}

/// Everything that survives between sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedGameData {
    pub coin_count: u32,
    pub score: u32,
    /// Remaining lives (0-3, 0 only transiently)
    pub lives: u8,
    pub key_found: [bool; KEY_COUNT],
    pub is_first_boot: bool,
    pub level_data: LevelUnlockTracker,
}

impl Default for PersistedGameData {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL_COUNT)
    }
}

impl PersistedGameData {
    /// Fresh first-boot record for a campaign of `level_count` levels
    pub fn new(level_count: u32) -> Self {
        Self {
            coin_count: 0,
            score: 0,
            lives: MAX_LIVES,
            key_found: [false; KEY_COUNT],
            is_first_boot: true,
            level_data: LevelUnlockTracker::new(level_count),
        }
    }

    /// Initialise counters on the very first boot.
    /// Returns true if anything was changed.
    pub fn handle_first_boot(&mut self) -> bool {
        if !self.is_first_boot {
            return false;
        }
        self.clear_counters();
        self.is_first_boot = false;
        log::info!("First boot: progress initialised");
        true
    }

    /// Back to a fresh run, keeping level 1 unlocked
    pub fn reset(&mut self) {
        self.clear_counters();
        self.level_data.reset();
    }

    fn clear_counters(&mut self) {
        self.lives = MAX_LIVES;
        self.coin_count = 0;
        self.key_found = [false; KEY_COUNT];
        self.score = 0;
    }

    /// Both gate keys collected
    pub fn boss_gate_unlocked(&self) -> bool {
        self.key_found[0] && self.key_found[1]
    }

    pub fn has_key(&self, key: KeyIndex) -> bool {
        self.key_found[key.get()]
    }

    /// Bring a loaded record back inside its invariants
    pub fn normalize(&mut self, level_count: u32) {
        if self.lives == 0 || self.lives > MAX_LIVES {
            log::warn!("Loaded lives {} out of range, using {MAX_LIVES}", self.lives);
            self.lives = MAX_LIVES;
        }
        self.level_data.normalize(level_count);
    }
}
