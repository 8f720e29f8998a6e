//! Per-level unlock and star tracking

use serde::{Deserialize, Serialize};

use crate::consts::MAX_STARS;

/// Progress for a single level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
    /// 1-based level number
    pub level_number: u32,
    pub is_unlocked: bool,
    /// Stars awarded on the best completion (0-3)
    pub stars_awarded: u8,
}

impl LevelRecord {
    pub fn new(level_number: u32) -> Self {
        Self {
            level_number,
            is_unlocked: level_number == 1,
            stars_awarded: 0,
        }
    }
}

/// Ordered level records, one per level, starting at level 1.
///
/// Records stay sorted by level number and level 1 is always unlocked.
/// Lookups that miss (a level past the end, or level 0) are no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelUnlockTracker {
    levels: Vec<LevelRecord>,
}

impl Default for LevelUnlockTracker {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_LEVEL_COUNT)
    }
}

impl LevelUnlockTracker {
    /// Create records for levels `1..=count`
    pub fn new(count: u32) -> Self {
        Self {
            levels: (1..=count.max(1)).map(LevelRecord::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelRecord> {
        self.levels.iter()
    }

    pub fn record(&self, level_number: u32) -> Option<&LevelRecord> {
        self.levels.iter().find(|l| l.level_number == level_number)
    }

    fn record_mut(&mut self, level_number: u32) -> Option<&mut LevelRecord> {
        self.levels.iter_mut().find(|l| l.level_number == level_number)
    }

    pub fn is_unlocked(&self, level_number: u32) -> bool {
        self.record(level_number).is_some_and(|l| l.is_unlocked)
    }

    /// Store the stars for a level. Returns false if the level doesn't exist.
    pub fn set_stars(&mut self, level_number: u32, stars: u8) -> bool {
        let Some(record) = self.record_mut(level_number) else {
            return false;
        };
        if stars > MAX_STARS {
            log::warn!("Level {level_number}: clamping {stars} stars to {MAX_STARS}");
        }
        record.stars_awarded = stars.min(MAX_STARS);
        true
    }

    /// Unlock the level after `level_number`.
    /// Returns false when `level_number` is the last level.
    pub fn unlock_after(&mut self, level_number: u32) -> bool {
        let Some(next) = level_number.checked_add(1) else {
            return false;
        };
        match self.record_mut(next) {
            Some(record) => {
                record.is_unlocked = true;
                true
            }
            None => false,
        }
    }

    /// Clear stars everywhere and lock every level except level 1
    pub fn reset(&mut self) {
        for level in &mut self.levels {
            level.stars_awarded = 0;
            level.is_unlocked = level.level_number == 1;
        }
    }

    /// Repair a loaded tracker: sort, drop duplicates and stray entries,
    /// append missing levels up to `count`, clamp stars, unlock level 1.
    pub fn normalize(&mut self, count: u32) {
        self.levels.retain(|l| l.level_number >= 1);
        self.levels.sort_by_key(|l| l.level_number);
        self.levels.dedup_by_key(|l| l.level_number);

        for level_number in 1..=count.max(1) {
            if self.record(level_number).is_none() {
                self.levels.push(LevelRecord::new(level_number));
            }
        }
        self.levels.sort_by_key(|l| l.level_number);

        for level in &mut self.levels {
            level.stars_awarded = level.stars_awarded.min(MAX_STARS);
            if level.level_number == 1 {
                level.is_unlocked = true;
            }
        }
    }

    /// Sum of stars across all levels
    pub fn total_stars(&self) -> u32 {
        self.levels.iter().map(|l| u32::from(l.stars_awarded)).sum()
    }
}
