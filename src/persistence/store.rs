//! Load/save/reset of player progress

use serde::{Deserialize, Serialize};

use super::PersistenceError;
use super::data::PersistedGameData;
use super::storage::SaveStorage;
use crate::consts::{DEFAULT_LEVEL_COUNT, SAVE_VERSION};

/// On-disk wrapper carrying the format version
#[derive(Debug, Serialize, Deserialize)]
struct SaveEnvelope<T> {
    version: u32,
    data: T,
}

/// Progress persistence over a single save slot
pub struct ProgressStore {
    storage: Box<dyn SaveStorage>,
    level_count: u32,
}

impl ProgressStore {
    pub fn new(storage: impl SaveStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            level_count: DEFAULT_LEVEL_COUNT,
        }
    }

    /// Number of levels loaded records are normalised to
    pub fn with_level_count(mut self, level_count: u32) -> Self {
        self.level_count = level_count.max(1);
        self
    }

    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    /// Fresh first-boot record sized for this store
    pub fn defaults(&self) -> PersistedGameData {
        PersistedGameData::new(self.level_count)
    }

    /// Strict load: `Ok(None)` if nothing was saved yet
    pub fn try_load(&self) -> Result<Option<PersistedGameData>, PersistenceError> {
        let Some(bytes) = self.storage.read()? else {
            return Ok(None);
        };

        let envelope: SaveEnvelope<serde_json::Value> =
            serde_json::from_slice(&bytes).map_err(PersistenceError::Corrupt)?;
        if envelope.version > SAVE_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: envelope.version,
                supported: SAVE_VERSION,
            });
        }

        let mut data: PersistedGameData =
            serde_json::from_value(envelope.data).map_err(PersistenceError::Corrupt)?;
        data.normalize(self.level_count);
        Ok(Some(data))
    }

    /// Load saved progress; a missing or unreadable save yields defaults
    pub fn load(&self) -> PersistedGameData {
        match self.try_load() {
            Ok(Some(data)) => {
                log::info!("Progress loaded from {}", self.storage.describe());
                data
            }
            Ok(None) => {
                log::info!("No save at {}, starting fresh", self.storage.describe());
                self.defaults()
            }
            Err(e) => {
                log::warn!("Save at {} unusable ({e}), using defaults", self.storage.describe());
                self.defaults()
            }
        }
    }

    /// Overwrite the save with `data`
    pub fn save(&self, data: &PersistedGameData) -> Result<(), PersistenceError> {
        let envelope = SaveEnvelope {
            version: SAVE_VERSION,
            data,
        };
        let bytes = serde_json::to_vec_pretty(&envelope).map_err(PersistenceError::Serialize)?;
        self.storage.write(&bytes)?;
        log::debug!("Progress saved to {}", self.storage.describe());
        Ok(())
    }

    /// Reset `data` to a fresh run and persist it
    pub fn reset(&self, data: &mut PersistedGameData) -> Result<(), PersistenceError> {
        data.reset();
        self.save(data)?;
        log::info!("Progress reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::persistence::{FileStorage, MemoryStorage};
    use proptest::prelude::*;

    fn memory_store() -> (ProgressStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        (ProgressStore::new(storage.clone()), storage)
    }

    #[test]
    fn test_missing_save_gives_defaults() {
        let (store, _) = memory_store();
        assert!(store.try_load().unwrap().is_none());

        let data = store.load();
        assert!(data.is_first_boot);
        assert_eq!(data.lives, MAX_LIVES);
        assert_eq!(data.level_data.len(), DEFAULT_LEVEL_COUNT as usize);
    }

    #[test]
    fn test_corrupt_save_falls_back() {
        let (store, storage) = memory_store();
        storage.set_contents("{ this is not json");

        assert!(matches!(store.try_load(), Err(PersistenceError::Corrupt(_))));
        assert_eq!(store.load(), store.defaults());
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let (store, storage) = memory_store();
        storage.set_contents(r#"{ "version": 1, "data": { "score": "lots" } }"#);
        assert!(matches!(store.try_load(), Err(PersistenceError::Corrupt(_))));
    }

    #[test]
    fn test_newer_version_rejected() {
        let (store, storage) = memory_store();
        let mut data = store.defaults();
        data.score = 99;
        store.save(&data).unwrap();

        let text = String::from_utf8(storage.contents().unwrap()).unwrap();
        storage.set_contents(text.replacen("\"version\": 1", "\"version\": 7", 1));

        assert!(matches!(
            store.try_load(),
            Err(PersistenceError::UnsupportedVersion { found: 7, .. })
        ));
        assert_eq!(store.load().score, 0);
    }

    #[test]
    fn test_load_grows_level_list() {
        let storage = MemoryStorage::new();
        let small = ProgressStore::new(storage.clone()).with_level_count(2);
        small.save(&small.defaults()).unwrap();

        let large = ProgressStore::new(storage).with_level_count(5);
        let data = large.load();
        assert_eq!(data.level_data.len(), 5);
        assert!(data.level_data.is_unlocked(1));
        assert!(!data.level_data.is_unlocked(5));
    }

    #[test]
    fn test_reset_persists_defaults() {
        let (store, _) = memory_store();
        let mut data = store.defaults();
        data.is_first_boot = false;
        data.score = 120;
        data.coin_count = 8;
        data.lives = 1;
        data.key_found = [true, false, true];
        data.level_data.unlock_after(1);
        data.level_data.unlock_after(2);
        data.level_data.set_stars(2, 3);
        store.save(&data).unwrap();

        store.reset(&mut data).unwrap();
        let loaded = store.load();

        assert_eq!(loaded, data);
        assert_eq!(loaded.score, 0);
        assert_eq!(loaded.coin_count, 0);
        assert_eq!(loaded.lives, MAX_LIVES);
        assert_eq!(loaded.key_found, [false; KEY_COUNT]);
        assert!(loaded.level_data.is_unlocked(1));
        assert!(loaded.level_data.iter().skip(1).all(|l| !l.is_unlocked));
        assert!(loaded.level_data.iter().all(|l| l.stars_awarded == 0));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(FileStorage::new(dir.path().join("game.json")));

        let mut data = store.defaults();
        data.handle_first_boot();
        data.coin_count = 3;
        data.key_found[2] = true;
        store.save(&data).unwrap();

        let reopened = ProgressStore::new(FileStorage::new(dir.path().join("game.json")));
        assert_eq!(reopened.load(), data);
    }

    fn arb_data() -> impl Strategy<Value = PersistedGameData> {
        (
            any::<u32>(),
            any::<u32>(),
            1u8..=MAX_LIVES,
            any::<[bool; KEY_COUNT]>(),
            any::<bool>(),
            prop::collection::vec((any::<bool>(), 0u8..=MAX_STARS), DEFAULT_LEVEL_COUNT as usize),
        )
            .prop_map(|(coin_count, score, lives, key_found, is_first_boot, levels)| {
                let mut data = PersistedGameData::new(DEFAULT_LEVEL_COUNT);
                data.coin_count = coin_count;
                data.score = score;
                data.lives = lives;
                data.key_found = key_found;
                data.is_first_boot = is_first_boot;
                for (i, (unlocked, stars)) in levels.into_iter().enumerate() {
                    let level = i as u32 + 1;
                    if unlocked {
                        data.level_data.unlock_after(level - 1);
                    }
                    data.level_data.set_stars(level, stars);
                }
                data
            })
    }

    proptest! {
        #[test]
        fn prop_save_load_round_trip(data in arb_data()) {
            let (store, _) = memory_store();
            store.save(&data).unwrap();
            prop_assert_eq!(store.load(), data);
        }
    }
}
