//! Save/load persistence with corruption recovery
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic replace (tmp → save) for the file backend
//! - Corruption detection with fallback to defaults
//! - Normalisation of loaded records (level list, lives, stars)

pub mod data;
pub mod levels;
pub mod storage;
pub mod store;

pub use data::{InvalidKeyIndex, KeyIndex, PersistedGameData};
pub use levels::{LevelRecord, LevelUnlockTracker};
pub use storage::{FileStorage, MemoryStorage, SaveStorage};
pub use store::ProgressStore;

use thiserror::Error;

/// Failures reading or writing the save slot
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("save data is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("failed to encode save data: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("save format version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}
