//! Cat Platformer - progress and round-flow core
//!
//! Core modules:
//! - `sim`: Gameplay components (score ledger, round timer, movement, flow control)
//! - `persistence`: Save/load of player progress with corruption recovery
//! - `platform`: Host engine collaborators (HUD, scene, world, effects)
//! - `settings`: Static tunables supplied at startup

pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use persistence::{LevelRecord, LevelUnlockTracker, PersistedGameData, ProgressStore};
pub use settings::{GameConfig, ScoreTable};
pub use sim::{Game, GameEvent, TickInput};

/// Game configuration constants
pub mod consts {
    /// Lives at the start of a run and after a game over
    pub const MAX_LIVES: u8 = 3;
    /// Number of collectible keys per run
    pub const KEY_COUNT: usize = 3;
    /// Most stars a level can award
    pub const MAX_STARS: u8 = 3;

    /// Default number of levels in the campaign
    pub const DEFAULT_LEVEL_COUNT: u32 = 3;
    /// Default round length in seconds
    pub const DEFAULT_MAX_TIME: f32 = 60.0;
    /// Delay between a life loss and the restart/game-over signal
    pub const DEFAULT_RESTART_DELAY: f32 = 2.0;
    /// Ragdoll pause before a killed player is resolved as dead
    pub const DEATH_PAUSE: f32 = 1.5;

    /// Fixed timestep used by the native runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Save file name inside the data directory
    pub const SAVE_FILE_NAME: &str = "game.json";
    /// Save envelope format version
    pub const SAVE_VERSION: u32 = 1;
}
