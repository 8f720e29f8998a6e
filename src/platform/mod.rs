//! Host engine abstraction layer
//!
//! The core never renders, simulates physics or plays audio. It issues
//! "set this value" commands through these traits and the host engine
//! carries them out:
//! - HUD text, icons and panels
//! - Scene restarts and level loads
//! - World objects and entities
//! - Visual/sound effects

pub mod headless;

pub use headless::{HeadlessHost, HostCommand};

use glam::Vec2;

use crate::persistence::KeyIndex;

/// Host-side handle for a spawned entity (coin, enemy, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// Heart icon states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartIcon {
    Full,
    Empty,
}

/// HUD panels the core shows and hides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    BossHealth,
    LevelComplete,
    GameOver,
}

/// Named scene objects toggled by the game flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldObject {
    Player,
    /// Sign platform leading to the boss battle
    BossGate,
    Lever,
    EnemySpawner,
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    CoinPickup,
    KeyPickup,
    EnemyExplosion,
    GameOver,
}

/// Heart row for a lives count, leftmost heart first.
///
/// Hearts empty from the left: 2 lives shows `[Empty, Full, Full]`.
pub fn hearts_for_lives(lives: u8) -> [HeartIcon; 3] {
    let mut hearts = [HeartIcon::Full; 3];
    let empty = 3usize.saturating_sub(usize::from(lives));
    for heart in hearts.iter_mut().take(empty) {
        *heart = HeartIcon::Empty;
    }
    hearts
}

/// HUD display updates
pub trait Hud {
    fn set_coin_count(&mut self, coins: u32);
    fn set_score(&mut self, score: u32);
    /// Whole seconds left on the round timer
    fn set_timer(&mut self, seconds: u32);
    fn set_hearts(&mut self, hearts: [HeartIcon; 3]);
    fn set_key_icon(&mut self, key: KeyIndex, found: bool);
    fn set_panel_visible(&mut self, panel: Panel, visible: bool);
}

/// Scene/level loading
pub trait SceneDirector {
    fn restart_level(&mut self);
    fn load_level(&mut self, level_number: u32);
}

/// Scene objects and entities owned by the engine
pub trait WorldControl {
    fn set_object_active(&mut self, object: WorldObject, active: bool);
    fn remove_entity(&mut self, entity: EntityId);
    fn spawn_big_coin(&mut self, pos: Vec2);
    /// Horizontal velocity; the engine keeps the vertical component
    fn set_player_velocity_x(&mut self, vx: f32);
    /// Knock the player back and let them fall through the floor
    fn play_player_death(&mut self);
}

/// Fire-and-forget visual and sound effects
pub trait Effects {
    fn enemy_explosion(&mut self, pos: Vec2);
    fn landing(&mut self, pos: Vec2);
    fn play_sound(&mut self, sound: SoundEffect);
}

/// Everything the core needs from the engine
pub trait Host: Hud + SceneDirector + WorldControl + Effects {
    /// World position of a scene object, if the engine knows it
    fn object_position(&self, _object: WorldObject) -> Option<Vec2> {
        None
    }
}
