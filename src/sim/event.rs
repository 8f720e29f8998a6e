//! Gameplay events routed through the dispatch loop
//!
//! The host reports what happened in the world (collisions, triggers);
//! components also push events for each other (timer expiry, gate reveal).

use std::collections::VecDeque;

use glam::Vec2;

use crate::platform::EntityId;

/// Kind of coin picked up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinKind {
    Small,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Player killed by an enemy: death animation, then `PlayerDied`
    PlayerKilled,
    /// Player is dead (timer ran out or death animation finished)
    PlayerDied,
    /// Player fell into water
    PlayerDrowned,
    /// A death was accepted; player control stops until the next round
    PlayerDown,
    EnemyStomped { enemy: EntityId },
    EnemyShot { enemy: EntityId, pos: Vec2 },
    CoinCollected { coin: EntityId, kind: CoinKind },
    /// Raw key index from the level; validated on receipt
    KeyCollected { index: usize },
    LevelCompleted { level: u32, stars: u8 },
    /// Player picked a level from the menu
    LevelSelected { level: u32 },
    BossBattleStarted,
    BossDefeated { lever: Vec2 },
    /// Debug/escape reset of all progress
    ResetRequested,
    /// Both gate keys are held; the boss gate is open
    BossGateRevealed,
    /// A fresh round began (level start or restart)
    RoundStarted,
}

/// FIFO of pending events
pub type EventQueue = VecDeque<GameEvent>;
