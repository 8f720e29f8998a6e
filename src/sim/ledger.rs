//! Score, coin, key and level accounting
//!
//! The ledger mutates [`PersistedGameData`] and mirrors every change to the
//! HUD straight away. It never saves; lifecycle boundaries do that.

use glam::Vec2;

use super::event::{EventQueue, GameEvent};
use crate::persistence::{KeyIndex, PersistedGameData};
use crate::platform::{Host, Panel, SoundEffect, WorldObject};
use crate::settings::ScoreTable;

/// Things worth points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreKind {
    Coin,
    BigCoin,
    Enemy,
}

impl ScoreKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "coin" => Some(ScoreKind::Coin),
            "bigcoin" | "big_coin" => Some(ScoreKind::BigCoin),
            "enemy" => Some(ScoreKind::Enemy),
            _ => None,
        }
    }
}

impl ScoreTable {
    pub fn value(&self, kind: ScoreKind) -> u32 {
        match kind {
            ScoreKind::Coin => self.coin,
            ScoreKind::BigCoin => self.big_coin,
            ScoreKind::Enemy => self.enemy,
        }
    }
}

/// Borrowed view that applies scoring events to the progress record
pub struct ScoreLedger<'a> {
    data: &'a mut PersistedGameData,
    scores: &'a ScoreTable,
    host: &'a mut dyn Host,
    events: &'a mut EventQueue,
}

impl<'a> ScoreLedger<'a> {
    pub fn new(
        data: &'a mut PersistedGameData,
        scores: &'a ScoreTable,
        host: &'a mut dyn Host,
        events: &'a mut EventQueue,
    ) -> Self {
        Self {
            data,
            scores,
            host,
            events,
        }
    }

    /// Current score (shown on the level-complete menu)
    pub fn score(&self) -> u32 {
        self.data.score
    }

    pub fn add_coin(&mut self) {
        self.data.coin_count = self.data.coin_count.saturating_add(1);
        self.host.set_coin_count(self.data.coin_count);
    }

    pub fn award_score(&mut self, kind: ScoreKind) {
        let value = self.scores.value(kind);
        self.data.score = self.data.score.saturating_add(value);
        self.host.set_score(self.data.score);
    }

    /// Award by host-supplied name; unknown names are worth nothing
    pub fn award_score_named(&mut self, name: &str) {
        match ScoreKind::from_name(name) {
            Some(kind) => self.award_score(kind),
            None => {
                log::warn!("Unknown score kind {name:?}, awarding 0");
                self.host.set_score(self.data.score);
            }
        }
    }

    /// Mark a key found. Finding the second gate key opens the boss gate.
    pub fn collect_key(&mut self, key: KeyIndex) {
        let gate_was_open = self.data.boss_gate_unlocked();

        self.data.key_found[key.get()] = true;
        self.host.set_key_icon(key, true);
        self.host.play_sound(SoundEffect::KeyPickup);

        if !gate_was_open && self.data.boss_gate_unlocked() {
            self.reveal_boss_gate();
        }
    }

    /// Activate the gate, show boss health and freeze the round timer
    pub fn reveal_boss_gate(&mut self) {
        log::info!("Boss gate revealed");
        self.host.set_object_active(WorldObject::BossGate, true);
        let pos = self
            .host
            .object_position(WorldObject::BossGate)
            .unwrap_or(Vec2::ZERO);
        self.host.landing(pos);
        self.host.set_panel_visible(Panel::BossHealth, true);
        self.events.push_back(GameEvent::BossGateRevealed);
    }

    /// Returns false if the level doesn't exist
    pub fn set_stars_awarded(&mut self, level_number: u32, stars: u8) -> bool {
        let stored = self.data.level_data.set_stars(level_number, stars);
        if stored {
            log::info!("Level {level_number}: {stars} stars awarded");
        }
        stored
    }

    /// Unlock the level after `level_number`; no-op after the last level
    pub fn unlock_level(&mut self, level_number: u32) -> bool {
        let unlocked = self.data.level_data.unlock_after(level_number);
        if unlocked {
            log::info!("Level {} unlocked", level_number + 1);
        } else {
            log::debug!("Level {level_number} is the last level, nothing to unlock");
        }
        unlocked
    }
}
