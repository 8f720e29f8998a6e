//! Shared services lent to every gameplay component

use super::event::{EventQueue, GameEvent};
use super::ledger::ScoreLedger;
use super::scheduler::Scheduler;
use super::tick::TickInput;
use crate::persistence::{PersistedGameData, ProgressStore};
use crate::platform::{Host, hearts_for_lives};
use crate::settings::GameConfig;

/// Everything a component may touch during one dispatch
pub struct GameContext<'a> {
    pub config: &'a GameConfig,
    pub data: &'a mut PersistedGameData,
    pub store: &'a ProgressStore,
    pub scheduler: &'a mut Scheduler,
    pub events: &'a mut EventQueue,
    pub host: &'a mut dyn Host,
}

impl GameContext<'_> {
    /// Score/coin/key/level accounting over the current progress
    pub fn ledger(&mut self) -> ScoreLedger<'_> {
        ScoreLedger::new(&mut *self.data, &self.config.scores, &mut *self.host, &mut *self.events)
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    /// Save progress; a failed save is logged and play continues
    pub fn persist(&mut self) {
        if let Err(e) = self.store.save(self.data) {
            log::error!("Failed to save progress: {e}");
        }
    }

    /// Push coin count, score and hearts to the HUD
    pub fn refresh_hud(&mut self) {
        self.host.set_coin_count(self.data.coin_count);
        self.host.set_score(self.data.score);
        self.refresh_hearts();
    }

    pub fn refresh_hearts(&mut self) {
        self.host.set_hearts(hearts_for_lives(self.data.lives));
    }
}

/// Lifecycle hooks driven by the dispatch loop in [`super::Game`]
pub trait GameplayComponent {
    /// Game became active (progress just loaded)
    fn on_enable(&mut self, _ctx: &mut GameContext<'_>) {}

    /// Game is shutting down
    fn on_disable(&mut self, _ctx: &mut GameContext<'_>) {}

    /// Once per frame
    fn update(&mut self, _ctx: &mut GameContext<'_>, _input: &TickInput, _dt: f32) {}

    /// Once per dispatched event
    fn on_event(&mut self, _ctx: &mut GameContext<'_>, _event: &GameEvent) {}
}
