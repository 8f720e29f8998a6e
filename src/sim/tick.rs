//! Per-frame update dispatch
//!
//! `Game` owns the progress record and every gameplay component. The host
//! calls [`Game::tick`] once per frame and reports world happenings through
//! [`Game::handle`]; everything else flows through the event queue.

use super::context::{GameContext, GameplayComponent};
use super::event::{EventQueue, GameEvent};
use super::flow::{FlowPhase, GameFlowController};
use super::ledger::ScoreLedger;
use super::player::PlayerMovement;
use super::scheduler::Scheduler;
use super::timer::RoundTimer;
use crate::persistence::{PersistedGameData, ProgressStore};
use crate::platform::Host;
use crate::settings::GameConfig;

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal axis, -1.0 (left) to 1.0 (right)
    pub horizontal: f32,
    /// Reset all progress (debug/escape key)
    pub reset_requested: bool,
}

/// Mutable borrows of the components, split from the rest of `Game`
struct Components<'a> {
    flow: &'a mut GameFlowController,
    timer: &'a mut RoundTimer,
    player: &'a mut PlayerMovement,
}

impl Components<'_> {
    /// Dispatch order: flow first so its state is settled before the others react
    fn each(&mut self) -> [&mut dyn GameplayComponent; 3] {
        [&mut *self.flow, &mut *self.timer, &mut *self.player]
    }
}

/// The running game: progress, components and the dispatch loop
pub struct Game {
    config: GameConfig,
    store: ProgressStore,
    data: PersistedGameData,
    scheduler: Scheduler,
    events: EventQueue,
    flow: GameFlowController,
    timer: RoundTimer,
    player: PlayerMovement,
    enabled: bool,
}

impl Game {
    pub fn new(config: GameConfig, store: ProgressStore) -> Self {
        let store = store.with_level_count(config.level_count);
        let data = store.defaults();
        Self {
            timer: RoundTimer::new(config.max_time),
            player: PlayerMovement::new(config.player_speed),
            flow: GameFlowController::new(),
            scheduler: Scheduler::new(),
            events: EventQueue::new(),
            config,
            store,
            data,
            enabled: false,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn data(&self) -> &PersistedGameData {
        &self.data
    }

    pub fn score(&self) -> u32 {
        self.data.score
    }

    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    pub fn player(&self) -> &PlayerMovement {
        &self.player
    }

    pub fn phase(&self) -> FlowPhase {
        self.flow.phase()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Load progress, initialise the HUD and start the first round
    pub fn enable(&mut self, host: &mut dyn Host) {
        if self.enabled {
            return;
        }
        self.data = self.store.load();
        self.enabled = true;
        log::info!("Game enabled");

        self.dispatch(host, |component, ctx| component.on_enable(ctx));
        self.events.push_back(GameEvent::RoundStarted);
        self.drain_events(host);
    }

    /// Save progress and drop anything still scheduled
    pub fn disable(&mut self, host: &mut dyn Host) {
        if !self.enabled {
            return;
        }
        self.dispatch(host, |component, ctx| component.on_disable(ctx));
        self.scheduler.cancel_all();
        self.events.clear();
        self.enabled = false;
        log::info!("Game disabled");
    }

    /// Advance one frame
    pub fn tick(&mut self, host: &mut dyn Host, input: &TickInput, dt: f32) {
        if !self.enabled {
            return;
        }

        for action in self.scheduler.advance(dt) {
            self.with_context(host, |components, ctx| components.flow.on_deferred(ctx, action));
            self.drain_events(host);
        }

        self.dispatch(host, |component, ctx| component.update(ctx, input, dt));
        self.drain_events(host);
    }

    /// Report something that happened in the world
    pub fn handle(&mut self, host: &mut dyn Host, event: GameEvent) {
        if !self.enabled {
            log::warn!("Dropping {event:?}: game not enabled");
            return;
        }
        self.events.push_back(event);
        self.drain_events(host);
    }

    /// Begin a new round (after game over, or when the host loads a level)
    pub fn start_round(&mut self, host: &mut dyn Host) {
        self.handle(host, GameEvent::RoundStarted);
    }

    /// Run ledger operations directly (level menus, scripted rewards)
    pub fn with_ledger<R>(
        &mut self,
        host: &mut dyn Host,
        f: impl FnOnce(&mut ScoreLedger<'_>) -> R,
    ) -> R {
        let result = self.with_context(host, |_, ctx| f(&mut ctx.ledger()));
        self.drain_events(host);
        result
    }

    fn with_context<R>(
        &mut self,
        host: &mut dyn Host,
        f: impl FnOnce(&mut Components<'_>, &mut GameContext<'_>) -> R,
    ) -> R {
        let Game {
            config,
            store,
            data,
            scheduler,
            events,
            flow,
            timer,
            player,
            ..
        } = self;
        let mut ctx = GameContext {
            config,
            data,
            store,
            scheduler,
            events,
            host,
        };
        let mut components = Components { flow, timer, player };
        f(&mut components, &mut ctx)
    }

    fn dispatch(
        &mut self,
        host: &mut dyn Host,
        mut f: impl FnMut(&mut dyn GameplayComponent, &mut GameContext<'_>),
    ) {
        self.with_context(host, |components, ctx| {
            for component in components.each() {
                f(component, ctx);
            }
        });
    }

    fn drain_events(&mut self, host: &mut dyn Host) {
        while let Some(event) = self.events.pop_front() {
            log::debug!("Dispatching {event:?}");
            self.dispatch(host, |component, ctx| component.on_event(ctx, &event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::persistence::MemoryStorage;
    use crate::platform::{HeadlessHost, HostCommand};

    fn enabled_game(config: GameConfig) -> (Game, HeadlessHost) {
        let mut host = HeadlessHost::new();
        let mut game = Game::new(config, ProgressStore::new(MemoryStorage::new()));
        game.enable(&mut host);
        (game, host)
    }

    fn run(game: &mut Game, host: &mut HeadlessHost, input: &TickInput, seconds: f32) {
        let steps = (seconds / SIM_DT).round() as usize;
        for _ in 0..steps {
            game.tick(host, input, SIM_DT);
        }
    }

    #[test]
    fn test_enable_initialises_first_boot() {
        let (game, host) = enabled_game(GameConfig::default());

        assert!(game.is_enabled());
        assert!(!game.data().is_first_boot);
        assert_eq!(game.phase(), FlowPhase::Playing);
        assert!(game.timer().is_running());
        assert!(host.commands().contains(&HostCommand::Panel(crate::platform::Panel::BossHealth, false)));
        assert!(host.commands().contains(&HostCommand::Timer(60)));
    }

    #[test]
    fn test_tick_ignored_until_enabled() {
        let mut host = HeadlessHost::new();
        let mut game = Game::new(GameConfig::default(), ProgressStore::new(MemoryStorage::new()));

        game.tick(&mut host, &TickInput::default(), 1.0);
        game.handle(&mut host, GameEvent::PlayerDied);

        assert!(host.commands().is_empty());
        assert_eq!(game.data().lives, MAX_LIVES);
    }

    #[test]
    fn test_movement_follows_axis() {
        let config = GameConfig {
            player_speed: 3.0,
            ..Default::default()
        };
        let (mut game, mut host) = enabled_game(config);

        let right = TickInput {
            horizontal: 1.0,
            ..Default::default()
        };
        game.tick(&mut host, &right, SIM_DT);
        game.tick(&mut host, &right, SIM_DT);
        assert_eq!(game.player().velocity_x(), 3.0);
        assert_eq!(host.count(|c| *c == HostCommand::PlayerVelocityX(3.0)), 1);

        game.tick(&mut host, &TickInput::default(), SIM_DT);
        assert_eq!(game.player().velocity_x(), 0.0);
    }

    #[test]
    fn test_timer_expiry_kills_once() {
        let (mut game, mut host) = enabled_game(GameConfig::default());
        host.take_commands();

        run(&mut game, &mut host, &TickInput::default(), 61.0);

        assert_eq!(game.timer().display_seconds(), 0);
        assert_eq!(
            host.last(|c| matches!(c, HostCommand::Timer(_))),
            Some(&HostCommand::Timer(0))
        );
        assert_eq!(host.count(|c| *c == HostCommand::ObjectActive(crate::platform::WorldObject::Player, false)), 1);
        assert_eq!(game.data().lives, MAX_LIVES - 1);
        assert_eq!(game.phase(), FlowPhase::AwaitingRestart);
    }

    #[test]
    fn test_restart_starts_new_round() {
        let (mut game, mut host) = enabled_game(GameConfig::default());
        run(&mut game, &mut host, &TickInput::default(), 10.0);

        game.handle(&mut host, GameEvent::PlayerDrowned);
        assert!(!game.player().is_enabled());
        run(&mut game, &mut host, &TickInput::default(), DEFAULT_RESTART_DELAY + 0.1);

        assert_eq!(host.count(|c| *c == HostCommand::RestartLevel), 1);
        assert_eq!(game.phase(), FlowPhase::Playing);
        assert!(game.player().is_enabled());
        assert!(game.timer().remaining() > 59.0);
    }

    #[test]
    fn test_ignored_death_keeps_movement() {
        let (mut game, mut host) = enabled_game(GameConfig::default());
        game.handle(&mut host, GameEvent::LevelCompleted { level: 1, stars: 2 });
        assert_eq!(game.phase(), FlowPhase::LevelComplete);

        game.handle(&mut host, GameEvent::PlayerDrowned);
        game.handle(&mut host, GameEvent::PlayerDied);

        assert!(game.player().is_enabled());
        assert_eq!(game.data().lives, MAX_LIVES);
    }

    #[test]
    fn test_disable_saves_and_cancels() {
        let storage = MemoryStorage::new();
        let mut host = HeadlessHost::new();
        let mut game = Game::new(GameConfig::default(), ProgressStore::new(storage.clone()));
        game.enable(&mut host);

        game.handle(&mut host, GameEvent::PlayerDrowned);
        assert_eq!(game.scheduler().pending(), 1);
        game.disable(&mut host);

        assert_eq!(game.scheduler().pending(), 0);
        let saved = ProgressStore::new(storage).load();
        assert_eq!(saved.lives, MAX_LIVES - 1);
        assert!(!saved.is_first_boot);
    }

    #[test]
    fn test_with_ledger_reports_score() {
        let (mut game, mut host) = enabled_game(GameConfig::default());
        let score = game.with_ledger(&mut host, |ledger| {
            ledger.add_coin();
            ledger.award_score(crate::sim::ScoreKind::Enemy);
            ledger.score()
        });
        assert_eq!(score, GameConfig::default().scores.enemy);
        assert_eq!(game.data().coin_count, 1);
    }
}
