//! Game flow: lives, deaths, restarts, resets
//!
//! Reacts to gameplay events and turns them into progress changes and
//! host commands. Life loss is guarded so a second death trigger during a
//! death sequence is ignored until the restart or game-over signal fires.

use glam::Vec2;

use super::context::{GameContext, GameplayComponent};
use super::event::{CoinKind, GameEvent};
use super::ledger::ScoreKind;
use super::scheduler::{DeferredAction, TaskHandle};
use super::tick::TickInput;
use crate::consts::MAX_LIVES;
use crate::persistence::KeyIndex;
use crate::platform::{EntityId, Panel, SoundEffect, WorldObject};

/// Where the current round stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    /// Normal play; damage is accepted
    Playing,
    /// Death animation running
    Dying,
    /// Life lost; restart or game over is pending
    AwaitingRestart,
    /// Out of lives; waiting for the host to start a new round
    GameOver,
    /// Level finished; waiting for the host to load the next one
    LevelComplete,
}

#[derive(Debug)]
pub struct GameFlowController {
    phase: FlowPhase,
    pending: Option<TaskHandle>,
}

impl Default for GameFlowController {
    fn default() -> Self {
        Self::new()
    }
}

impl GameFlowController {
    pub fn new() -> Self {
        Self {
            phase: FlowPhase::Playing,
            pending: None,
        }
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// Initialise counters on the first ever boot. Idempotent.
    pub fn on_first_boot(&mut self, ctx: &mut GameContext<'_>) -> bool {
        ctx.data.handle_first_boot()
    }

    /// Killed by an enemy: play the death animation, die after a pause
    pub fn on_player_killed(&mut self, ctx: &mut GameContext<'_>) {
        if self.phase != FlowPhase::Playing {
            log::debug!("Ignoring kill during {:?}", self.phase);
            return;
        }
        self.phase = FlowPhase::Dying;
        ctx.emit(GameEvent::PlayerDown);
        ctx.host.play_player_death();
        self.pending = Some(
            ctx.scheduler
                .schedule(ctx.config.death_pause, DeferredAction::ResolveDeath),
        );
    }

    pub fn on_player_died(&mut self, ctx: &mut GameContext<'_>) {
        if !matches!(self.phase, FlowPhase::Playing | FlowPhase::Dying) {
            log::debug!("Ignoring death during {:?}", self.phase);
            return;
        }
        // A direct death during the animation supersedes the pending resolution
        if let Some(handle) = self.pending.take() {
            ctx.scheduler.cancel(handle);
        }
        ctx.host.set_object_active(WorldObject::Player, false);
        self.check_lives(ctx);
    }

    pub fn on_player_drowned(&mut self, ctx: &mut GameContext<'_>) {
        if self.phase != FlowPhase::Playing {
            log::debug!("Ignoring drowning during {:?}", self.phase);
            return;
        }
        self.check_lives(ctx);
    }

    /// Take a life, save, and schedule the restart or game over
    fn check_lives(&mut self, ctx: &mut GameContext<'_>) {
        ctx.emit(GameEvent::PlayerDown);
        ctx.data.lives = ctx.data.lives.saturating_sub(1);

        let action = if ctx.data.lives == 0 {
            log::info!("Out of lives");
            ctx.data.lives = MAX_LIVES;
            DeferredAction::GameOver
        } else {
            log::info!("Life lost, {} left", ctx.data.lives);
            DeferredAction::RestartLevel
        };

        ctx.persist();
        ctx.refresh_hearts();
        self.phase = FlowPhase::AwaitingRestart;
        self.pending = Some(ctx.scheduler.schedule(ctx.config.restart_delay, action));
    }

    /// A delayed action came due
    pub fn on_deferred(&mut self, ctx: &mut GameContext<'_>, action: DeferredAction) {
        self.pending = None;
        match action {
            DeferredAction::ResolveDeath => self.on_player_died(ctx),
            DeferredAction::RestartLevel => {
                ctx.host.restart_level();
                ctx.emit(GameEvent::RoundStarted);
            }
            DeferredAction::GameOver => {
                log::info!("Game over");
                self.phase = FlowPhase::GameOver;
                ctx.host.set_panel_visible(Panel::GameOver, true);
                ctx.host.play_sound(SoundEffect::GameOver);
            }
        }
    }

    pub fn on_enemy_stomped(&mut self, ctx: &mut GameContext<'_>, enemy: EntityId) {
        ctx.host.remove_entity(enemy);
        ctx.ledger().award_score(ScoreKind::Enemy);
    }

    /// Shot enemies explode and drop a big coin
    pub fn on_enemy_shot(&mut self, ctx: &mut GameContext<'_>, enemy: EntityId, pos: Vec2) {
        ctx.host.enemy_explosion(pos);
        ctx.host.spawn_big_coin(pos);
        ctx.host.remove_entity(enemy);
        ctx.host.play_sound(SoundEffect::EnemyExplosion);
    }

    pub fn on_coin_collected(&mut self, ctx: &mut GameContext<'_>, coin: EntityId, kind: CoinKind) {
        ctx.host.remove_entity(coin);
        ctx.host.play_sound(SoundEffect::CoinPickup);
        let mut ledger = ctx.ledger();
        ledger.add_coin();
        ledger.award_score(match kind {
            CoinKind::Small => ScoreKind::Coin,
            CoinKind::Big => ScoreKind::BigCoin,
        });
    }

    pub fn on_key_collected(&mut self, ctx: &mut GameContext<'_>, index: usize) {
        match KeyIndex::try_from(index) {
            Ok(key) => ctx.ledger().collect_key(key),
            Err(e) => log::warn!("Ignoring key pickup: {e}"),
        }
    }

    pub fn on_level_completed(&mut self, ctx: &mut GameContext<'_>, level: u32, stars: u8) {
        if self.phase != FlowPhase::Playing {
            log::debug!("Ignoring level completion during {:?}", self.phase);
            return;
        }
        self.phase = FlowPhase::LevelComplete;

        let mut ledger = ctx.ledger();
        if !ledger.set_stars_awarded(level, stars) {
            log::warn!("Completed unknown level {level}");
        }
        ledger.unlock_level(level);

        ctx.persist();
        ctx.host.set_panel_visible(Panel::LevelComplete, true);
    }

    /// Load a level if it has been unlocked
    pub fn on_level_selected(&mut self, ctx: &mut GameContext<'_>, level: u32) {
        if !ctx.data.level_data.is_unlocked(level) {
            log::warn!("Level {level} is locked");
            return;
        }
        ctx.host.load_level(level);
        ctx.emit(GameEvent::RoundStarted);
    }

    pub fn on_boss_battle_started(&mut self, ctx: &mut GameContext<'_>) {
        ctx.host.set_object_active(WorldObject::EnemySpawner, true);
    }

    /// Reveal the lever that releases the dog
    pub fn on_boss_defeated(&mut self, ctx: &mut GameContext<'_>, lever: Vec2) {
        ctx.host.set_object_active(WorldObject::Lever, true);
        ctx.host.set_object_active(WorldObject::EnemySpawner, false);
        ctx.host.landing(lever);
        ctx.host.play_sound(SoundEffect::EnemyExplosion);
    }

    /// Wipe all progress and redraw the HUD
    pub fn on_explicit_reset_request(&mut self, ctx: &mut GameContext<'_>) {
        if let Err(e) = ctx.store.reset(ctx.data) {
            log::error!("Progress reset but not saved: {e}");
        }
        ctx.refresh_hud();
        for key in KeyIndex::ALL {
            ctx.host.set_key_icon(key, false);
        }
    }

    /// Bring the HUD and world in line with a fresh round
    fn start_round(&mut self, ctx: &mut GameContext<'_>) {
        if let Some(handle) = self.pending.take() {
            if ctx.scheduler.cancel(handle) {
                log::debug!("Cancelled stale {handle:?}");
            }
        }
        self.phase = FlowPhase::Playing;

        ctx.host.set_object_active(WorldObject::Player, true);
        ctx.host.set_panel_visible(Panel::GameOver, false);
        ctx.host.set_panel_visible(Panel::LevelComplete, false);
        ctx.host.set_panel_visible(Panel::BossHealth, false);
        ctx.refresh_hud();
        for key in KeyIndex::ALL {
            ctx.host.set_key_icon(key, ctx.data.has_key(key));
        }

        if ctx.data.boss_gate_unlocked() {
            ctx.ledger().reveal_boss_gate();
        }
    }
}

impl GameplayComponent for GameFlowController {
    fn on_enable(&mut self, ctx: &mut GameContext<'_>) {
        self.on_first_boot(ctx);
        ctx.refresh_hud();
    }

    fn on_disable(&mut self, ctx: &mut GameContext<'_>) {
        self.pending = None;
        ctx.persist();
        log::info!("Progress saved on shutdown");
    }

    fn update(&mut self, ctx: &mut GameContext<'_>, input: &TickInput, _dt: f32) {
        if input.reset_requested {
            self.on_explicit_reset_request(ctx);
        }
    }

    fn on_event(&mut self, ctx: &mut GameContext<'_>, event: &GameEvent) {
        match *event {
            GameEvent::PlayerKilled => self.on_player_killed(ctx),
            GameEvent::PlayerDied => self.on_player_died(ctx),
            GameEvent::PlayerDrowned => self.on_player_drowned(ctx),
            GameEvent::EnemyStomped { enemy } => self.on_enemy_stomped(ctx, enemy),
            GameEvent::EnemyShot { enemy, pos } => self.on_enemy_shot(ctx, enemy, pos),
            GameEvent::CoinCollected { coin, kind } => self.on_coin_collected(ctx, coin, kind),
            GameEvent::KeyCollected { index } => self.on_key_collected(ctx, index),
            GameEvent::LevelCompleted { level, stars } => self.on_level_completed(ctx, level, stars),
            GameEvent::LevelSelected { level } => self.on_level_selected(ctx, level),
            GameEvent::BossBattleStarted => self.on_boss_battle_started(ctx),
            GameEvent::BossDefeated { lever } => self.on_boss_defeated(ctx, lever),
            GameEvent::ResetRequested => self.on_explicit_reset_request(ctx),
            GameEvent::RoundStarted => self.start_round(ctx),
            GameEvent::PlayerDown | GameEvent::BossGateRevealed => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::persistence::{MemoryStorage, ProgressStore};
    use crate::platform::{HeadlessHost, HeartIcon, HostCommand};
    use crate::settings::GameConfig;
    use crate::sim::Game;

    fn enabled_game() -> (Game, HeadlessHost, MemoryStorage) {
        let storage = MemoryStorage::new();
        let mut host = HeadlessHost::new().with_position(WorldObject::BossGate, Vec2::new(12.0, 4.0));
        let mut game = Game::new(GameConfig::default(), ProgressStore::new(storage.clone()));
        game.enable(&mut host);
        host.take_commands();
        (game, host, storage)
    }

    fn wait(game: &mut Game, host: &mut HeadlessHost, seconds: f32) {
        let steps = (seconds / SIM_DT).ceil() as usize;
        for _ in 0..steps {
            game.tick(host, &TickInput::default(), SIM_DT);
        }
    }

    fn game_overs(host: &HeadlessHost) -> usize {
        host.count(|c| *c == HostCommand::Panel(Panel::GameOver, true))
    }

    #[test]
    fn test_three_deaths_end_in_one_game_over() {
        let (mut game, mut host, _) = enabled_game();
        let delay = game.config().restart_delay + 0.1;

        game.handle(&mut host, GameEvent::PlayerDied);
        assert_eq!(game.data().lives, 2);
        wait(&mut game, &mut host, delay);
        assert_eq!(game.phase(), FlowPhase::Playing);

        game.handle(&mut host, GameEvent::PlayerDied);
        assert_eq!(game.data().lives, 1);
        wait(&mut game, &mut host, delay);

        game.handle(&mut host, GameEvent::PlayerDied);
        assert_eq!(game.data().lives, MAX_LIVES);
        assert_eq!(game_overs(&host), 0);
        wait(&mut game, &mut host, delay);

        assert_eq!(game_overs(&host), 1);
        assert_eq!(game.phase(), FlowPhase::GameOver);
        assert_eq!(host.count(|c| *c == HostCommand::RestartLevel), 2);

        game.handle(&mut host, GameEvent::PlayerDied);
        wait(&mut game, &mut host, delay * 2.0);
        assert_eq!(game_overs(&host), 1);
        assert_eq!(game.data().lives, MAX_LIVES);
    }

    #[test]
    fn test_repeated_death_trigger_is_ignored() {
        let (mut game, mut host, storage) = enabled_game();

        game.handle(&mut host, GameEvent::PlayerDied);
        game.handle(&mut host, GameEvent::PlayerDied);
        game.handle(&mut host, GameEvent::PlayerDrowned);
        wait(&mut game, &mut host, 0.5);
        game.handle(&mut host, GameEvent::PlayerKilled);

        assert_eq!(game.data().lives, 2);
        assert_eq!(game.scheduler().pending(), 1);
        assert_eq!(ProgressStore::new(storage).load().lives, 2);

        let delay = game.config().restart_delay;
        wait(&mut game, &mut host, delay);
        assert_eq!(host.count(|c| *c == HostCommand::RestartLevel), 1);
    }

    #[test]
    fn test_hearts_follow_lives() {
        let (mut game, mut host, _) = enabled_game();

        game.handle(&mut host, GameEvent::PlayerDrowned);
        assert_eq!(
            host.last(|c| matches!(c, HostCommand::Hearts(_))),
            Some(&HostCommand::Hearts([HeartIcon::Empty, HeartIcon::Full, HeartIcon::Full]))
        );
        // Drowning leaves the player object alone
        assert_eq!(host.count(|c| *c == HostCommand::ObjectActive(WorldObject::Player, false)), 0);
    }

    #[test]
    fn test_killed_player_dies_after_pause() {
        let (mut game, mut host, _) = enabled_game();

        game.handle(&mut host, GameEvent::PlayerKilled);
        assert_eq!(game.phase(), FlowPhase::Dying);
        assert_eq!(host.count(|c| *c == HostCommand::PlayerDeath), 1);
        assert_eq!(game.data().lives, MAX_LIVES);

        game.handle(&mut host, GameEvent::PlayerDied);
        assert_eq!(game.data().lives, 2);
        wait(&mut game, &mut host, DEATH_PAUSE + 0.1);
        assert_eq!(game.data().lives, 2);
    }

    #[test]
    fn test_killed_player_resolves_on_its_own() {
        let (mut game, mut host, _) = enabled_game();

        game.handle(&mut host, GameEvent::PlayerKilled);
        wait(&mut game, &mut host, DEATH_PAUSE + 0.1);

        assert_eq!(game.data().lives, 2);
        assert_eq!(game.phase(), FlowPhase::AwaitingRestart);
        assert_eq!(host.count(|c| *c == HostCommand::ObjectActive(WorldObject::Player, false)), 1);
    }

    #[test]
    fn test_gate_keys_reveal_once_and_freeze_timer() {
        let (mut game, mut host, _) = enabled_game();
        let gate_shown = |host: &HeadlessHost| {
            host.count(|c| *c == HostCommand::ObjectActive(WorldObject::BossGate, true))
        };

        game.handle(&mut host, GameEvent::KeyCollected { index: 0 });
        assert_eq!(gate_shown(&host), 0);
        game.handle(&mut host, GameEvent::KeyCollected { index: 1 });
        assert_eq!(gate_shown(&host), 1);
        assert!(!game.timer().is_running());
        assert!(host.commands().contains(&HostCommand::Landing(Vec2::new(12.0, 4.0))));

        game.handle(&mut host, GameEvent::KeyCollected { index: 0 });
        assert_eq!(gate_shown(&host), 1);

        let frozen = game.timer().remaining();
        wait(&mut game, &mut host, 5.0);
        assert_eq!(game.timer().remaining(), frozen);
    }

    #[test]
    fn test_invalid_key_index_ignored() {
        let (mut game, mut host, _) = enabled_game();
        game.handle(&mut host, GameEvent::KeyCollected { index: 7 });

        assert_eq!(game.data().key_found, [false; KEY_COUNT]);
        assert!(host.commands().is_empty());
    }

    #[test]
    fn test_gate_restored_on_restart() {
        let (mut game, mut host, _) = enabled_game();
        game.handle(&mut host, GameEvent::KeyCollected { index: 0 });
        game.handle(&mut host, GameEvent::KeyCollected { index: 1 });
        game.handle(&mut host, GameEvent::PlayerDrowned);
        host.take_commands();

        let delay = game.config().restart_delay + 0.1;
        wait(&mut game, &mut host, delay);

        assert!(host.commands().contains(&HostCommand::ObjectActive(WorldObject::BossGate, true)));
        assert!(host.commands().contains(&HostCommand::KeyIcon(KeyIndex::SECOND, true)));
        assert!(!game.timer().is_running());
    }

    #[test]
    fn test_enemy_and_coin_events() {
        let (mut game, mut host, _) = enabled_game();
        let scores = game.config().scores;

        game.handle(&mut host, GameEvent::EnemyStomped { enemy: EntityId(1) });
        assert_eq!(game.score(), scores.enemy);

        let pos = Vec2::new(3.0, -1.0);
        game.handle(&mut host, GameEvent::EnemyShot { enemy: EntityId(2), pos });
        assert_eq!(game.score(), scores.enemy);
        assert!(host.commands().contains(&HostCommand::EnemyExplosion(pos)));
        assert!(host.commands().contains(&HostCommand::SpawnBigCoin(pos)));

        game.handle(&mut host, GameEvent::CoinCollected { coin: EntityId(3), kind: CoinKind::Small });
        game.handle(&mut host, GameEvent::CoinCollected { coin: EntityId(4), kind: CoinKind::Big });
        assert_eq!(game.data().coin_count, 2);
        assert_eq!(game.score(), scores.enemy + scores.coin + scores.big_coin);

        for id in 1..=4 {
            assert!(host.commands().contains(&HostCommand::RemoveEntity(EntityId(id))));
        }
    }

    #[test]
    fn test_reset_request_wipes_progress() {
        let (mut game, mut host, storage) = enabled_game();
        game.handle(&mut host, GameEvent::CoinCollected { coin: EntityId(1), kind: CoinKind::Small });
        game.handle(&mut host, GameEvent::KeyCollected { index: 2 });
        game.with_ledger(&mut host, |ledger| ledger.unlock_level(1));
        game.handle(&mut host, GameEvent::PlayerDrowned);
        host.take_commands();

        let input = TickInput {
            reset_requested: true,
            ..Default::default()
        };
        game.tick(&mut host, &input, SIM_DT);

        let data = game.data();
        assert_eq!((data.coin_count, data.score, data.lives), (0, 0, MAX_LIVES));
        assert_eq!(data.key_found, [false; KEY_COUNT]);
        assert!(!data.level_data.is_unlocked(2));
        assert_eq!(&host.commands()[..3], &[
            HostCommand::CoinCount(0),
            HostCommand::Score(0),
            HostCommand::Hearts([HeartIcon::Full; 3]),
        ]);
        assert_eq!(ProgressStore::new(storage).load(), *game.data());
    }

    #[test]
    fn test_level_completion() {
        let (mut game, mut host, storage) = enabled_game();

        game.handle(&mut host, GameEvent::LevelCompleted { level: 1, stars: 2 });

        assert_eq!(game.phase(), FlowPhase::LevelComplete);
        assert!(!game.timer().is_running());
        assert!(host.commands().contains(&HostCommand::Panel(Panel::LevelComplete, true)));
        let saved = ProgressStore::new(storage).load();
        assert_eq!(saved.level_data.record(1).unwrap().stars_awarded, 2);
        assert!(saved.level_data.is_unlocked(2));

        game.handle(&mut host, GameEvent::PlayerDrowned);
        assert_eq!(game.data().lives, MAX_LIVES);
    }

    #[test]
    fn test_last_level_completion_unlocks_nothing() {
        let (mut game, mut host, _) = enabled_game();
        let last = game.config().level_count;

        game.handle(&mut host, GameEvent::LevelCompleted { level: last, stars: 3 });

        assert_eq!(game.data().level_data.len(), last as usize);
        assert_eq!(game.data().level_data.record(last).unwrap().stars_awarded, 3);
    }

    #[test]
    fn test_level_select_respects_locks() {
        let (mut game, mut host, _) = enabled_game();

        game.handle(&mut host, GameEvent::LevelSelected { level: 2 });
        assert_eq!(host.count(|c| matches!(c, HostCommand::LoadLevel(_))), 0);

        game.handle(&mut host, GameEvent::LevelCompleted { level: 1, stars: 1 });
        game.handle(&mut host, GameEvent::LevelSelected { level: 2 });
        assert!(host.commands().contains(&HostCommand::LoadLevel(2)));
        assert_eq!(game.phase(), FlowPhase::Playing);
        assert!(game.timer().is_running());
    }

    #[test]
    fn test_boss_battle_objects() {
        let (mut game, mut host, _) = enabled_game();
        let lever = Vec2::new(50.0, 2.0);

        game.handle(&mut host, GameEvent::BossBattleStarted);
        game.handle(&mut host, GameEvent::BossDefeated { lever });

        assert_eq!(host.commands(), &[
            HostCommand::ObjectActive(WorldObject::EnemySpawner, true),
            HostCommand::ObjectActive(WorldObject::Lever, true),
            HostCommand::ObjectActive(WorldObject::EnemySpawner, false),
            HostCommand::Landing(lever),
            HostCommand::Sound(SoundEffect::EnemyExplosion),
        ]);
    }

    #[test]
    fn test_new_round_after_game_over() {
        let (mut game, mut host, _) = enabled_game();
        let delay = game.config().restart_delay + 0.1;
        for _ in 0..MAX_LIVES {
            game.handle(&mut host, GameEvent::PlayerDrowned);
            wait(&mut game, &mut host, delay);
        }
        assert_eq!(game.phase(), FlowPhase::GameOver);

        game.start_round(&mut host);
        assert_eq!(game.phase(), FlowPhase::Playing);
        assert!(host.commands().contains(&HostCommand::Panel(Panel::GameOver, false)));

        game.handle(&mut host, GameEvent::PlayerDrowned);
        assert_eq!(game.data().lives, 2);
    }
}
