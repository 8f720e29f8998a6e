//! Cat Platformer native runner
//!
//! Plays a headless autoplay session against the real save file. The
//! autoplay stands in for the engine: it feeds a wandering input axis and
//! random world events, and every host command is written to the log.
//!
//! Usage: `cat-platformer [config.json]` (seed via `CAT_PLATFORMER_SEED`)

use std::path::PathBuf;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use cat_platformer::GameConfig;
use cat_platformer::consts::*;
use cat_platformer::persistence::{FileStorage, ProgressStore};
use cat_platformer::platform::{EntityId, HeadlessHost, WorldObject};
use cat_platformer::sim::{CoinKind, FlowPhase, Game, GameEvent, TickInput};

/// Length of the autoplay session in seconds
const SESSION_SECONDS: f32 = 120.0;
const DEFAULT_SEED: u64 = 0xC47;

/// Scripted stand-in for a player and a level
struct Autoplay {
    rng: Pcg32,
    axis: f32,
    next_entity: u64,
}

impl Autoplay {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            axis: 0.0,
            next_entity: 1,
        }
    }

    fn entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    /// Wander left and right, sometimes standing still
    fn input(&mut self) -> TickInput {
        if self.rng.random_bool(0.02) {
            self.axis = [-1.0, 0.0, 1.0][self.rng.random_range(0..3)];
        }
        TickInput {
            horizontal: self.axis,
            reset_requested: false,
        }
    }

    /// At most one world event per frame
    fn event(&mut self) -> Option<GameEvent> {
        let roll: f32 = self.rng.random();
        let pos = Vec2::new(self.rng.random_range(0.0..200.0), 0.0);
        let event = match roll {
            r if r < 0.010 => GameEvent::CoinCollected {
                coin: self.entity(),
                kind: CoinKind::Small,
            },
            r if r < 0.012 => GameEvent::EnemyStomped {
                enemy: self.entity(),
            },
            r if r < 0.013 => GameEvent::EnemyShot {
                enemy: self.entity(),
                pos,
            },
            r if r < 0.0135 => GameEvent::KeyCollected {
                index: self.rng.random_range(0..KEY_COUNT),
            },
            r if r < 0.0138 => GameEvent::PlayerKilled,
            r if r < 0.0140 => GameEvent::PlayerDrowned,
            _ => return None,
        };
        Some(event)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = GameConfig::load_or_default(config_path.as_deref());
    let seed = std::env::var("CAT_PLATFORMER_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    let save_path = config
        .save_path
        .clone()
        .unwrap_or_else(FileStorage::default_path);
    log::info!("Save file: {}", save_path.display());

    let mut game = Game::new(config, ProgressStore::new(FileStorage::new(save_path)));
    let mut host = HeadlessHost::new()
        .with_logging()
        .with_position(WorldObject::BossGate, Vec2::new(180.0, 12.0));
    let mut autoplay = Autoplay::new(seed);

    game.enable(&mut host);

    let frames = (SESSION_SECONDS / SIM_DT) as u32;
    for _ in 0..frames {
        let input = autoplay.input();
        game.tick(&mut host, &input, SIM_DT);

        if game.phase() == FlowPhase::Playing {
            if let Some(event) = autoplay.event() {
                game.handle(&mut host, event);
            }
        }
        if game.phase() == FlowPhase::GameOver {
            log::info!("Game over, starting a new round");
            game.start_round(&mut host);
        }

        // Commands are already logged; don't let the buffer grow
        host.take_commands();
    }

    game.disable(&mut host);

    let data = game.data();
    log::info!(
        "Session over: score {}, coins {}, lives {}, keys {:?}",
        data.score,
        data.coin_count,
        data.lives,
        data.key_found
    );
}
