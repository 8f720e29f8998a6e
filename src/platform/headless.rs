//! Headless host that records every command
//!
//! Used by the native runner (which logs the commands) and by tests
//! (which assert on them).

use glam::Vec2;

use super::*;

/// One call the core made into the host
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    CoinCount(u32),
    Score(u32),
    Timer(u32),
    Hearts([HeartIcon; 3]),
    KeyIcon(KeyIndex, bool),
    Panel(Panel, bool),
    RestartLevel,
    LoadLevel(u32),
    ObjectActive(WorldObject, bool),
    RemoveEntity(EntityId),
    SpawnBigCoin(Vec2),
    PlayerVelocityX(f32),
    PlayerDeath,
    EnemyExplosion(Vec2),
    Landing(Vec2),
    Sound(SoundEffect),
}

/// Recording host with no engine behind it
#[derive(Debug, Default)]
pub struct HeadlessHost {
    commands: Vec<HostCommand>,
    positions: Vec<(WorldObject, Vec2)>,
    log_commands: bool,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also write each command to the log (info level for HUD text)
    pub fn with_logging(mut self) -> Self {
        self.log_commands = true;
        self
    }

    /// Report a fixed position for a scene object
    pub fn with_position(mut self, object: WorldObject, pos: Vec2) -> Self {
        self.positions.retain(|(o, _)| *o != object);
        self.positions.push((object, pos));
        self
    }

    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    /// Drain recorded commands
    pub fn take_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of recorded commands matching `pred`
    pub fn count(&self, pred: impl Fn(&HostCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// Most recent command matching `pred`
    pub fn last(&self, pred: impl Fn(&HostCommand) -> bool) -> Option<&HostCommand> {
        self.commands.iter().rev().find(|c| pred(c))
    }

    fn record(&mut self, command: HostCommand) {
        if self.log_commands {
            match &command {
                HostCommand::CoinCount(n) => log::info!("HUD coins:  x {n}"),
                HostCommand::Score(n) => log::info!("HUD Score: {n}"),
                // Timer ticks every second; keep it out of the info stream
                HostCommand::Timer(n) => log::debug!("HUD Timer: {n}"),
                HostCommand::PlayerVelocityX(_) => log::trace!("{command:?}"),
                other => log::info!("{other:?}"),
            }
        }
        self.commands.push(command);
    }
}

impl Hud for HeadlessHost {
    fn set_coin_count(&mut self, coins: u32) {
        self.record(HostCommand::CoinCount(coins));
    }

    fn set_score(&mut self, score: u32) {
        self.record(HostCommand::Score(score));
    }

    fn set_timer(&mut self, seconds: u32) {
        self.record(HostCommand::Timer(seconds));
    }

    fn set_hearts(&mut self, hearts: [HeartIcon; 3]) {
        self.record(HostCommand::Hearts(hearts));
    }

    fn set_key_icon(&mut self, key: KeyIndex, found: bool) {
        self.record(HostCommand::KeyIcon(key, found));
    }

    fn set_panel_visible(&mut self, panel: Panel, visible: bool) {
        self.record(HostCommand::Panel(panel, visible));
    }
}

impl SceneDirector for HeadlessHost {
    fn restart_level(&mut self) {
        self.record(HostCommand::RestartLevel);
    }

    fn load_level(&mut self, level_number: u32) {
        self.record(HostCommand::LoadLevel(level_number));
    }
}

impl WorldControl for HeadlessHost {
    fn set_object_active(&mut self, object: WorldObject, active: bool) {
        self.record(HostCommand::ObjectActive(object, active));
    }

    fn remove_entity(&mut self, entity: EntityId) {
        self.record(HostCommand::RemoveEntity(entity));
    }

    fn spawn_big_coin(&mut self, pos: Vec2) {
        self.record(HostCommand::SpawnBigCoin(pos));
    }

    fn set_player_velocity_x(&mut self, vx: f32) {
        self.record(HostCommand::PlayerVelocityX(vx));
    }

    fn play_player_death(&mut self) {
        self.record(HostCommand::PlayerDeath);
    }
}

impl Effects for HeadlessHost {
    fn enemy_explosion(&mut self, pos: Vec2) {
        self.record(HostCommand::EnemyExplosion(pos));
    }

    fn landing(&mut self, pos: Vec2) {
        self.record(HostCommand::Landing(pos));
    }

    fn play_sound(&mut self, sound: SoundEffect) {
        self.record(HostCommand::Sound(sound));
    }
}

impl Host for HeadlessHost {
    fn object_position(&self, object: WorldObject) -> Option<Vec2> {
        self.positions
            .iter()
            .find(|(o, _)| *o == object)
            .map(|(_, pos)| *pos)
    }
}
