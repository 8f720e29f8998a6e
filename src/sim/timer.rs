//! Round countdown timer

use super::context::{GameContext, GameplayComponent};
use super::event::GameEvent;
use super::tick::TickInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Running,
    Stopped,
}

/// Counts down from the configured round length; running out kills the player
#[derive(Debug, Clone)]
pub struct RoundTimer {
    max_time: f32,
    remaining: f32,
    state: TimerState,
    /// Last whole-second value sent to the HUD
    shown: Option<u32>,
}

impl RoundTimer {
    pub fn new(max_time: f32) -> Self {
        Self {
            max_time,
            remaining: max_time,
            state: TimerState::Running,
            shown: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Whole seconds shown on the HUD
    pub fn display_seconds(&self) -> u32 {
        self.remaining.max(0.0).floor() as u32
    }

    /// Freeze for the rest of the round. Idempotent.
    pub fn stop(&mut self) {
        if self.state == TimerState::Running {
            log::debug!("Round timer stopped at {:.1}s", self.remaining);
            self.state = TimerState::Stopped;
        }
    }

    /// Start a new round at full time
    pub fn restart(&mut self) {
        self.remaining = self.max_time;
        self.state = TimerState::Running;
        self.shown = None;
    }

    fn show(&mut self, ctx: &mut GameContext<'_>) {
        let seconds = self.display_seconds();
        if self.shown != Some(seconds) {
            ctx.host.set_timer(seconds);
            self.shown = Some(seconds);
        }
    }
}

impl GameplayComponent for RoundTimer {
    fn update(&mut self, ctx: &mut GameContext<'_>, _input: &TickInput, dt: f32) {
        if self.state != TimerState::Running {
            return;
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.state = TimerState::Stopped;
            self.show(ctx);
            log::info!("Round timer ran out");
            ctx.emit(GameEvent::PlayerDied);
            return;
        }
        self.show(ctx);
    }

    fn on_event(&mut self, ctx: &mut GameContext<'_>, event: &GameEvent) {
        match event {
            GameEvent::RoundStarted => {
                self.restart();
                self.show(ctx);
            }
            GameEvent::BossGateRevealed | GameEvent::LevelCompleted { .. } => self.stop(),
            _ => {}
        }
    }
}
