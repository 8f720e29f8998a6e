//! Horizontal player movement

use super::context::{GameContext, GameplayComponent};
use super::event::GameEvent;
use super::tick::TickInput;

/// Turns the horizontal input axis into a velocity for the engine's body.
///
/// Any deflection moves the player at `speed * axis`; a centred axis stops
/// horizontal motion. Vertical motion stays with the physics engine.
#[derive(Debug, Clone)]
pub struct PlayerMovement {
    speed: f32,
    enabled: bool,
    /// Last velocity sent to the engine
    velocity_x: Option<f32>,
}

impl PlayerMovement {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            enabled: true,
            velocity_x: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn velocity_x(&self) -> f32 {
        self.velocity_x.unwrap_or(0.0)
    }

    /// Target horizontal velocity for an axis value
    pub fn velocity_for_axis(&self, axis: f32) -> f32 {
        if axis != 0.0 && axis.is_finite() {
            axis.clamp(-1.0, 1.0) * self.speed
        } else {
            0.0
        }
    }

    fn apply(&mut self, ctx: &mut GameContext<'_>, vx: f32) {
        if self.velocity_x != Some(vx) {
            ctx.host.set_player_velocity_x(vx);
            self.velocity_x = Some(vx);
        }
    }
}

impl GameplayComponent for PlayerMovement {
    fn update(&mut self, ctx: &mut GameContext<'_>, input: &TickInput, _dt: f32) {
        if !self.enabled {
            return;
        }
        let vx = self.velocity_for_axis(input.horizontal);
        self.apply(ctx, vx);
    }

    fn on_event(&mut self, ctx: &mut GameContext<'_>, event: &GameEvent) {
        match event {
            GameEvent::PlayerDown => {
                if self.enabled {
                    self.enabled = false;
                    self.apply(ctx, 0.0);
                }
            }
            GameEvent::RoundStarted => {
                self.enabled = true;
                self.velocity_x = None;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_branches() {
        let movement = PlayerMovement::new(4.0);
        assert_eq!(movement.velocity_for_axis(1.0), 4.0);
        assert_eq!(movement.velocity_for_axis(-0.5), -2.0);
        assert_eq!(movement.velocity_for_axis(0.0), 0.0);
        assert_eq!(movement.velocity_for_axis(3.0), 4.0);
        assert_eq!(movement.velocity_for_axis(f32::NAN), 0.0);
    }
}
