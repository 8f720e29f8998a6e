//! Gameplay simulation module
//!
//! All engine-independent game logic lives here:
//! - Components are driven by one dispatch loop (`Game`)
//! - Shared services are lent through `GameContext`, never globals
//! - Delays go through the `Scheduler`, never wall-clock callbacks
//! - No rendering, physics or platform dependencies

pub mod context;
pub mod event;
pub mod flow;
pub mod ledger;
pub mod player;
pub mod scheduler;
pub mod tick;
pub mod timer;

pub use context::{GameContext, GameplayComponent};
pub use event::{CoinKind, EventQueue, GameEvent};
pub use flow::{FlowPhase, GameFlowController};
pub use ledger::{ScoreKind, ScoreLedger};
pub use player::PlayerMovement;
pub use scheduler::{DeferredAction, Scheduler, TaskHandle};
pub use tick::{Game, TickInput};
pub use timer::{RoundTimer, TimerState};
