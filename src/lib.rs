//! Train Wreck: steer a growing train around a 16x16 board, pick up
//! passengers, reach stations before they vanish, and don't crash.
//!
//! The library holds the whole game core and never touches the terminal:
//! it takes [`game::Input`]s and fired [`scheduler::Task`]s, and reports what
//! happened as [`events::Event`]s.

pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod events;
pub mod game;
pub mod grid;
pub mod scheduler;
pub mod score;
pub mod session;
pub mod spawner;
pub mod train;

pub use config::GameConfig;
pub use error::{Error, Result};
pub use events::{AudioCue, Event};
pub use game::{Game, GameState, Input};
pub use grid::{Direction, Position, GRID_SIZE};
pub use scheduler::{Scheduler, Task, TaskHandle, VirtualTimers};
