//! Outbound notifications for the renderer and audio collaborators.

use crate::grid::{Direction, Position};

/// Sounds the game asks for. Every cue replays from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    Horn,
    AmbientStart,
    AmbientPause,
    AmbientResume,
    AmbientStop,
    PowerFailure,
    SadTrombone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Fresh session entities are on the board.
    SessionReset,
    Started { direction: Direction },
    /// The train moved and survived; redraw the trail.
    TrainMoved { head: Position, dropped: Option<Position> },
    PassengerPicked { at: Position },
    PassengerSpawned { at: Position },
    StationSpawned { at: Position },
    StationVanishing { at: Position },
    StationBlink { at: Position },
    StationReached { at: Position },
    StationExpired { at: Position },
    SpeedChanged { speed: u32 },
    ClockTick { seconds: u64 },
    ScoreChanged { score: u32, best: u32 },
    Paused,
    Resumed,
    Ended { score: u32, new_best: bool },
    Home,
    Audio(AudioCue),
}
