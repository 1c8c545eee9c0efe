//! Passenger and station singletons.

use crate::grid::Position;
use crate::scheduler::TaskHandle;

/// At most one passenger waits on the board. `None` means a respawn is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Passenger {
    position: Option<Position>,
}

impl Passenger {
    pub fn at(position: Position) -> Self {
        Self { position: Some(position) }
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn is_at(&self, pos: Position) -> bool {
        self.position == Some(pos)
    }

    pub fn place(&mut self, position: Position) {
        self.position = Some(position);
    }

    pub fn destroy(&mut self) -> Option<Position> {
        self.position.take()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationPhase {
    /// Waiting for the vanish delay to run out.
    Waiting,
    /// Blinking; destroyed when the vanish phase ends.
    Vanishing,
}

/// Handles of everything scheduled on behalf of the current station.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationSchedule {
    pub vanish: Option<TaskHandle>,
    pub blink: Option<TaskHandle>,
    pub destroy: Option<TaskHandle>,
}

impl StationSchedule {
    /// Empties the schedule, yielding every live handle for cancellation.
    pub fn take_all(&mut self) -> Vec<TaskHandle> {
        [self.vanish.take(), self.blink.take(), self.destroy.take()]
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.vanish.is_none() && self.blink.is_none() && self.destroy.is_none()
    }
}

/// At most one station exists at a time. Its schedule is owned here so every
/// path that removes the station can cancel it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Station {
    position: Option<Position>,
    phase: Option<StationPhase>,
    schedule: StationSchedule,
}

impl Station {
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn exists(&self) -> bool {
        self.position.is_some()
    }

    pub fn is_at(&self, pos: Position) -> bool {
        self.position == Some(pos)
    }

    pub fn phase(&self) -> Option<StationPhase> {
        self.phase
    }

    pub fn schedule(&self) -> &StationSchedule {
        &self.schedule
    }

    pub fn schedule_mut(&mut self) -> &mut StationSchedule {
        &mut self.schedule
    }

    pub fn place(&mut self, position: Position) {
        self.position = Some(position);
        self.phase = Some(StationPhase::Waiting);
    }

    pub fn start_vanishing(&mut self) {
        if self.exists() {
            self.phase = Some(StationPhase::Vanishing);
        }
    }

    /// Clears the station. Returns its last position and the handles that
    /// still need cancelling.
    pub fn destroy(&mut self) -> (Option<Position>, Vec<TaskHandle>) {
        self.phase = None;
        (self.position.take(), self.schedule.take_all())
    }
}
