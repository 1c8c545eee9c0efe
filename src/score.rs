//! Score and elapsed play time.

/// Points for each passenger picked up.
pub const PASSENGER_POINTS: u32 = 1;
/// Points for each station reached.
pub const STATION_POINTS: u32 = 10;

/// Pickup counts for one session. The score itself is always derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub passengers: u32,
    pub stations: u32,
}

impl Score {
    pub fn total(&self) -> u32 {
        self.passengers * PASSENGER_POINTS + self.stations * STATION_POINTS
    }
}

/// Whole seconds of play, advanced only by the clock tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayClock {
    seconds: u64,
}

impl PlayClock {
    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn tick(&mut self) -> u64 {
        self.seconds += 1;
        self.seconds
    }

    pub fn format(&self) -> String {
        format!("{:02}:{:02}", self.seconds / 60, self.seconds % 60)
    }
}
