use std::collections::HashSet;

use crate::config::GameConfig;
use crate::entities::{Passenger, Station};
use crate::grid::Position;
use crate::score::{PlayClock, Score};
use crate::train::Train;

/// Everything that lives for exactly one game and is rebuilt on restart.
#[derive(Debug, Clone)]
pub struct Session {
    pub train: Train,
    pub passenger: Passenger,
    pub station: Station,
    pub score: Score,
    pub clock: PlayClock,
    /// Set once this session beats the best score it started with.
    pub new_best: bool,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        Session {
            train: Train::new(
                config.train_start,
                config.initial_direction,
                config.initial_size,
                config.initial_speed,
            ),
            passenger: Passenger::at(config.passenger_start),
            station: Station::default(),
            score: Score::default(),
            clock: PlayClock::default(),
            new_best: false,
        }
    }

    /// Cells covered by the train.
    pub fn occupied(&self) -> HashSet<Position> {
        self.train.trail().iter().copied().collect()
    }
}
