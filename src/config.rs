use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::{Direction, Position};

/// Tunables for one game. Defaults reproduce the classic board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Trail length a fresh train aims for
    pub initial_size: usize,
    /// Train ticks per second at session start
    pub initial_speed: u32,
    pub train_start: Position,
    pub passenger_start: Position,
    /// Direction the train faces before the first input
    pub initial_direction: Direction,

    /// A station appears when `roll * station_roll_scale` is below
    /// `station_base_chance + station_chance_per_passenger * passengers`
    pub station_base_chance: f64,
    pub station_chance_per_passenger: f64,
    pub station_roll_scale: f64,

    pub vanish_delay_min_secs: f64,
    pub vanish_delay_max_secs: f64,
    pub vanish_phase_secs: f64,
    pub blink_interval_ms: u64,

    pub clock_period_ms: u64,
    /// Retry cap for random placement
    pub placement_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_size: 1,
            initial_speed: 5,
            train_start: Position::new(4, 4),
            passenger_start: Position::new(10, 10),
            initial_direction: Direction::Down,
            station_base_chance: 0.15,
            station_chance_per_passenger: 0.08,
            station_roll_scale: 10.0,
            vanish_delay_min_secs: 5.0,
            vanish_delay_max_secs: 10.0,
            vanish_phase_secs: 3.0,
            blink_interval_ms: 600,
            clock_period_ms: 1000,
            placement_attempts: 4096,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if self.initial_speed == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        for (what, pos) in [("train", self.train_start), ("passenger", self.passenger_start)] {
            if !pos.in_bounds() {
                return Err(ConfigError::OffGrid { what, x: pos.x, y: pos.y });
            }
        }
        if self.train_start == self.passenger_start {
            return Err(ConfigError::OverlappingStart);
        }
        let (min, max) = (self.vanish_delay_min_secs, self.vanish_delay_max_secs);
        if !(min >= 0.0 && max > min && max.is_finite()) {
            return Err(ConfigError::VanishWindow { min, max });
        }
        if !(self.vanish_phase_secs >= 0.0 && self.vanish_phase_secs.is_finite()) {
            return Err(ConfigError::VanishPhase(self.vanish_phase_secs));
        }
        if self.clock_period_ms == 0 || self.blink_interval_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.placement_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if !(self.station_roll_scale > 0.0) {
            return Err(ConfigError::RollScale(self.station_roll_scale));
        }
        Ok(())
    }

    /// Period of the train tick at `speed` ticks per second.
    pub fn tick_period(speed: u32) -> Duration {
        Duration::from_secs(1) / speed.max(1)
    }

    pub fn clock_period(&self) -> Duration {
        Duration::from_millis(self.clock_period_ms)
    }

    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(self.blink_interval_ms)
    }

    pub fn vanish_phase(&self) -> Duration {
        Duration::from_secs_f64(self.vanish_phase_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.initial_size, 1);
        assert_eq!(config.initial_speed, 5);
        assert_eq!(config.train_start, Position::new(4, 4));
        assert_eq!(config.passenger_start, Position::new(10, 10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tick_period() {
        assert_eq!(GameConfig::tick_period(5), Duration::from_millis(200));
        assert_eq!(GameConfig::tick_period(8), Duration::from_millis(125));
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = GameConfig { initial_speed: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroSpeed)));

        let config = GameConfig { train_start: Position::new(16, 0), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::OffGrid { what: "train", .. })));

        let config = GameConfig {
            vanish_delay_min_secs: 10.0,
            vanish_delay_max_secs: 5.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::VanishWindow { .. })));

        let config = GameConfig { placement_attempts: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroAttempts)));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GameConfig = toml::from_str("initial_speed = 8\ninitial_direction = \"left\"").unwrap();
        assert_eq!(config.initial_speed, 8);
        assert_eq!(config.initial_direction, Direction::Left);
        assert_eq!(config.passenger_start, Position::new(10, 10));
    }
}
