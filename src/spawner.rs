//! Random placement of passengers and stations.

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, error};

use crate::config::GameConfig;
use crate::entities::{Passenger, Station};
use crate::error::PlacementError;
use crate::grid::{Position, GRID_SIZE};

/// Uniform floats in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

impl<R: Rng> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.gen()
    }
}

#[derive(Debug, Clone)]
pub struct Spawner {
    attempts: u32,
    base_chance: f64,
    chance_per_passenger: f64,
    roll_scale: f64,
    vanish_min_secs: f64,
    vanish_max_secs: f64,
}

impl Spawner {
    pub fn new(config: &GameConfig) -> Self {
        Spawner {
            attempts: config.placement_attempts,
            base_chance: config.station_base_chance,
            chance_per_passenger: config.station_chance_per_passenger,
            roll_scale: config.station_roll_scale,
            vanish_min_secs: config.vanish_delay_min_secs,
            vanish_max_secs: config.vanish_delay_max_secs,
        }
    }

    /// Samples cells uniformly until one outside `avoid` turns up. Gives up
    /// after the configured number of attempts, or at once if every cell is
    /// taken.
    pub fn place_random(
        &self,
        rng: &mut impl RandomSource,
        avoid: &HashSet<Position>,
    ) -> Result<Position, PlacementError> {
        let occupied = avoid.iter().filter(|pos| pos.in_bounds()).count();
        let exhausted = PlacementError::Exhausted { attempts: self.attempts, occupied };

        if occupied >= (GRID_SIZE * GRID_SIZE) as usize {
            error!(occupied, "no free cell left on the board");
            return Err(exhausted);
        }

        for _ in 0..self.attempts {
            let pos = Position::new(sample_axis(rng), sample_axis(rng));
            if !avoid.contains(&pos) {
                return Ok(pos);
            }
        }

        error!(attempts = self.attempts, occupied, "random placement exhausted");
        Err(exhausted)
    }

    /// Replaces the passenger with a new one away from the train, the station
    /// and its own previous cell.
    pub fn spawn_passenger(
        &self,
        rng: &mut impl RandomSource,
        passenger: &mut Passenger,
        occupied: &HashSet<Position>,
        station: &Station,
    ) -> Result<Position, PlacementError> {
        let mut avoid = occupied.clone();
        avoid.extend(station.position());
        avoid.extend(passenger.destroy());

        let pos = self.place_random(rng, &avoid)?;
        passenger.place(pos);
        debug!(x = pos.x, y = pos.y, "passenger spawned");
        Ok(pos)
    }

    /// One draw deciding whether a station appears after `passengers` pickups.
    pub fn station_roll(&self, rng: &mut impl RandomSource, passengers: u32) -> bool {
        let roll = rng.next_f64() * self.roll_scale;
        roll < self.base_chance + self.chance_per_passenger * passengers as f64
    }

    /// Only called right after a pickup. Draws nothing while a station exists.
    pub fn maybe_spawn_station(
        &self,
        rng: &mut impl RandomSource,
        station: &mut Station,
        passengers: u32,
        occupied: &HashSet<Position>,
        passenger: &Passenger,
    ) -> Result<Option<Position>, PlacementError> {
        if station.exists() || !self.station_roll(rng, passengers) {
            return Ok(None);
        }

        let mut avoid = occupied.clone();
        avoid.extend(passenger.position());

        let pos = self.place_random(rng, &avoid)?;
        station.place(pos);
        Ok(Some(pos))
    }

    /// How long a fresh station waits before it starts vanishing.
    pub fn vanish_delay(&self, rng: &mut impl RandomSource) -> Duration {
        let span = self.vanish_max_secs - self.vanish_min_secs;
        Duration::from_secs_f64(self.vanish_min_secs + rng.next_f64() * span)
    }
}

fn sample_axis(rng: &mut impl RandomSource) -> i32 {
    ((rng.next_f64() * GRID_SIZE as f64) as i32).clamp(0, GRID_SIZE - 1)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::VecDeque;

    /// Replays a fixed list of draws, then repeats the last one.
    pub(crate) struct Scripted {
        draws: VecDeque<f64>,
        last: f64,
    }

    impl Scripted {
        pub(crate) fn new(draws: &[f64]) -> Self {
            Scripted { draws: draws.iter().copied().collect(), last: 0.0 }
        }

        pub(crate) fn remaining(&self) -> usize {
            self.draws.len()
        }
    }

    impl RandomSource for Scripted {
        fn next_f64(&mut self) -> f64 {
            if let Some(next) = self.draws.pop_front() {
                self.last = next;
            }
            self.last
        }
    }

    /// The draw that lands on `cell` along one axis.
    pub(crate) fn axis(cell: i32) -> f64 {
        (cell as f64 + 0.5) / GRID_SIZE as f64
    }

    fn spawner() -> Spawner {
        Spawner::new(&GameConfig::default())
    }

    #[test]
    fn test_place_random_skips_avoided_cells() {
        let avoid: HashSet<_> = [Position::new(1, 1), Position::new(2, 2)].into_iter().collect();
        let mut rng = Scripted::new(&[axis(1), axis(1), axis(2), axis(2), axis(3), axis(9)]);

        assert_eq!(spawner().place_random(&mut rng, &avoid), Ok(Position::new(3, 9)));
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn test_place_random_gives_up() {
        let config = GameConfig { placement_attempts: 10, ..Default::default() };
        let avoid: HashSet<_> = [Position::new(0, 0)].into_iter().collect();
        let mut rng = Scripted::new(&[0.0]);

        assert_eq!(
            Spawner::new(&config).place_random(&mut rng, &avoid),
            Err(PlacementError::Exhausted { attempts: 10, occupied: 1 })
        );
    }

    #[test]
    fn test_place_random_full_board() {
        let avoid: HashSet<_> = (0..GRID_SIZE)
            .flat_map(|x| (0..GRID_SIZE).map(move |y| Position::new(x, y)))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);

        assert!(spawner().place_random(&mut rng, &avoid).is_err());
    }

    #[test]
    fn test_place_random_stays_on_grid() {
        let mut rng = StdRng::seed_from_u64(42);
        let avoid = HashSet::new();
        for _ in 0..500 {
            assert!(spawner().place_random(&mut rng, &avoid).unwrap().in_bounds());
        }
    }

    #[test]
    fn test_station_roll_thresholds() {
        let spawner = spawner();

        // roll is draw * 10, compared against 0.15 with no passengers
        assert!(spawner.station_roll(&mut Scripted::new(&[0.014]), 0));
        assert!(!spawner.station_roll(&mut Scripted::new(&[0.016]), 0));

        // and against 0.55 after five
        assert!(spawner.station_roll(&mut Scripted::new(&[0.054]), 5));
        assert!(!spawner.station_roll(&mut Scripted::new(&[0.056]), 5));
    }

    #[test]
    fn test_spawn_passenger_avoids_train_station_and_old_cell() {
        let spawner = spawner();
        let mut passenger = Passenger::at(Position::new(5, 5));
        let mut station = Station::default();
        station.place(Position::new(6, 6));
        let occupied: HashSet<_> = [Position::new(7, 7)].into_iter().collect();
        let mut rng = Scripted::new(&[
            axis(5), axis(5),
            axis(6), axis(6),
            axis(7), axis(7),
            axis(8), axis(8),
        ]);

        let pos = spawner
            .spawn_passenger(&mut rng, &mut passenger, &occupied, &station)
            .unwrap();
        assert_eq!(pos, Position::new(8, 8));
        assert_eq!(passenger.position(), Some(Position::new(8, 8)));
    }

    #[test]
    fn test_no_draw_while_station_exists() {
        let spawner = spawner();
        let mut station = Station::default();
        station.place(Position::new(1, 2));
        let mut rng = Scripted::new(&[0.0, axis(3), axis(3)]);

        let spawned = spawner
            .maybe_spawn_station(&mut rng, &mut station, 3, &HashSet::new(), &Passenger::default())
            .unwrap();
        assert_eq!(spawned, None);
        assert_eq!(rng.remaining(), 3);
        assert_eq!(station.position(), Some(Position::new(1, 2)));
    }

    #[test]
    fn test_station_avoids_passenger() {
        let spawner = spawner();
        let mut station = Station::default();
        let passenger = Passenger::at(Position::new(3, 3));
        let mut rng = Scripted::new(&[0.0, axis(3), axis(3), axis(4), axis(3)]);

        let spawned = spawner
            .maybe_spawn_station(&mut rng, &mut station, 1, &HashSet::new(), &passenger)
            .unwrap();
        assert_eq!(spawned, Some(Position::new(4, 3)));
        assert!(station.is_at(Position::new(4, 3)));
    }

    #[test]
    fn test_vanish_delay_window() {
        let spawner = spawner();
        assert_eq!(spawner.vanish_delay(&mut Scripted::new(&[0.0])), Duration::from_secs(5));
        assert_eq!(spawner.vanish_delay(&mut Scripted::new(&[0.5])), Duration::from_millis(7500));

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let delay = spawner.vanish_delay(&mut rng);
            assert!(delay >= Duration::from_secs(5) && delay < Duration::from_secs(10));
        }
    }
}
