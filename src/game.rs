//! The game state machine.
//!
//! [`Game`] owns the session, the scheduler and the random source. Inputs
//! arrive through [`Game::handle_input`], fired timers through
//! [`Game::dispatch`], and everything the outside world should know about is
//! queued as an [`Event`].

use std::mem;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::engine::{self, TickOutcome};
use crate::error::Result;
use crate::events::{AudioCue, Event};
use crate::grid::{Direction, Position};
use crate::scheduler::{Scheduler, Task, TaskHandle, VirtualTimers};
use crate::session::Session;
use crate::spawner::{RandomSource, Spawner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Waiting for the first direction
    Idle,
    Running,
    Paused,
    /// Wrecked; waiting for restart or home
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Steer(Direction),
    Pause,
    Resume,
    TogglePause,
    Restart,
    Home,
}

pub struct Game<S: Scheduler, R: RandomSource> {
    config: GameConfig,
    spawner: Spawner,
    scheduler: S,
    rng: R,
    state: GameState,
    session: Session,
    best_score: u32,
    train_tick: Option<TaskHandle>,
    clock_tick: Option<TaskHandle>,
    events: Vec<Event>,
}

impl<S: Scheduler, R: RandomSource> Game<S, R> {
    pub fn new(config: GameConfig, scheduler: S, rng: R) -> Result<Self> {
        config.validate()?;

        let mut game = Game {
            spawner: Spawner::new(&config),
            session: Session::new(&config),
            config,
            scheduler,
            rng,
            state: GameState::Idle,
            best_score: 0,
            train_tick: None,
            clock_tick: None,
            events: vec![],
        };
        game.announce_session();
        Ok(game)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// True while a game is in progress, paused or not.
    pub fn is_started(&self) -> bool {
        matches!(self.state, GameState::Running | GameState::Paused)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Highest score reached by any session of this process.
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        mem::take(&mut self.events)
    }

    /// Inputs that make no sense in the current state are ignored.
    pub fn handle_input(&mut self, input: Input) {
        match (self.state, input) {
            (GameState::Idle, Input::Steer(direction)) => self.start(direction),
            (GameState::Running, Input::Steer(direction)) => {
                if !self.session.train.set_direction(direction) {
                    debug!(?direction, "reversal ignored");
                }
            }
            (GameState::Running, Input::Pause | Input::TogglePause) => self.pause(),
            (GameState::Paused, Input::Resume | Input::TogglePause) => self.resume(),
            (GameState::Ended, Input::Restart) => self.reset(),
            (GameState::Ended, Input::Home) => {
                self.reset();
                self.events.push(Event::Home);
            }
            (state, input) => debug!(?state, ?input, "input ignored"),
        }
    }

    /// Runs the handler for a fired task to completion.
    pub fn dispatch(&mut self, task: Task) -> Result<()> {
        match task {
            Task::TrainTick => self.on_train_tick()?,
            Task::ClockTick => self.on_clock_tick(),
            Task::StationVanish => self.on_station_vanish(),
            Task::StationBlink => self.on_station_blink(),
            Task::StationDestroy => self.on_station_destroy(),
        }
        Ok(())
    }

    fn start(&mut self, direction: Direction) {
        self.session.train.force_direction(direction);
        self.arm_ticks();
        self.state = GameState::Running;
        info!(?direction, "game started");
        self.events.push(Event::Started { direction });
        self.events.push(Event::Audio(AudioCue::AmbientStart));
    }

    fn pause(&mut self) {
        self.disarm_ticks();
        self.state = GameState::Paused;
        info!(seconds = self.session.clock.seconds(), "game paused");
        self.events.push(Event::Paused);
        self.events.push(Event::Audio(AudioCue::AmbientPause));
    }

    fn resume(&mut self) {
        self.arm_ticks();
        self.state = GameState::Running;
        info!(speed = self.session.train.speed(), "game resumed");
        self.events.push(Event::Resumed);
        self.events.push(Event::Audio(AudioCue::AmbientResume));
    }

    fn reset(&mut self) {
        self.disarm_ticks();
        self.destroy_station();
        self.session = Session::new(&self.config);
        self.state = GameState::Idle;
        info!("session reset");
        self.announce_session();
    }

    fn announce_session(&mut self) {
        self.events.push(Event::SessionReset);
        if let Some(at) = self.session.passenger.position() {
            self.events.push(Event::PassengerSpawned { at });
        }
    }

    fn end(&mut self) {
        self.disarm_ticks();
        self.state = GameState::Ended;
        self.destroy_station();
        self.session.passenger.destroy();
        self.record_score();

        let score = self.session.score.total();
        let new_best = self.session.new_best;
        info!(score, new_best, seconds = self.session.clock.seconds(), "train wrecked");

        self.events.push(Event::Audio(AudioCue::AmbientStop));
        self.events.push(Event::Audio(AudioCue::PowerFailure));
        self.events.push(Event::Audio(AudioCue::SadTrombone));
        self.events.push(Event::Ended { score, new_best });
    }

    fn arm_ticks(&mut self) {
        self.disarm_ticks();
        let period = GameConfig::tick_period(self.session.train.speed());
        self.train_tick = Some(self.scheduler.start_interval(period, Task::TrainTick));
        self.clock_tick = Some(
            self.scheduler
                .start_interval(self.config.clock_period(), Task::ClockTick),
        );
    }

    fn disarm_ticks(&mut self) {
        for handle in [self.train_tick.take(), self.clock_tick.take()].into_iter().flatten() {
            self.scheduler.cancel(handle);
        }
    }

    /// Re-arms the train tick at the current speed. The clock is untouched.
    fn rearm_train_tick(&mut self) {
        if let Some(handle) = self.train_tick.take() {
            self.scheduler.cancel(handle);
        }
        let period = GameConfig::tick_period(self.session.train.speed());
        self.train_tick = Some(self.scheduler.start_interval(period, Task::TrainTick));
    }

    fn record_score(&mut self) {
        let score = self.session.score.total();
        if score > self.best_score {
            self.best_score = score;
            self.session.new_best = true;
            info!(best = score, "new best score");
        }
        self.events.push(Event::ScoreChanged { score, best: self.best_score });
    }

    fn on_train_tick(&mut self) -> Result<()> {
        if self.state != GameState::Running {
            warn!(state = ?self.state, "stale train tick");
            return Ok(());
        }

        let outcome = engine::advance_train(&mut self.session, &self.spawner, &mut self.rng)?;
        self.apply_outcome(outcome);
        Ok(())
    }

    fn apply_outcome(&mut self, outcome: TickOutcome) {
        if outcome.picked_passenger {
            self.events.push(Event::Audio(AudioCue::Horn));
            self.events.push(Event::PassengerPicked { at: outcome.head });
            self.record_score();
        }
        if let Some(at) = outcome.new_passenger {
            self.events.push(Event::PassengerSpawned { at });
        }
        if let Some(at) = outcome.new_station {
            self.schedule_station_vanish();
            info!(x = at.x, y = at.y, "station spawned");
            self.events.push(Event::StationSpawned { at });
        }

        if let Some(at) = outcome.reached_station {
            for handle in outcome.cancelled {
                self.scheduler.cancel(handle);
            }
            self.events.push(Event::Audio(AudioCue::Horn));
            self.events.push(Event::StationReached { at });
            self.record_score();
        }
        if let Some(speed) = outcome.new_speed {
            self.rearm_train_tick();
            info!(speed, "train sped up");
            self.events.push(Event::SpeedChanged { speed });
        }

        if outcome.wrecked {
            self.end();
        } else {
            self.events.push(Event::TrainMoved { head: outcome.head, dropped: outcome.dropped });
        }
    }

    fn on_clock_tick(&mut self) {
        if self.state != GameState::Running {
            warn!(state = ?self.state, "stale clock tick");
            return;
        }
        let seconds = self.session.clock.tick();
        self.events.push(Event::ClockTick { seconds });
    }

    fn schedule_station_vanish(&mut self) {
        let delay = self.spawner.vanish_delay(&mut self.rng);
        debug!(?delay, "station vanish scheduled");
        let handle = self.scheduler.start_timeout(delay, Task::StationVanish);
        self.session.station.schedule_mut().vanish = Some(handle);
    }

    fn on_station_vanish(&mut self) {
        let Some(at) = self.session.station.position() else {
            warn!("vanish fired without a station");
            return;
        };

        let blink = self.scheduler.start_interval(self.config.blink_interval(), Task::StationBlink);
        let destroy = self.scheduler.start_timeout(self.config.vanish_phase(), Task::StationDestroy);

        let station = &mut self.session.station;
        station.start_vanishing();
        let schedule = station.schedule_mut();
        schedule.vanish = None;
        schedule.blink = Some(blink);
        schedule.destroy = Some(destroy);

        debug!(x = at.x, y = at.y, "station vanishing");
        self.events.push(Event::StationVanishing { at });
    }

    fn on_station_blink(&mut self) {
        if let Some(at) = self.session.station.position() {
            self.events.push(Event::StationBlink { at });
        }
    }

    fn on_station_destroy(&mut self) {
        if let Some(at) = self.destroy_station() {
            info!(x = at.x, y = at.y, "station expired");
            self.events.push(Event::StationExpired { at });
        }
    }

    /// Removes the station and cancels whatever it still had scheduled.
    fn destroy_station(&mut self) -> Option<Position> {
        let (at, handles) = self.session.station.destroy();
        for handle in handles {
            self.scheduler.cancel(handle);
        }
        at
    }
}

impl<R: RandomSource> Game<VirtualTimers, R> {
    /// Moves the clock forward by `by`, running every task that falls due in
    /// time order.
    pub fn advance(&mut self, by: Duration) -> Result<()> {
        let until = self.scheduler.now() + by;
        while let Some(task) = self.scheduler.pop_due(until) {
            self.dispatch(task)?;
        }
        self.scheduler.advance_to(until);
        Ok(())
    }

    /// Period the train tick is currently armed with.
    pub fn train_tick_period(&self) -> Option<Duration> {
        self.train_tick.and_then(|handle| self.scheduler.period_of(handle))
    }
}
