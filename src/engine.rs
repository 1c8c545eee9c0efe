//! One movement step of the train.
//!
//! The order inside a step is fixed: move, pick up, push and truncate the
//! trail, arrive at a station, and only then check for a wreck. Effects of a
//! pickup or an arrival stand even when the same step wrecks the train.

use tracing::debug;

use crate::error::PlacementError;
use crate::grid::Position;
use crate::scheduler::TaskHandle;
use crate::session::Session;
use crate::spawner::{RandomSource, Spawner};

/// What happened during one step, for the state machine to act on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub head: Position,
    /// Tail cell dropped by the truncation, if any
    pub dropped: Option<Position>,
    pub picked_passenger: bool,
    pub new_passenger: Option<Position>,
    pub new_station: Option<Position>,
    pub reached_station: Option<Position>,
    /// Handles of the reached station's schedule, to be cancelled
    pub cancelled: Vec<TaskHandle>,
    pub new_speed: Option<u32>,
    pub wrecked: bool,
}

pub fn advance_train(
    session: &mut Session,
    spawner: &Spawner,
    rng: &mut impl RandomSource,
) -> Result<TickOutcome, PlacementError> {
    let head = session.train.next_head();
    let mut outcome = TickOutcome { head, ..Default::default() };

    if session.passenger.is_at(head) {
        on_pickup(session, head);
        outcome.picked_passenger = true;

        let mut occupied = session.occupied();
        occupied.insert(head);

        outcome.new_passenger = Some(spawner.spawn_passenger(
            rng,
            &mut session.passenger,
            &occupied,
            &session.station,
        )?);
        outcome.new_station = spawner.maybe_spawn_station(
            rng,
            &mut session.station,
            session.score.passengers,
            &occupied,
            &session.passenger,
        )?;
    }

    outcome.dropped = session.train.push_head(head);

    if session.station.is_at(head) {
        session.score.stations += 1;
        let (at, handles) = session.station.destroy();
        outcome.reached_station = at;
        outcome.cancelled = handles;
        outcome.new_speed = Some(session.train.speed_up());
    }

    outcome.wrecked = session.train.is_wrecked();

    debug!(
        x = head.x,
        y = head.y,
        size = session.train.size(),
        picked = outcome.picked_passenger,
        station = outcome.reached_station.is_some(),
        wrecked = outcome.wrecked,
        "train step"
    );
    Ok(outcome)
}

fn on_pickup(session: &mut Session, at: Position) {
    session.score.passengers += 1;
    session.train.grow();
    session.passenger.destroy();
    debug!(x = at.x, y = at.y, passengers = session.score.passengers, "passenger picked up");
}
