use std::collections::VecDeque;

use crate::grid::{Direction::{self, *}, Position};

/// The player's train. `trail` holds the occupied cells head-first and never
/// grows past `size`.
#[derive(Debug, Clone, PartialEq)]
pub struct Train {
    trail: VecDeque<Position>,
    direction: Direction,
    size: usize,
    speed: u32,
    steps: u64,
}

impl Train {
    /// Places the train on `start`. The placement counts as its first step.
    pub fn new(start: Position, direction: Direction, size: usize, speed: u32) -> Self {
        let mut trail = VecDeque::with_capacity(size + 1);
        trail.push_front(start);
        Train { trail, direction, size, speed, steps: 1 }
    }

    pub fn head(&self) -> Position {
        // The trail is seeded on construction and only ever truncated down to `size >= 1`
        self.trail[0]
    }

    pub fn trail(&self) -> &VecDeque<Position> {
        &self.trail
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.trail.contains(&pos)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Where the head lands on the next step.
    pub fn next_head(&self) -> Position {
        self.head().moved_in_direction(self.direction)
    }

    /// Pushes a new head, dropping the oldest cell once the trail outgrows
    /// `size`. Returns the dropped cell, if any.
    pub fn push_head(&mut self, head: Position) -> Option<Position> {
        self.trail.push_front(head);
        self.steps += 1;

        if self.trail.len() > self.size {
            self.trail.pop_back()
        } else {
            None
        }
    }

    /// True when the head is off the grid or shares its cell with another wagon.
    pub fn is_wrecked(&self) -> bool {
        let head = self.head();
        !head.in_bounds() || self.trail.iter().filter(|&&wagon| wagon == head).count() != 1
    }

    /// Turns the train unless the request is a reversal of the pending direction.
    /// Returns whether the direction was accepted.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        if self.direction.is_opposite(new_direction) {
            false
        } else {
            self.direction = new_direction;
            true
        }
    }

    /// Sets the direction without the reversal check, used for the first move.
    pub fn force_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn grow(&mut self) {
        self.size += 1;
    }

    pub fn speed_up(&mut self) -> u32 {
        self.speed += 1;
        self.speed
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_train_occupies_start() {
        let train = Train::new(Position::new(4, 4), Down, 1, 5);
        assert_eq!(train.head(), Position::new(4, 4));
        assert_eq!(train.trail().len(), 1);
        assert_eq!(train.steps(), 1);
        assert!(!train.is_wrecked());
    }

    #[test]
    fn test_trail_truncates_to_size() {
        let mut train = Train::new(Position::new(4, 4), Right, 2, 5);

        assert_eq!(train.push_head(Position::new(5, 4)), None);
        assert_eq!(train.push_head(Position::new(6, 4)), Some(Position::new(4, 4)));
        assert_eq!(
            train.trail().iter().copied().collect::<Vec<_>>(),
            vec![Position::new(6, 4), Position::new(5, 4)]
        );
    }

    #[test]
    fn test_reversal_rejected() {
        let mut train = Train::new(Position::new(4, 4), Right, 1, 5);
        assert!(!train.set_direction(Left));
        assert_eq!(train.direction(), Right);
        assert!(train.set_direction(Down));
        // Reversal is judged against the pending direction, not the last step taken
        assert!(train.set_direction(Left));
        assert_eq!(train.direction(), Left);
    }

    #[test]
    fn test_wreck_detection() {
        let mut train = Train::new(Position::new(15, 0), Right, 1, 5);
        let next = train.next_head();
        train.push_head(next);
        assert!(train.is_wrecked());

        let mut train = Train::new(Position::new(4, 4), Right, 3, 5);
        train.push_head(Position::new(5, 4));
        train.push_head(Position::new(6, 4));
        assert!(!train.is_wrecked());
        train.push_head(Position::new(5, 4));
        assert!(train.is_wrecked());
    }

    #[test]
    fn test_grow_and_speed_up() {
        let mut train = Train::new(Position::new(4, 4), Right, 1, 5);
        train.grow();
        assert_eq!(train.size(), 2);
        assert_eq!(train.speed_up(), 6);
        assert_eq!(train.speed(), 6);
    }

    proptest! {
        #[test]
        fn trail_length_follows_steps_and_size(
            growth in proptest::collection::vec(any::<bool>(), 1..60)
        ) {
            let mut train = Train::new(Position::new(0, 0), Right, 1, 5);

            for (i, grow) in growth.into_iter().enumerate() {
                if grow {
                    train.grow();
                }
                train.push_head(Position::new(i as i32 + 1, 0));
                let expected = std::cmp::min(train.steps() as usize, train.size());
                prop_assert_eq!(train.trail().len(), expected);
            }
        }
    }
}
