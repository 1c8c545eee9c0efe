use std::{thread::sleep, time::{Duration, Instant}};

use anyhow::{bail, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;
use rand::rngs::StdRng;
use tracing::{debug, info};

use trainwreck::{
    AudioCue, Direction::*, Event, Game, GameConfig, GameState, Input, Position, VirtualTimers,
    GRID_SIZE,
};
use trainwreck::entities::StationPhase;

use crate::term::{Coords, TermInt, TermManager};

const TICK_INTERVAL_MS: u64 = 5;

const BOARD_WIDTH: TermInt = GRID_SIZE as TermInt * 2 + 2;
const BOARD_HEIGHT: TermInt = GRID_SIZE as TermInt + 2;
const SCOREBOARD_LINES: TermInt = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Game(Input),
    Quit,
}

pub struct TrainWreckApp {
    term: TermManager,
    game: Game<VirtualTimers, StdRng>,
    origin: Coords,
    blink_on: bool,
}

impl TrainWreckApp {
    pub fn new(config: GameConfig, rng: StdRng) -> Result<Self> {
        let game = Game::new(config, VirtualTimers::new(), rng).context("Error creating game")?;
        let term = TermManager::new().context("Error reading terminal size")?;
        Ok(TrainWreckApp { term, game, origin: (0, 0), blink_on: true })
    }

    pub fn initialize(&mut self) -> Result<()> {
        let (w, h) = self.term.get_terminal_size();
        if w < BOARD_WIDTH || h < BOARD_HEIGHT + SCOREBOARD_LINES {
            bail!(
                "terminal is {}x{}, the board needs at least {}x{}",
                w, h, BOARD_WIDTH, BOARD_HEIGHT + SCOREBOARD_LINES
            );
        }

        self.term.setup().context("Error setting up terminal")?;
        self.origin = ((w - BOARD_WIDTH) / 2, (h - BOARD_HEIGHT - SCOREBOARD_LINES) / 2);
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore().context("Error restoring terminal")
    }

    /// Returns false if the player quit from the intro screen.
    pub fn show_intro(&mut self) -> Result<bool> {
        let lines = &[
            "TRAIN WRECK",
            "",
            "Arrow keys or WASD to move",
            "Pick up passengers, reach stations",
            "Esc to pause",
            "CTRL+C to quit",
            "",
            "Press any key to begin",
        ];

        self.term.show_message(lines)?;
        let key = self.term.read_key_blocking()?;
        self.term.hide_message()?;

        Ok(map_key(&key) != Some(Command::Quit))
    }

    pub fn play(&mut self) -> Result<()> {
        self.redraw()?;
        self.game.drain_events();
        let mut last = Instant::now();

        loop {
            sleep(Duration::from_millis(TICK_INTERVAL_MS));

            for key_ev in self.term.read_key_events_queue()? {
                match map_key(&key_ev) {
                    Some(Command::Quit) => {
                        info!("quit requested");
                        return Ok(());
                    }
                    Some(Command::Game(input)) => self.game.handle_input(input),
                    None => {}
                }
            }

            let now = Instant::now();
            self.game.advance(now - last)?;
            last = now;

            let mut went_home = false;
            for event in self.game.drain_events() {
                went_home |= event == Event::Home;
                self.handle_event(event)?;
            }

            if went_home {
                if !self.show_intro()? {
                    return Ok(());
                }
                self.redraw()?;
                last = Instant::now();
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Audio(cue) => self.play_cue(cue)?,
            Event::SessionReset => {
                self.term.hide_message()?;
                self.redraw()?;
            }
            Event::StationVanishing { .. } => self.blink_on = true,
            Event::StationBlink { .. } => {
                self.blink_on = !self.blink_on;
                self.draw_board()?;
            }
            Event::TrainMoved { .. }
            | Event::PassengerSpawned { .. }
            | Event::StationSpawned { .. }
            | Event::StationReached { .. }
            | Event::StationExpired { .. } => self.draw_board()?,
            Event::ClockTick { .. } | Event::ScoreChanged { .. } | Event::SpeedChanged { .. } => {
                self.draw_scoreboard()?
            }
            Event::Paused => {
                self.term.show_message(&["Paused", "Press Esc to resume", "or CTRL+C to quit"])?
            }
            Event::Resumed => self.term.hide_message()?,
            Event::Ended { score, new_best } => self.game_over(score, new_best)?,
            Event::Started { .. } | Event::PassengerPicked { .. } | Event::Home => {}
        }

        self.term.flush()?;
        Ok(())
    }

    fn play_cue(&mut self, cue: AudioCue) -> Result<()> {
        debug!(?cue, "audio cue");
        if matches!(cue, AudioCue::Horn | AudioCue::PowerFailure) {
            self.term.bell()?;
        }
        Ok(())
    }

    fn game_over(&mut self, score: u32, new_best: bool) -> Result<()> {
        self.draw_board()?;
        self.draw_scoreboard()?;

        let score_line = format!("Score: {}", score);
        let mut lines = vec!["Train wreck!"];
        if new_best {
            lines.push("New best score!");
        }
        lines.extend([
            score_line.as_str(),
            "",
            "R to play again, H for home,",
            "or CTRL+C to quit.",
        ]);

        self.term.show_message(&lines)?;
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        self.term.clear()?;
        self.term.draw_box(self.origin, (BOARD_WIDTH, BOARD_HEIGHT))?;
        self.draw_board()?;
        self.draw_scoreboard()?;
        self.term.flush()?;
        Ok(())
    }

    fn draw_board(&mut self) -> Result<()> {
        let session = self.game.session();
        let train = &session.train;
        let wrecked = self.game.state() == GameState::Ended;

        let mut cells = Vec::with_capacity((GRID_SIZE * GRID_SIZE) as usize);
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                let pos = Position::new(x, y);
                let cell = if pos == train.head() {
                    let head = if wrecked { 'X' } else { train.head_char() };
                    (head, ' ', Color::Cyan)
                } else if train.contains(pos) {
                    let color = if wrecked { Color::Red } else { Color::Green };
                    ('[', ']', color)
                } else if session.passenger.is_at(pos) {
                    ('o', ' ', Color::Yellow)
                } else if session.station.is_at(pos) {
                    let hidden = session.station.phase() == Some(StationPhase::Vanishing) && !self.blink_on;
                    if hidden { (' ', ' ', Color::Reset) } else { ('#', '#', Color::Blue) }
                } else {
                    ('.', ' ', Color::DarkGrey)
                };
                cells.push((pos, cell));
            }
        }

        for (pos, (left, right, color)) in cells {
            let at = self.cell_coords(pos);
            self.term.print_at(at, left, color)?;
            self.term.print_at((at.0 + 1, at.1), right, color)?;
        }

        Ok(())
    }

    fn draw_scoreboard(&mut self) -> Result<()> {
        let session = self.game.session();
        let line = format!(
            "Score {:<4} Passengers {:<3} Stations {:<3}",
            session.score.total(),
            session.score.passengers,
            session.score.stations,
        );
        let second = format!(
            "Best {:<5} Speed {:<3} Time {}",
            self.game.best_score(),
            session.train.speed(),
            session.clock.format(),
        );

        let y = self.origin.1 + BOARD_HEIGHT;
        self.term.print_str_at((self.origin.0, y), &line, Color::Reset)?;
        self.term.print_str_at((self.origin.0, y + 1), &second, Color::Reset)?;
        Ok(())
    }

    fn cell_coords(&self, pos: Position) -> Coords {
        (
            self.origin.0 + 1 + pos.x as TermInt * 2,
            self.origin.1 + 1 + pos.y as TermInt,
        )
    }
}

pub fn map_key(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    let input = match ev.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Input::Steer(Up),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Input::Steer(Left),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Input::Steer(Down),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Input::Steer(Right),
        KeyCode::Esc | KeyCode::Char('p') => Input::TogglePause,
        KeyCode::Char('r') | KeyCode::Char('R') => Input::Restart,
        KeyCode::Char('h') | KeyCode::Char('H') => Input::Home,
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(Command::Quit),
        _ => return None,
    };

    Some(Command::Game(input))
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_movement_keys() {
        assert_eq!(map_key(&key(KeyCode::Up)), Some(Command::Game(Input::Steer(Up))));
        assert_eq!(map_key(&key(KeyCode::Char('a'))), Some(Command::Game(Input::Steer(Left))));
        assert_eq!(map_key(&key(KeyCode::Char('S'))), Some(Command::Game(Input::Steer(Down))));
        assert_eq!(map_key(&key(KeyCode::Right)), Some(Command::Game(Input::Steer(Right))));
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(map_key(&key(KeyCode::Esc)), Some(Command::Game(Input::TogglePause)));
        assert_eq!(map_key(&key(KeyCode::Char('r'))), Some(Command::Game(Input::Restart)));
        assert_eq!(map_key(&key(KeyCode::Char('h'))), Some(Command::Game(Input::Home)));
        assert_eq!(map_key(&key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(map_key(&key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&ev), Some(Command::Quit));
        // plain 'c' is not bound
        assert_eq!(map_key(&key(KeyCode::Char('c'))), None);
    }
}
