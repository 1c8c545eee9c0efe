use std::io::{self, Stdout, Write, stdout};
use std::time::Duration;

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::event::{Event, KeyEvent, KeyEventKind, poll, read};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};

pub type TermInt = u16;
pub type Coords = (TermInt, TermInt);

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    color: Color,
}

const BLANK: Cell = Cell { ch: ' ', color: Color::Reset };

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<Cell>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let screen = vec![BLANK; width as usize * height as usize];
        Ok(TermManager { width, height, stdout: stdout(), screen, current_msg: None })
    }

    pub fn setup(&mut self) -> io::Result<()> {
        execute!(self.stdout, EnterAlternateScreen, cursor::Hide, cursor::DisableBlinking)?;
        terminal::enable_raw_mode()
    }

    pub fn restore(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(
            self.stdout,
            style::ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            LeaveAlternateScreen
        )
    }

    pub fn read_key_blocking(&self) -> io::Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                if ev.kind == KeyEventKind::Press {
                    return Ok(ev);
                }
            }
        }
    }

    pub fn read_key_events_queue(&self) -> io::Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1))? {
            if let Event::Key(ev) = read()? {
                if ev.kind == KeyEventKind::Press {
                    events.push(ev);
                }
            }
        }

        Ok(events)
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    /// Draws a box whose outer corners are `top_left` and `top_left + size - 1`.
    pub fn draw_box(&mut self, top_left: Coords, size: Coords) -> io::Result<()> {
        let (left, top) = top_left;
        let (width, height) = size;
        let (right, bottom) = (left + width - 1, top + height - 1);

        for x in left..=right {
            let ch = if x == left || x == right { '+' } else { '-' };
            self.print_at((x, top), ch, Color::Reset)?;
            self.print_at((x, bottom), ch, Color::Reset)?;
        }

        for y in top + 1..bottom {
            self.print_at((left, y), '|', Color::Reset)?;
            self.print_at((right, y), '|', Color::Reset)?;
        }

        self.flush()
    }

    pub fn print_str_at(&mut self, pos: Coords, text: &str, color: Color) -> io::Result<()> {
        for (i, ch) in text.chars().enumerate() {
            self.print_at((pos.0 + i as TermInt, pos.1), ch, color)?;
        }
        Ok(())
    }

    pub fn show_message(&mut self, lines: &[&str]) -> io::Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1] {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, y), BLANK)?;
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                let cell = Cell { ch, color: Color::Reset };
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), cell)?;
            }
        }

        self.current_msg = Some(Message { width: msg_width, height: msg_height, top_left });
        self.flush()
    }

    pub fn hide_message(&mut self) -> io::Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let pos = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                if let Some(cell) = self.cell(pos) {
                    self.print_at_no_save(pos, cell)?;
                }
            }
        }

        self.flush()
    }

    /// Prints and remembers a character, so it survives message overlays.
    pub fn print_at(&mut self, pos: Coords, ch: char, color: Color) -> io::Result<()> {
        let cell = Cell { ch, color };
        if let Some(index) = self.index(pos) {
            self.screen[index] = cell;
        }
        if self.is_covered(pos) {
            return Ok(());
        }
        self.print_at_no_save(pos, cell)
    }

    pub fn clear(&mut self) -> io::Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![BLANK; self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }

    pub fn bell(&mut self) -> io::Result<()> {
        queue!(self.stdout, style::Print('\x07'))
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_at_no_save(&mut self, pos: Coords, cell: Cell) -> io::Result<()> {
        // Used for messages, which must not overwrite the buffer they are restored from
        queue!(
            self.stdout,
            cursor::MoveTo(pos.0, pos.1),
            style::SetForegroundColor(cell.color),
            style::Print(cell.ch)
        )
    }

    fn index(&self, pos: Coords) -> Option<usize> {
        (pos.0 < self.width && pos.1 < self.height)
            .then(|| self.width as usize * pos.1 as usize + pos.0 as usize)
    }

    fn cell(&self, pos: Coords) -> Option<Cell> {
        self.index(pos).map(|index| self.screen[index])
    }

    fn is_covered(&self, pos: Coords) -> bool {
        self.current_msg.as_ref().map_or(false, |msg| {
            (msg.top_left.0..msg.top_left.0 + msg.width).contains(&pos.0)
                && (msg.top_left.1..msg.top_left.1 + msg.height).contains(&pos.1)
        })
    }
}
