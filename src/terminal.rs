use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::logging;
use crate::selector::{SelectorFrame, SelectorTerminal};
use crate::ui;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Full-screen selector backed by the process's own tty.
///
/// Raw mode and the alternate screen are entered on first use, so a session
/// that never reads a key leaves the terminal untouched. Log output is held
/// while the screen is taken.
#[derive(Default)]
pub struct CrosstermTerminal {
    active: Option<TuiTerminal>,
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restore(&mut self) -> Result<()> {
        let Some(mut terminal) = self.active.take() else {
            return Ok(());
        };
        let restored = restore_terminal(&mut terminal);
        logging::release();
        restored
    }

    fn ensure_active(&mut self) -> io::Result<&mut TuiTerminal> {
        if self.active.is_none() {
            self.active = Some(init_terminal()?);
        }
        self.active
            .as_mut()
            .ok_or_else(|| io::Error::other("terminal failed to initialize"))
    }
}

impl SelectorTerminal for CrosstermTerminal {
    fn next_key(&mut self) -> io::Result<Option<KeyEvent>> {
        self.ensure_active()?;
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
            _ => Ok(None),
        }
    }

    fn draw(&mut self, frame: &SelectorFrame<'_>) -> io::Result<()> {
        self.ensure_active()?
            .draw(|canvas| ui::render(canvas, frame))
            .map(|_| ())
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn init_terminal() -> io::Result<TuiTerminal> {
    enable_raw_mode()?;
    let terminal = undo_on_error(
        || {
            execute!(io::stdout(), EnterAlternateScreen)?;
            let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
            terminal.clear()?;
            Ok(terminal)
        },
        || {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
        },
    )?;
    logging::hold();
    Ok(terminal)
}

/// Runs `setup`; if it fails, `undo` runs before the error is returned.
fn undo_on_error<T>(
    setup: impl FnOnce() -> io::Result<T>,
    undo: impl FnOnce(),
) -> io::Result<T> {
    match setup() {
        Ok(value) => Ok(value),
        Err(error) => {
            undo();
            Err(error)
        }
    }
}

// Every step is attempted; the first failure is reported.
fn restore_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    let raw = disable_raw_mode().context("failed to disable raw mode");
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen");
    let cursor = terminal.show_cursor().context("failed to show cursor");
    raw.and(screen).and(cursor)
}
