//! One type-to-filter selection session over an ordered list of labels.

use std::io;

use crossterm::event::KeyEvent;
use tracing::{debug, warn};

use crate::fuzzy::{MatchResult, rank};
use crate::input::{Action, map_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Original index of the confirmed candidate.
    Selected(usize),
    Cancelled,
    EmptySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    Empty,
    Browsing,
    Filtering,
    Confirmed(usize),
    Cancelled,
}

impl SelectorState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Empty | Self::Confirmed(_) | Self::Cancelled)
    }
}

/// Keystroke source and redraw sink for a selection session.
pub trait SelectorTerminal {
    /// Blocks for the next key press. `None` reports a non-key event that only
    /// needs a redraw.
    fn next_key(&mut self) -> io::Result<Option<KeyEvent>>;

    fn draw(&mut self, frame: &SelectorFrame<'_>) -> io::Result<()>;
}

impl<T: SelectorTerminal + ?Sized> SelectorTerminal for &mut T {
    fn next_key(&mut self) -> io::Result<Option<KeyEvent>> {
        (**self).next_key()
    }

    fn draw(&mut self, frame: &SelectorFrame<'_>) -> io::Result<()> {
        (**self).draw(frame)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorFrame<'a> {
    pub prompt: &'a str,
    pub query: &'a str,
    pub rows: Vec<FrameRow<'a>>,
    /// Index into `rows`; meaningless when `rows` is empty.
    pub cursor: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRow<'a> {
    pub label: &'a str,
    pub positions: &'a [usize],
}

#[derive(Debug)]
pub struct Selector<'a> {
    labels: &'a [String],
    query: String,
    ranked: Vec<MatchResult>,
    cursor: usize,
    state: SelectorState,
}

impl<'a> Selector<'a> {
    pub fn new(labels: &'a [String]) -> Self {
        let state = if labels.is_empty() {
            SelectorState::Empty
        } else {
            SelectorState::Browsing
        };

        Self {
            labels,
            query: String::new(),
            ranked: rank("", labels),
            cursor: 0,
            state,
        }
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn ranked(&self) -> &[MatchResult] {
        &self.ranked
    }

    pub fn outcome(&self) -> Option<SelectionOutcome> {
        match self.state {
            SelectorState::Empty => Some(SelectionOutcome::EmptySource),
            SelectorState::Confirmed(index) => Some(SelectionOutcome::Selected(index)),
            SelectorState::Cancelled => Some(SelectionOutcome::Cancelled),
            SelectorState::Browsing | SelectorState::Filtering => None,
        }
    }

    pub fn apply(&mut self, action: Action) {
        if self.state.is_terminal() {
            return;
        }

        match action {
            Action::InputChar(c) => {
                self.query.push(c);
                self.requery();
            }
            Action::Backspace => {
                if self.query.pop().is_some() {
                    self.requery();
                }
            }
            Action::ClearQuery => {
                if !self.query.is_empty() {
                    self.query.clear();
                    self.requery();
                }
            }
            Action::Up(rows) => self.cursor = self.cursor.saturating_sub(rows),
            Action::Down(rows) => {
                self.cursor = self.cursor.saturating_add(rows).min(self.last_row());
            }
            Action::Top => self.cursor = 0,
            Action::Bottom => self.cursor = self.last_row(),
            Action::Confirm => {
                if let Some(result) = self.ranked.get(self.cursor) {
                    self.state = SelectorState::Confirmed(result.index);
                }
            }
            Action::Cancel => self.state = SelectorState::Cancelled,
        }
    }

    pub fn frame<'p>(&'p self, prompt: &'p str) -> SelectorFrame<'p> {
        SelectorFrame {
            prompt,
            query: &self.query,
            rows: self
                .ranked
                .iter()
                .map(|result| FrameRow {
                    label: &self.labels[result.index],
                    positions: &result.positions,
                })
                .collect(),
            cursor: self.cursor,
            total: self.labels.len(),
        }
    }

    fn last_row(&self) -> usize {
        self.ranked.len().saturating_sub(1)
    }

    fn requery(&mut self) {
        self.ranked = rank(&self.query, self.labels);
        if self.query.is_empty() {
            self.cursor = 0;
            self.state = SelectorState::Browsing;
        } else {
            self.cursor = self.cursor.min(self.last_row());
            self.state = SelectorState::Filtering;
        }
    }
}

/// Runs a session to completion. An empty list returns `EmptySource` without
/// touching the terminal.
pub fn select<T: SelectorTerminal>(
    terminal: &mut T,
    prompt: &str,
    labels: &[String],
) -> io::Result<SelectionOutcome> {
    let mut selector = Selector::new(labels);

    loop {
        if let Some(outcome) = selector.outcome() {
            debug!(prompt, ?outcome, "selection finished");
            return Ok(outcome);
        }

        if let Err(error) = terminal.draw(&selector.frame(prompt)) {
            warn!("failed to draw selector frame: {error}");
        }

        if let Some(action) = terminal.next_key()?.and_then(map_key) {
            selector.apply(action);
        }
    }
}
