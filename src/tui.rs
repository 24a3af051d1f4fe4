//! Full-screen terminal view of the letter buffer and phrase history

use crate::config::DisplayConfig;
use crate::letters::{LetterStyle, Sound, Vowels, classify};
use crate::machine::{InputState, InputStateMachine};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, execute, queue};
use std::io::{self, Write, stdout};
use std::ops::Range;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const TITLE: &str = "MASH!";

#[derive(Debug, Clone, Copy)]
struct Palette {
    vowel: Color,
    consonant: Color,
    mashed: Color,
}

impl Palette {
    fn from_config(display: &DisplayConfig) -> Self {
        let rgb = |[r, g, b]: [u8; 3]| Color::Rgb { r, g, b };
        Self {
            vowel: rgb(display.vowel_color),
            consonant: rgb(display.consonant_color),
            mashed: rgb(display.mashed_color),
        }
    }

    fn color(&self, style: &LetterStyle) -> Color {
        match (style.mashed, style.sound) {
            (true, _) => self.mashed,
            (false, Sound::Vowel) => self.vowel,
            (false, Sound::Consonant) => self.consonant,
        }
    }
}

pub struct Tui {
    palette: Palette,
    vowels: Vowels,
    history_lines: Option<usize>,
    blink: Duration,
    last_blink: Instant,
    cursor_on: bool,
    scroll: usize,
    dirty: bool,
}

impl Tui {
    pub fn new(display: &DisplayConfig, vowels: Vowels) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(Self {
            palette: Palette::from_config(display),
            vowels,
            history_lines: display.history_lines,
            blink: Duration::from_millis(display.cursor_blink_ms.max(1)),
            last_blink: Instant::now(),
            cursor_on: true,
            scroll: 0,
            dirty: true,
        })
    }

    pub fn restore(&self) -> io::Result<()> {
        execute!(stdout(), cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Scroll one entry further back in history
    pub fn scroll_up(&mut self, history_len: usize) {
        if self.scroll + 1 < history_len {
            self.scroll += 1;
            self.dirty = true;
        }
    }

    pub fn scroll_down(&mut self) {
        if self.scroll > 0 {
            self.scroll -= 1;
            self.dirty = true;
        }
    }

    /// Jump back to the newest history entry
    pub fn scroll_to_bottom(&mut self) {
        if self.scroll != 0 {
            self.scroll = 0;
            self.dirty = true;
        }
    }

    /// Advance the cursor blink. Returns true when a redraw is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_blink) >= self.blink {
            self.cursor_on = !self.cursor_on;
            self.last_blink = now;
            self.dirty = true;
        }
        self.dirty
    }

    pub fn draw(&mut self, machine: &InputStateMachine) -> io::Result<()> {
        let (width, height) = terminal::size().map(|(w, h)| (w as usize, h as usize))?;
        let mut out = stdout();
        queue!(out, terminal::Clear(ClearType::All))?;

        if height == 0 || width == 0 {
            self.dirty = false;
            return out.flush();
        }

        // Status line
        let status = status_line(machine.current_state(), machine.history().len(), self.scroll);
        let padding = width.saturating_sub(status.width()) / 2;
        queue!(
            out,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::DarkGrey),
            Print(" ".repeat(padding)),
            Print(&status),
            ResetColor,
        )?;

        // Input line, right-aligned with a trailing cursor
        let input_row = height - 1;
        let styles = classify(machine.letters(), machine.states(), &self.vowels);
        let visible = tail(&styles, width.saturating_sub(2));
        let col = width.saturating_sub(visible.len() + 2);
        queue!(out, cursor::MoveTo(col as u16, input_row as u16))?;
        self.queue_letters(&mut out, visible)?;
        queue!(
            out,
            SetForegroundColor(Color::White),
            Print(if self.cursor_on { '_' } else { ' ' }),
            ResetColor,
        )?;

        // Current phrase just above the input
        if height >= 3 {
            let phrase = machine.current_phrase();
            let shown = truncate_start(&phrase, width);
            queue!(
                out,
                cursor::MoveTo(0, (input_row - 1) as u16),
                SetForegroundColor(Color::Grey),
                Print(shown),
                ResetColor,
            )?;
        }

        // History fills upward from the phrase line to under the status line
        let mut rows = height.saturating_sub(3);
        if let Some(cap) = self.history_lines {
            rows = rows.min(cap);
        }
        let history = machine.history();
        let range = visible_history(history.len(), rows, self.scroll);
        for (offset, entry) in history[range].iter().rev().enumerate() {
            let row = input_row - 2 - offset;
            let styles = classify(&entry.letters, &entry.states, &self.vowels);
            queue!(out, cursor::MoveTo(0, row as u16))?;
            self.queue_letters(&mut out, tail(&styles, width))?;
        }

        out.flush()?;
        self.dirty = false;
        Ok(())
    }

    fn queue_letters(&self, out: &mut impl Write, styles: &[LetterStyle]) -> io::Result<()> {
        for style in styles {
            if style.mashed {
                queue!(out, SetAttribute(Attribute::Dim))?;
            }
            queue!(
                out,
                SetForegroundColor(self.palette.color(style)),
                Print(style.ch),
                SetAttribute(Attribute::Reset),
            )?;
        }
        queue!(out, ResetColor)
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn status_line(state: InputState, phrases: usize, scroll: usize) -> String {
    let mut status = format!("{} │ {} │ {} phrases", TITLE, state, phrases);
    if scroll > 0 {
        status.push_str(&format!(" │ ↑{}", scroll));
    }
    status
}

/// Indices of history entries to draw, oldest first, newest `scroll` skipped
fn visible_history(len: usize, rows: usize, scroll: usize) -> Range<usize> {
    let end = len - scroll.min(len);
    let start = end.saturating_sub(rows);
    start..end
}

/// Last `n` items; the input line drops its oldest letters when narrow
fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

fn truncate_start(text: &str, width: usize) -> &str {
    let mut start = 0;
    while text[start..].width() > width {
        match text[start..].chars().next() {
            Some(c) => start += c.len_utf8(),
            None => break,
        }
    }
    &text[start..]
}
