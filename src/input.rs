//! Terminal key events mapped to state machine keys

use crate::machine::Key;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Events from the terminal reader thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    ScrollUp,
    ScrollDown,
    Resize,
    Quit,
}

/// Map a crossterm key event. `None` for releases and repeats we don't care
/// about.
pub fn map_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') => Some(InputEvent::Quit),
            _ => Some(InputEvent::Key(Key::Ignored)),
        };
    }

    let event = match key.code {
        KeyCode::Esc => InputEvent::Quit,
        KeyCode::PageUp => InputEvent::ScrollUp,
        KeyCode::PageDown => InputEvent::ScrollDown,
        // A period ends a word just like a space
        KeyCode::Char('.') => InputEvent::Key(Key::Space),
        KeyCode::Char(c) => InputEvent::Key(Key::from_char(c)),
        KeyCode::Backspace => InputEvent::Key(Key::Backspace),
        KeyCode::Enter => InputEvent::Key(Key::Enter),
        _ => InputEvent::Key(Key::Ignored),
    };
    Some(event)
}

/// Read terminal events on a dedicated thread until the receiver goes away
pub fn start_reader(tx: flume::Sender<InputEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        loop {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => {}
                Ok(false) => {
                    if tx.is_disconnected() {
                        break;
                    }
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "terminal poll failed");
                    break;
                }
            }

            let mapped = match event::read() {
                Ok(Event::Key(key)) => map_key(key),
                Ok(Event::Resize(_, _)) => Some(InputEvent::Resize),
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "terminal read failed");
                    break;
                }
            };

            if let Some(event) = mapped {
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
        debug!("input reader exiting");
    })
}
