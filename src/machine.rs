//! Input recognition state machine
//!
//! Consumes one key at a time, tracks whether the current run of letters is a
//! real word ("typing") or not ("mashing"), commits recognized words to the
//! current phrase, and moves finished phrases into history on Enter.
//!
//! Every appended letter pushes one [`InputState`] onto the classification
//! stack, which starts with an `Empty` sentinel, so the stack is always one
//! longer than the letter buffer.

use crate::config::InputConfig;
use crate::recognizer::WordRecognizer;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info};

/// Key classes understood by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// ASCII letter, either case
    Letter(char),
    Space,
    Backspace,
    Enter,
    /// Anything else; dropped without effect
    Ignored,
}

impl Key {
    /// Classify a typed character
    pub fn from_char(c: char) -> Self {
        match c {
            'a'..='z' | 'A'..='Z' => Key::Letter(c),
            ' ' => Key::Space,
            '\n' | '\r' => Key::Enter,
            '\u{8}' | '\u{7f}' => Key::Backspace,
            _ => Key::Ignored,
        }
    }
}

/// Sub-state active when a letter was appended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputState {
    /// Nothing since the last commit
    Empty,
    /// Current proto-word is not a known word
    Mashing,
    /// Space appended while mashing
    MashingSpace,
    /// Current proto-word is a known word
    Typing,
    /// Space appended after a known word; the word was committed
    TypingSpace,
}

impl fmt::Display for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputState::Empty => write!(f, "Empty"),
            InputState::Mashing | InputState::MashingSpace => write!(f, "Mashing"),
            InputState::Typing | InputState::TypingSpace => write!(f, "Typing"),
        }
    }
}

/// Requests for collaborators, returned from [`InputStateMachine::handle_key`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Speak a recognized word (uppercase)
    Speak(String),
    /// Visible state changed; redraw
    MarkDirty,
}

/// A committed phrase. Created once on Enter and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Committed words joined by single spaces
    pub phrase: String,
    /// Letter buffer at commit time
    pub letters: Vec<char>,
    /// Classification stack at commit time, sentinel included
    pub states: Vec<InputState>,
    /// `MashingSpace` entries that overflow pushed out of `states`
    pub trimmed_mashed_segments: usize,
}

impl HistoryEntry {
    /// Any part of the phrase was mashed, including parts already scrolled off
    pub fn contains_mashed_segment(&self) -> bool {
        self.trimmed_mashed_segments > 0 || self.states.contains(&InputState::MashingSpace)
    }
}

/// Core options consumed by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineSettings {
    pub max_letters: usize,
    pub reject_phrases_with_mashed_segments: bool,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            max_letters: 20,
            reject_phrases_with_mashed_segments: false,
        }
    }
}

impl From<&InputConfig> for MachineSettings {
    fn from(config: &InputConfig) -> Self {
        Self {
            max_letters: config.max_letters.max(1),
            reject_phrases_with_mashed_segments: config.reject_phrases_with_mashed_segments,
        }
    }
}

pub struct InputStateMachine {
    recognizer: WordRecognizer,
    settings: MachineSettings,
    // Both deques are kept contiguous after every key
    letters: VecDeque<char>,
    states: VecDeque<InputState>,
    trimmed_mashed_segments: usize,
    phrase_words: Vec<String>,
    history: Vec<HistoryEntry>,
}

impl InputStateMachine {
    pub fn new(recognizer: WordRecognizer, settings: MachineSettings) -> Self {
        Self {
            recognizer,
            settings,
            letters: VecDeque::new(),
            states: VecDeque::from([InputState::Empty]),
            trimmed_mashed_segments: 0,
            phrase_words: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Feed one key; returns the side effects to dispatch
    pub fn handle_key(&mut self, key: Key) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        let state = self.current_state();

        let changed = match (key, state) {
            (Key::Letter(c), _) if c.is_ascii_alphabetic() => {
                let recognized = self.append(c.to_ascii_uppercase());
                self.push_state(if recognized.is_some() {
                    InputState::Typing
                } else {
                    InputState::Mashing
                });
                true
            }
            (Key::Letter(_) | Key::Ignored, _) => false,

            (Key::Space, InputState::Empty | InputState::MashingSpace | InputState::TypingSpace) => {
                false
            }
            (Key::Space, InputState::Mashing) => {
                self.append(' ');
                self.push_state(InputState::MashingSpace);
                true
            }
            (Key::Space, InputState::Typing) => {
                match self.append(' ') {
                    Some(word) => {
                        info!(word = %word, "word committed");
                        effects.push(SideEffect::Speak(word.clone()));
                        self.phrase_words.push(word);
                        self.push_state(InputState::TypingSpace);
                    }
                    // Overflow can cut the front off a recognized word
                    None => self.push_state(InputState::MashingSpace),
                }
                true
            }

            (Key::Backspace, InputState::Empty) => false,
            (Key::Backspace, InputState::TypingSpace) => {
                self.pop();
                self.phrase_words.pop();
                true
            }
            (
                Key::Backspace,
                InputState::Mashing | InputState::MashingSpace | InputState::Typing,
            ) => {
                self.pop();
                true
            }

            (Key::Enter, InputState::Empty) => false,
            (Key::Enter, InputState::Mashing | InputState::MashingSpace) => {
                debug!(letters = self.letters.len(), "discarding mashed input");
                self.reset();
                true
            }
            (Key::Enter, InputState::Typing) => {
                if let Some(word) = self.recognizer.recognize(self.letters.make_contiguous()) {
                    info!(word = %word, "word committed");
                    effects.push(SideEffect::Speak(word.clone()));
                    self.phrase_words.push(word);
                }
                self.commit();
                true
            }
            (Key::Enter, InputState::TypingSpace) => {
                self.commit();
                true
            }
        };

        if changed {
            debug!(?key, from = ?state, to = ?self.current_state(), "transition");
            effects.push(SideEffect::MarkDirty);
        }
        effects
    }

    /// Top of the classification stack
    pub fn current_state(&self) -> InputState {
        self.states.back().copied().unwrap_or(InputState::Empty)
    }

    pub fn letters(&self) -> &[char] {
        self.letters.as_slices().0
    }

    /// Classification stack including the leading sentinel
    pub fn states(&self) -> &[InputState] {
        self.states.as_slices().0
    }

    pub fn phrase_words(&self) -> &[String] {
        &self.phrase_words
    }

    pub fn current_phrase(&self) -> String {
        self.phrase_words.join(" ")
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn settings(&self) -> MachineSettings {
        self.settings
    }

    /// Push a letter and re-run recognition on the whole buffer
    fn append(&mut self, c: char) -> Option<String> {
        self.letters.push_back(c);
        self.recognizer.recognize(self.letters.make_contiguous())
    }

    /// Push the state for the letter just appended, then enforce capacity
    fn push_state(&mut self, state: InputState) {
        self.states.push_back(state);
        while self.letters.len() > self.settings.max_letters {
            self.letters.pop_front();
            // Keep the sentinel at index 0
            if self.states.remove(1) == Some(InputState::MashingSpace) {
                self.trimmed_mashed_segments += 1;
            }
        }
        self.letters.make_contiguous();
        self.states.make_contiguous();
    }

    fn pop(&mut self) {
        if self.letters.pop_back().is_some() && self.states.len() > 1 {
            self.states.pop_back();
        }
    }

    fn commit(&mut self) {
        let entry = HistoryEntry {
            phrase: self.current_phrase(),
            letters: self.letters().to_vec(),
            states: self.states().to_vec(),
            trimmed_mashed_segments: self.trimmed_mashed_segments,
        };
        if entry.phrase.is_empty() {
            debug!("nothing to commit");
        } else if self.settings.reject_phrases_with_mashed_segments
            && entry.contains_mashed_segment()
        {
            info!(phrase = %entry.phrase, "phrase rejected: contains mashed segment");
        } else {
            info!(phrase = %entry.phrase, "phrase committed");
            self.history.push(entry);
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.letters.clear();
        self.states.truncate(1);
        self.trimmed_mashed_segments = 0;
        self.phrase_words.clear();
    }
}
