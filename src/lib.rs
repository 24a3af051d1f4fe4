//! MASH! is a typing toy that finds real words in keyboard mashing
//!
//! The core is [`machine::InputStateMachine`]: feed it one [`machine::Key`]
//! at a time and it reports which words to speak and when the screen needs a
//! redraw. Everything else (dictionary, speech, terminal) plugs in around it.

pub mod config;
pub mod dictionary;
pub mod input;
pub mod letters;
pub mod machine;
pub mod recognizer;
pub mod speech;
pub mod trace_init;
pub mod tui;

pub use dictionary::Dictionary;
pub use letters::{LetterStyle, Sound, Vowels, classify};
pub use machine::{HistoryEntry, InputState, InputStateMachine, Key, MachineSettings, SideEffect};
pub use recognizer::WordRecognizer;
pub use speech::{Dispatch, Speaker, SpeechEngine};
