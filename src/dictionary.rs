//! Known-word dictionary
//!
//! Words are stored uppercased. The set is built once at startup (built-in
//! list or a word list file, plus custom words from config) and never changes
//! afterwards.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const BUILTIN_WORDS: &str = include_str!("../words.txt");

/// Error type for dictionary loading
#[derive(Debug)]
pub enum DictionaryError {
    Read { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for DictionaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DictionaryError::Read { path, source } => {
                write!(f, "Failed to read word list {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for DictionaryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DictionaryError::Read { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// Build from arbitrary entries. Blank entries and entries containing
    /// anything other than ASCII letters are skipped.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words.into_iter().filter_map(|w| normalize(w.as_ref())).collect();
        Self { words }
    }

    /// Dictionary compiled into the binary
    pub fn builtin() -> Self {
        Self::from_words(BUILTIN_WORDS.lines())
    }

    /// Load a newline-separated word list
    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        let text = fs::read_to_string(path).map_err(|source| DictionaryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_words(text.lines()))
    }

    /// Add user-supplied words on top of the base list
    pub fn with_custom<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words
            .extend(words.into_iter().filter_map(|w| normalize(w.as_ref())));
        self
    }

    /// Case-insensitive membership check
    pub fn contains(&self, word: &str) -> bool {
        if word.bytes().all(|b| !b.is_ascii_lowercase()) {
            self.words.contains(word)
        } else {
            self.words.contains(&word.to_ascii_uppercase())
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn normalize(entry: &str) -> Option<String> {
    let entry = entry.trim();
    if entry.is_empty() || !entry.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(entry.to_ascii_uppercase())
}
