//! Word recognition over the letter buffer

use crate::dictionary::Dictionary;

/// Finds the trailing proto-word of a letter buffer and checks it against the
/// dictionary.
#[derive(Debug, Clone)]
pub struct WordRecognizer {
    dictionary: Dictionary,
}

impl WordRecognizer {
    pub fn new(dictionary: Dictionary) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Return the trailing proto-word, uppercased, if it is a known word
    pub fn recognize(&self, buffer: &[char]) -> Option<String> {
        let proto = last_proto_word(buffer);
        if proto.is_empty() {
            return None;
        }
        let word: String = proto.iter().map(|c| c.to_ascii_uppercase()).collect();
        self.dictionary.contains(&word).then_some(word)
    }
}

/// The run of letters after the last space, ignoring one trailing space
pub fn last_proto_word(buffer: &[char]) -> &[char] {
    let trimmed = match buffer.split_last() {
        Some((&' ', rest)) => rest,
        Some(_) => buffer,
        None => return buffer,
    };
    match trimmed.iter().rposition(|&c| c == ' ') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}
