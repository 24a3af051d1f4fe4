//! Per-letter classification for rendering
//!
//! Derived from the letter buffer and its classification stack; nothing here
//! is stored state.

use crate::machine::InputState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Vowel,
    Consonant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterStyle {
    pub ch: char,
    pub sound: Sound,
    /// Letter belongs to a run that was never recognized as a word
    pub mashed: bool,
}

/// Set of characters drawn in the vowel color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vowels(Vec<char>);

impl Vowels {
    pub fn new(chars: &str) -> Self {
        let mut set: Vec<char> = chars
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        set.sort_unstable();
        set.dedup();
        Self(set)
    }

    pub fn sound(&self, c: char) -> Sound {
        if self.0.binary_search(&c.to_ascii_uppercase()).is_ok() {
            Sound::Vowel
        } else {
            Sound::Consonant
        }
    }
}

impl Default for Vowels {
    fn default() -> Self {
        Self::new("AEIOU")
    }
}

/// Mashed flag for each letter, given a stack that includes the sentinel.
///
/// Walks backwards: a trailing `Typing` run starts out recognized, crossing a
/// `TypingSpace` switches to recognized, crossing a `MashingSpace` switches
/// back to mashed.
pub fn mashed_flags(states: &[InputState]) -> Vec<bool> {
    let per_letter = states.get(1..).unwrap_or_default();
    let mut flags = vec![true; per_letter.len()];
    let mut mashed = per_letter.last() != Some(&InputState::Typing);

    for (i, state) in per_letter.iter().enumerate().rev() {
        match state {
            InputState::TypingSpace => mashed = false,
            InputState::MashingSpace => mashed = true,
            InputState::Empty | InputState::Mashing | InputState::Typing => {}
        }
        flags[i] = mashed;
    }
    flags
}

/// Style every letter. `states` must start with the `Empty` sentinel. If the
/// stack covers fewer letters than `letters`, it is aligned to the end and
/// the uncovered leading letters count as mashed.
pub fn classify(letters: &[char], states: &[InputState], vowels: &Vowels) -> Vec<LetterStyle> {
    let flags = mashed_flags(states);
    let skip = flags.len().saturating_sub(letters.len());
    let pad = letters.len().saturating_sub(flags.len());

    letters
        .iter()
        .enumerate()
        .map(|(i, &ch)| LetterStyle {
            ch,
            sound: vowels.sound(ch),
            mashed: i < pad || flags[skip + i - pad],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use InputState::*;

    #[test]
    fn test_vowels() {
        let vowels = Vowels::new("aeiouY!");
        assert_eq!(vowels.sound('A'), Sound::Vowel);
        assert_eq!(vowels.sound('y'), Sound::Vowel);
        assert_eq!(vowels.sound('T'), Sound::Consonant);
        assert_eq!(vowels.sound(' '), Sound::Consonant);
    }

    #[test]
    fn test_all_mashed() {
        // "CAX "
        let states = [Empty, Mashing, Mashing, Mashing, MashingSpace];
        assert_eq!(mashed_flags(&states), vec![true; 4]);
    }

    #[test]
    fn test_trailing_typed_word() {
        // "CAT"
        let states = [Empty, Mashing, Mashing, Typing];
        assert_eq!(mashed_flags(&states), vec![false; 3]);
    }

    #[test]
    fn test_word_gone_mashed() {
        // "CATX": once extended past the word the whole run is mashed
        let states = [Empty, Mashing, Mashing, Typing, Mashing];
        assert_eq!(mashed_flags(&states), vec![true; 4]);
    }

    #[test]
    fn test_mixed_phrase() {
        // "XQ CAT ZZ"
        let states = [
            Empty,
            Mashing,
            Mashing,
            MashingSpace,
            Mashing,
            Mashing,
            Typing,
            TypingSpace,
            Mashing,
            Mashing,
        ];
        assert_eq!(
            mashed_flags(&states),
            vec![true, true, true, false, false, false, false, true, true]
        );
    }

    #[test]
    fn test_empty_stack() {
        assert!(mashed_flags(&[Empty]).is_empty());
        assert!(mashed_flags(&[]).is_empty());
    }

    #[test]
    fn test_classify() {
        let letters = ['C', 'A', 'T', ' '];
        let states = [Empty, Mashing, Mashing, Typing, TypingSpace];
        let styles = classify(&letters, &states, &Vowels::default());
        assert_eq!(styles.len(), 4);
        assert!(styles.iter().all(|s| !s.mashed));
        assert_eq!(styles[0].sound, Sound::Consonant);
        assert_eq!(styles[1].sound, Sound::Vowel);
    }

    #[test]
    fn test_classify_misaligned_stack() {
        let letters = ['Z', 'C', 'A', 'T'];
        // Stack covers only the last three letters
        let states = [Empty, Mashing, Typing, Typing];
        let styles = classify(&letters, &states, &Vowels::default());
        assert_eq!(
            styles.iter().map(|s| s.mashed).collect::<Vec<_>>(),
            vec![true, false, false, false]
        );
    }

    #[test]
    fn test_classify_stack_without_sentinel_loses_first_letter() {
        let letters = ['C', 'A', 'T'];
        // Index 0 is always read as the sentinel
        let states = [Mashing, Mashing, Typing];
        let styles = classify(&letters, &states, &Vowels::default());
        assert_eq!(
            styles.iter().map(|s| s.mashed).collect::<Vec<_>>(),
            vec![true, false, false]
        );
    }
}
