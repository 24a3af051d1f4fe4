use anyhow::{Context, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub words: WordsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

// ============================================================================
// Input Config
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Letters kept on screen before the oldest is dropped
    #[serde(default = "default_max_letters")]
    pub max_letters: usize,

    /// Letters drawn in the vowel color
    #[serde(default = "default_vowels")]
    pub vowels: String,

    /// Keep phrases out of history if any part of them was mashed
    #[serde(default)]
    pub reject_phrases_with_mashed_segments: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_letters: default_max_letters(),
            vowels: default_vowels(),
            reject_phrases_with_mashed_segments: false,
        }
    }
}

fn default_max_letters() -> usize {
    20
}

fn default_vowels() -> String {
    "AEIOU".into()
}

// ============================================================================
// Words Config
// ============================================================================

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct WordsConfig {
    /// Newline-separated word list; the built-in list is used when unset
    #[serde(default)]
    pub word_list: Option<PathBuf>,

    /// Extra words added on top of the list
    #[serde(default)]
    pub custom: Vec<String>,
}

// ============================================================================
// Display Config
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_cursor_blink_ms")]
    pub cursor_blink_ms: u64,
    #[serde(default = "default_vowel_color")]
    pub vowel_color: [u8; 3],
    #[serde(default = "default_consonant_color")]
    pub consonant_color: [u8; 3],
    #[serde(default = "default_mashed_color")]
    pub mashed_color: [u8; 3],
    /// Cap on history rows drawn; fills the screen when unset
    #[serde(default)]
    pub history_lines: Option<usize>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            cursor_blink_ms: default_cursor_blink_ms(),
            vowel_color: default_vowel_color(),
            consonant_color: default_consonant_color(),
            mashed_color: default_mashed_color(),
            history_lines: None,
        }
    }
}

fn default_fps() -> u32 {
    30
}

fn default_cursor_blink_ms() -> u64 {
    500
}

fn default_vowel_color() -> [u8; 3] {
    [255, 200, 60]
}

fn default_consonant_color() -> [u8; 3] {
    [90, 180, 255]
}

fn default_mashed_color() -> [u8; 3] {
    [110, 110, 110]
}

// ============================================================================
// Speech Config
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SpeechConfig {
    #[serde(default = "default_speech_enabled")]
    pub enabled: bool,

    /// TTS program; the word is written to its stdin
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Concurrent speech workers (1-3)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Pending words allowed before new ones are dropped
    #[serde(default = "default_queue")]
    pub queue: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: default_speech_enabled(),
            program: default_program(),
            args: default_args(),
            workers: default_workers(),
            queue: default_queue(),
        }
    }
}

fn default_speech_enabled() -> bool {
    true
}

fn default_program() -> String {
    "festival".into()
}

fn default_args() -> Vec<String> {
    vec!["--tts".to_string()]
}

fn default_workers() -> usize {
    1
}

fn default_queue() -> usize {
    8
}

pub const MAX_SPEECH_WORKERS: usize = 3;

impl Config {
    /// Load from `path`. A missing file gives the defaults; anything that
    /// fails to parse or validate is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("loading config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.input.max_letters == 0 {
            bail!("input.max_letters must be at least 1");
        }
        if self.input.vowels.is_empty() {
            bail!("input.vowels must not be empty");
        }
        if let Some(c) = self.input.vowels.chars().find(|c| !c.is_ascii_alphabetic()) {
            bail!("input.vowels may only contain letters A-Z, found {:?}", c);
        }
        if !(1..=240).contains(&self.display.fps) {
            bail!("display.fps must be between 1 and 240, got {}", self.display.fps);
        }
        if !(1..=MAX_SPEECH_WORKERS).contains(&self.speech.workers) {
            bail!(
                "speech.workers must be between 1 and {}, got {}",
                MAX_SPEECH_WORKERS,
                self.speech.workers
            );
        }
        if self.speech.queue == 0 {
            bail!("speech.queue must be at least 1");
        }
        if self.speech.enabled && self.speech.program.trim().is_empty() {
            bail!("speech.program must be set when speech is enabled");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.input.max_letters, 20);
        assert_eq!(config.input.vowels, "AEIOU");
        assert!(!config.input.reject_phrases_with_mashed_segments);
        assert_eq!(config.display.fps, 30);
        assert_eq!(config.speech.program, "festival");
        assert_eq!(config.speech.args, vec!["--tts"]);
        assert_eq!(config.speech.workers, 1);
        assert!(config.words.word_list.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [input]
            max_letters = 12
            reject_phrases_with_mashed_segments = true

            [words]
            custom = ["zorp", "blat"]

            [display]
            vowel_color = [1, 2, 3]
            "#,
        )
        .unwrap();
        assert_eq!(config.input.max_letters, 12);
        assert!(config.input.reject_phrases_with_mashed_segments);
        assert_eq!(config.input.vowels, "AEIOU");
        assert_eq!(config.words.custom, vec!["zorp", "blat"]);
        assert_eq!(config.display.vowel_color, [1, 2, 3]);
        assert_eq!(config.display.cursor_blink_ms, 500);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::parse("font_size = 150").is_err());
        assert!(Config::parse("[input]\nmax_letterz = 3").is_err());
    }

    #[test]
    fn test_validation() {
        assert!(Config::parse("[input]\nmax_letters = 0").is_err());
        assert!(Config::parse("[input]\nvowels = \"\"").is_err());
        assert!(Config::parse("[input]\nvowels = \"A1\"").is_err());
        assert!(Config::parse("[display]\nfps = 0").is_err());
        assert!(Config::parse("[speech]\nworkers = 4").is_err());
        assert!(Config::parse("[speech]\nqueue = 0").is_err());
        assert!(Config::parse("[speech]\nenabled = false\nprogram = \"\"").is_ok());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.input.max_letters, 20);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[speech]\nprogram = \"espeak\"\nargs = []").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.speech.program, "espeak");
        assert!(config.speech.args.is_empty());
    }

    #[test]
    fn test_load_invalid_file_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[input]\nmax_letters = \"lots\"").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains(&file.path().display().to_string()));
    }
}
