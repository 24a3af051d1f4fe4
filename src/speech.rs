//! Fire-and-forget speech for recognized words
//!
//! The state machine never waits on speech. Words are pushed onto a bounded
//! queue and a small pool of worker threads hands them to a [`SpeechEngine`].
//! A full queue drops the word; a failing or panicking engine only loses that
//! word.

use crate::config::{MAX_SPEECH_WORKERS, SpeechConfig};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

pub trait SpeechEngine: Send + Sync {
    fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Error type for speech operations
#[derive(Debug)]
pub enum SpeechError {
    Spawn(String),
    Io(String),
    Exit(String),
}

impl std::fmt::Display for SpeechError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeechError::Spawn(msg) => write!(f, "Failed to start speech program: {}", msg),
            SpeechError::Io(msg) => write!(f, "Speech program I/O error: {}", msg),
            SpeechError::Exit(msg) => write!(f, "Speech program failed: {}", msg),
        }
    }
}

impl std::error::Error for SpeechError {}

// ============================================================================
// External command engine
// ============================================================================

/// Pipes each word into an external TTS program, e.g. `festival --tts`
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl SpeechEngine for CommandEngine {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SpeechError::Spawn(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            writeln!(stdin, "{}", text).map_err(|e| SpeechError::Io(e.to_string()))?;
        }

        let status = child.wait().map_err(|e| SpeechError::Io(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Exit(format!("{} exited with {}", self.program, status)))
        }
    }
}

/// Engine used when speech is disabled
pub struct SilentEngine;

impl SpeechEngine for SilentEngine {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        debug!(text, "speech muted");
        Ok(())
    }
}

/// Pick the engine described by config
pub fn engine_from_config(config: &SpeechConfig, mute: bool) -> Arc<dyn SpeechEngine> {
    if mute || !config.enabled {
        Arc::new(SilentEngine)
    } else {
        Arc::new(CommandEngine::new(config.program.clone(), config.args.clone()))
    }
}

// ============================================================================
// Worker pool
// ============================================================================

/// Outcome of a speak request, from the caller's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Queued,
    /// Queue full or workers gone; the word was dropped
    Dropped,
}

/// Handle for queueing words to the speech workers
///
/// Dropping the handle closes the queue; workers finish what is already
/// queued and exit on their own.
pub struct Speaker {
    tx: flume::Sender<String>,
}

impl Speaker {
    /// Start `workers` threads (clamped to 1..=3) draining a queue of `capacity`
    pub fn new(engine: Arc<dyn SpeechEngine>, workers: usize, capacity: usize) -> Self {
        let (tx, rx) = flume::bounded::<String>(capacity.max(1));
        let workers = workers.clamp(1, MAX_SPEECH_WORKERS);

        for id in 0..workers {
            let rx = rx.clone();
            let engine = Arc::clone(&engine);
            let spawned = thread::Builder::new()
                .name(format!("speech-{}", id))
                .spawn(move || run_worker(id, rx, engine));
            if let Err(e) = spawned {
                warn!(id, error = %e, "failed to start speech worker");
            }
        }

        Self { tx }
    }

    pub fn from_config(config: &SpeechConfig, mute: bool) -> Self {
        Self::new(engine_from_config(config, mute), config.workers, config.queue)
    }

    /// Queue a word without blocking
    pub fn speak(&self, word: &str) -> Dispatch {
        match self.tx.try_send(word.to_lowercase()) {
            Ok(()) => Dispatch::Queued,
            Err(flume::TrySendError::Full(word)) => {
                warn!(word = %word, "speech queue full, dropping word");
                Dispatch::Dropped
            }
            Err(flume::TrySendError::Disconnected(word)) => {
                warn!(word = %word, "speech workers gone, dropping word");
                Dispatch::Dropped
            }
        }
    }

    /// Words waiting for a worker
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

fn run_worker(id: usize, rx: flume::Receiver<String>, engine: Arc<dyn SpeechEngine>) {
    while let Ok(word) = rx.recv() {
        match engine.speak(&word) {
            Ok(()) => info!(worker = id, word = %word, "spoke"),
            Err(e) => warn!(worker = id, word = %word, error = %e, "speech failed"),
        }
    }
    debug!(worker = id, "speech worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records words and reports each one on a channel
    struct RecordingEngine {
        spoken: Mutex<Vec<String>>,
        done: flume::Sender<String>,
    }

    impl SpeechEngine for RecordingEngine {
        fn speak(&self, text: &str) -> Result<(), SpeechError> {
            self.spoken.lock().unwrap().push(text.to_string());
            let _ = self.done.send(text.to_string());
            Ok(())
        }
    }

    /// Blocks every call until released
    struct GatedEngine {
        gate: flume::Receiver<()>,
    }

    impl SpeechEngine for GatedEngine {
        fn speak(&self, _text: &str) -> Result<(), SpeechError> {
            let _ = self.gate.recv();
            Ok(())
        }
    }

    struct FailingEngine {
        calls: flume::Sender<()>,
    }

    impl SpeechEngine for FailingEngine {
        fn speak(&self, _text: &str) -> Result<(), SpeechError> {
            let _ = self.calls.send(());
            Err(SpeechError::Exit("boom".into()))
        }
    }

    #[test]
    fn test_words_reach_engine_lowercased() {
        let (done_tx, done_rx) = flume::unbounded();
        let engine = Arc::new(RecordingEngine {
            spoken: Mutex::new(Vec::new()),
            done: done_tx,
        });
        let speaker = Speaker::new(engine.clone(), 1, 8);

        assert_eq!(speaker.speak("CAT"), Dispatch::Queued);
        assert_eq!(speaker.speak("DOG"), Dispatch::Queued);

        let first = done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!((first.as_str(), second.as_str()), ("cat", "dog"));
        assert_eq!(engine.spoken.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (release_tx, release_rx) = flume::unbounded();
        let speaker = Speaker::new(Arc::new(GatedEngine { gate: release_rx }), 1, 1);

        // Fill the worker and the single queue slot, then overflow
        let results: Vec<_> = (0..10).map(|i| speaker.speak(&format!("W{}", i))).collect();
        assert!(results.contains(&Dispatch::Dropped));
        assert!(speaker.pending() <= 1);

        for _ in 0..10 {
            let _ = release_tx.send(());
        }
    }

    #[test]
    fn test_engine_failure_keeps_worker_alive() {
        let (calls_tx, calls_rx) = flume::unbounded();
        let speaker = Speaker::new(Arc::new(FailingEngine { calls: calls_tx }), 1, 4);

        speaker.speak("ONE");
        calls_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(speaker.speak("TWO"), Dispatch::Queued);
        calls_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }

    #[test]
    fn test_silent_engine() {
        assert!(SilentEngine.speak("anything").is_ok());
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let engine = CommandEngine::new("definitely-not-a-real-tts-program", vec![]);
        assert!(matches!(engine.speak("cat"), Err(SpeechError::Spawn(_))));
    }
}
