use anyhow::Context;
use clap::{Parser, Subcommand};
use mash::config::{Config, DEFAULT_CONFIG_PATH};
use mash::input::{self, InputEvent};
use mash::trace_init::init_tracing;
use mash::tui::Tui;
use mash::{Dictionary, InputStateMachine, MachineSettings, SideEffect, Speaker, Vowels, WordRecognizer};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Parser)]
#[command(name = "mash", about = "Mash the keyboard, hear the words you find")]
struct Cli {
    /// Config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Word list, overrides `words.word_list` from config
    #[arg(long)]
    words: Option<PathBuf>,

    /// Don't speak recognized words
    #[arg(long)]
    mute: bool,

    /// Write logs to <DIR>/mash.log
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load config and word list, print a summary, and exit
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = cli.log_dir.as_deref().and_then(init_tracing);

    let mut config = Config::load(&cli.config)?;
    if let Some(words) = cli.words.clone() {
        config.words.word_list = Some(words);
    }
    let dictionary = load_dictionary(&config)?;

    if matches!(cli.command, Some(Command::Check)) {
        print_summary(&config, &dictionary);
        return Ok(());
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(config, dictionary, cli.mute))
}

fn load_dictionary(config: &Config) -> anyhow::Result<Dictionary> {
    let base = match &config.words.word_list {
        Some(path) => Dictionary::load(path)?,
        None => Dictionary::builtin(),
    };
    let dictionary = base.with_custom(&config.words.custom);
    info!(words = dictionary.len(), "dictionary loaded");
    Ok(dictionary)
}

fn print_summary(config: &Config, dictionary: &Dictionary) {
    println!("words:        {}", dictionary.len());
    println!("max letters:  {}", config.input.max_letters);
    println!("vowels:       {}", config.input.vowels);
    println!(
        "mashed phrases kept in history: {}",
        !config.input.reject_phrases_with_mashed_segments
    );
    if config.speech.enabled {
        println!(
            "speech:       {} {} ({} worker(s))",
            config.speech.program,
            config.speech.args.join(" "),
            config.speech.workers
        );
    } else {
        println!("speech:       off");
    }
}

async fn run(config: Config, dictionary: Dictionary, mute: bool) -> anyhow::Result<()> {
    let speaker = Speaker::from_config(&config.speech, mute);
    let mut machine = InputStateMachine::new(
        WordRecognizer::new(dictionary),
        MachineSettings::from(&config.input),
    );

    // Channel: terminal reader thread -> event loop
    let (input_tx, input_rx) = flume::unbounded::<InputEvent>();
    let mut tui = Tui::new(&config.display, Vowels::new(&config.input.vowels))
        .context("setting up terminal")?;
    let _reader = input::start_reader(input_tx);

    let frame = Duration::from_millis(1000 / u64::from(config.display.fps.max(1)));
    let mut interval = tokio::time::interval(frame);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("ready");
    loop {
        tokio::select! {
            event = input_rx.recv_async() => {
                let Ok(event) = event else { break };
                match event {
                    InputEvent::Quit => break,
                    InputEvent::Key(key) => {
                        for effect in machine.handle_key(key) {
                            match effect {
                                SideEffect::Speak(word) => {
                                    speaker.speak(&word);
                                }
                                SideEffect::MarkDirty => {
                                    tui.scroll_to_bottom();
                                    tui.mark_dirty();
                                }
                            }
                        }
                    }
                    InputEvent::ScrollUp => tui.scroll_up(machine.history().len()),
                    InputEvent::ScrollDown => tui.scroll_down(),
                    InputEvent::Resize => tui.mark_dirty(),
                }
            }

            _ = interval.tick() => {
                if tui.tick(Instant::now()) {
                    tui.draw(&machine).context("drawing")?;
                }
            }
        }
    }

    tui.restore().context("restoring terminal")?;
    info!(phrases = machine.history().len(), "bye");
    Ok(())
}
