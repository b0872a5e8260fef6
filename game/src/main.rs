use std::path::Path;

use config::GameConfig;
use console_input::{ask_line, ask_yes_no};
use terminal_screen::TerminalScreen;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use vowel_race::{play_round, Alphabet, LineReader, RoundOutcome, Verdict};

mod config;
mod console_input;
mod terminal_screen;

const CONFIG_PATH: &str = "vowel_race.json";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = load_config(&config_path);
    let alphabet = match config.alphabet() {
        Ok(alphabet) => alphabet,
        Err(e) => {
            warn!("{e:#}, using the vowels instead");
            Alphabet::vowels()
        }
    };

    let reader = LineReader::stdin();
    let mut screen = TerminalScreen::new(config.clear_screen);

    if let Err(e) = play(&config, &alphabet, &reader, &mut screen).await {
        println!();
        println!("error: {e:#}");
    }

    reader.close();
    println!("See you next time");
}

fn load_config(path: &str) -> GameConfig {
    if !Path::new(path).exists() {
        debug!("no config at {path}, using defaults");
        return GameConfig::default();
    }
    match GameConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("error while loading config at startup: {e:#}");
            GameConfig::default()
        }
    }
}

async fn play(
    config: &GameConfig,
    alphabet: &Alphabet,
    reader: &LineReader,
    screen: &mut TerminalScreen,
) -> anyhow::Result<()> {
    loop {
        let random_delay = ask_yes_no(reader, "Use the random delay? [Y/N] ").await?;
        let yield_now = ask_yes_no(reader, "Use yield? [Y/N] ").await?;
        let sentence = ask_line(reader, "Enter the sentence to search: ").await?;

        println!("Searching vowels in '{sentence}' (delay: {random_delay}, yield: {yield_now})...");
        let round = config.round_config(sentence, random_delay, yield_now);
        match play_round(alphabet, &round, reader, screen).await {
            Ok(outcome) => report(&outcome),
            Err(e) => {
                println!();
                println!("Error while reading input: {e:#}");
            }
        }

        if !ask_yes_no(reader, "Play again? [Y/N] ").await? {
            return Ok(());
        }
    }
}

fn report(outcome: &RoundOutcome) {
    match outcome.verdict {
        Verdict::Won => println!("You guessed it!"),
        Verdict::Lost { guess } => println!("You lost :( ({guess} was not it)"),
        Verdict::TooSlow => {
            println!();
            println!("Too slow!");
        }
    }
    println!("The most frequent vowel was {}", outcome.answer);
    let counts = outcome
        .counts
        .iter()
        .map(|slot| format!("{}: {}", slot.symbol, slot.count))
        .collect::<Vec<_>>()
        .join(", ");
    println!("Counts: {counts}");
}
