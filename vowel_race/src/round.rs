use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{bail, Context};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::alphabet::{to_lower, Alphabet};
use crate::cancel::CancelToken;
use crate::line_reader::{LineError, LineReader};
use crate::message_log::MessageLog;
use crate::screen::Screen;
use crate::shared_counters::{SharedCounters, SymbolCount};
use crate::symbol_search_worker::{SymbolSearchWorker, WorkerError, WorkerOptions};

pub const DEFAULT_GUESS_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RENDER_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct RoundConfig {
    pub sentence: String,
    pub options: WorkerOptions,
    pub guess_timeout: Duration,
    pub render_interval: Duration,
}

impl RoundConfig {
    pub fn new(sentence: impl Into<String>) -> RoundConfig {
        RoundConfig {
            sentence: sentence.into(),
            options: WorkerOptions::default(),
            guess_timeout: DEFAULT_GUESS_TIMEOUT,
            render_interval: DEFAULT_RENDER_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Won,
    Lost { guess: char },
    TooSlow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub verdict: Verdict,
    pub answer: char,
    pub counts: Vec<SymbolCount>,
}

/// Plays one round: one worker thread per symbol scans the sentence while
/// the player's guess is raced against `guess_timeout`. The screen is
/// redrawn with the workers' messages until all of them are done.
///
/// A guess that cannot be read (closed reader, failing input) cancels the
/// workers, waits for them to stop and fails the round.
pub async fn play_round(
    alphabet: &Alphabet,
    config: &RoundConfig,
    reader: &LineReader,
    screen: &mut impl Screen,
) -> anyhow::Result<RoundOutcome> {
    let counters = Arc::new(SharedCounters::new(alphabet.clone()));
    let log = MessageLog::new();
    let cancel = Arc::new(CancelToken::new());

    let mut guess = reader.request_line().context("could not ask for a guess")?;

    let (workers, spawned) = spawn_workers(build_workers(config, &counters, &log, &cancel));
    if let Err(e) = spawned {
        cancel.cancel();
        join_workers(workers).await;
        return Err(e).context("could not start the search workers");
    }

    let header = vec![format!(
        "You have {} seconds to guess which of [{}] appears most often: ",
        config.guess_timeout.as_secs_f32(),
        alphabet.symbols().iter().collect::<String>(),
    )];

    let read_guess = async {
        let result = guess.await_with_timeout(config.guess_timeout).await;
        if matches!(result, Err(LineError::Source(_) | LineError::Closed)) {
            cancel.cancel();
        }
        result
    };
    screen.begin_round();
    let render = render_until_done(&counters, &log, &header, screen, config.render_interval);
    let (guess, ()) = tokio::join!(read_guess, render);
    join_workers(workers).await;

    let answer = counters.most_frequent();
    let counts = counters.snapshot();
    let verdict = match guess {
        Ok(line) => {
            let Some(first) = line.trim().chars().next() else {
                bail!("received a blank guess");
            };
            let guess = to_lower(first);
            if guess == answer {
                Verdict::Won
            } else {
                Verdict::Lost { guess }
            }
        }
        Err(LineError::TimedOut) => Verdict::TooSlow,
        Err(e) => return Err(e).context("error while reading the guess"),
    };

    info!(?verdict, %answer, "round finished");
    Ok(RoundOutcome { verdict, answer, counts })
}

fn build_workers(
    config: &RoundConfig,
    counters: &Arc<SharedCounters>,
    log: &MessageLog,
    cancel: &Arc<CancelToken>,
) -> Vec<SymbolSearchWorker> {
    counters
        .alphabet()
        .symbols()
        .iter()
        .map(|symbol| {
            SymbolSearchWorker::new(*symbol)
                .text(config.sentence.as_str())
                .counters(counters.clone())
                .log(log.clone())
                .options(config.options)
                .cancel_token(cancel.clone())
        })
        .collect()
}

/// Starts workers in order and stops at the first failure. The handles of
/// the workers that did start are returned either way so they can be joined.
fn spawn_workers(
    workers: Vec<SymbolSearchWorker>,
) -> (Vec<JoinHandle<()>>, Result<(), WorkerError>) {
    let mut handles = Vec::with_capacity(workers.len());
    for worker in workers {
        match worker.spawn() {
            Ok(handle) => handles.push(handle),
            Err(e) => return (handles, Err(e)),
        }
    }
    (handles, Ok(()))
}

async fn render_until_done(
    counters: &SharedCounters,
    log: &MessageLog,
    header: &[String],
    screen: &mut impl Screen,
    every: Duration,
) {
    let mut interval = tokio::time::interval(every.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        // checked before the snapshot so the last frame holds every message
        let done = counters.is_all_done();
        let mut lines = header.to_vec();
        lines.extend(log.snapshot());
        screen.clear();
        screen.show(&lines);
        if done {
            break;
        }
    }
}

async fn join_workers(workers: Vec<JoinHandle<()>>) {
    let joined = tokio::task::spawn_blocking(move || {
        for worker in workers {
            let name = worker.thread().name().unwrap_or("worker").to_string();
            if worker.join().is_err() {
                warn!("{name} panicked during its scan");
            }
        }
    })
    .await;
    if let Err(e) = joined {
        warn!("could not join the worker threads: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_spawn_hands_back_started_workers() {
        let counters = Arc::new(SharedCounters::new(Alphabet::vowels()));
        let log = MessageLog::new();
        let cancel = Arc::new(CancelToken::new());
        let slow = WorkerOptions {
            random_delay: true,
            yield_now: false,
            max_delay: Duration::from_millis(50),
        };
        let workers = vec![
            SymbolSearchWorker::new('a')
                .text("a".repeat(1000))
                .counters(counters.clone())
                .log(log.clone())
                .options(slow)
                .cancel_token(cancel.clone()),
            SymbolSearchWorker::new('e').counters(counters.clone()).log(log.clone()),
            SymbolSearchWorker::new('i').text("i").counters(counters.clone()).log(log.clone()),
        ];

        let (handles, spawned) = spawn_workers(workers);
        assert_eq!(spawned.unwrap_err(), WorkerError::MissingText('e'));
        assert_eq!(handles.len(), 1);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), join_workers(handles))
            .await
            .expect("cancelled worker must exit");
        assert!(counters.is_done(0));
        assert!(!counters.is_done(2));
    }

    #[tokio::test]
    async fn every_alphabet_symbol_gets_a_worker() {
        let counters = Arc::new(SharedCounters::new(Alphabet::vowels()));
        let workers = build_workers(
            &RoundConfig::new("uno"),
            &counters,
            &MessageLog::new(),
            &Arc::new(CancelToken::new()),
        );
        let symbols: Vec<char> = workers.iter().map(|w| w.symbol()).collect();
        assert_eq!(symbols, vec!['a', 'e', 'i', 'o', 'u']);

        let (handles, spawned) = spawn_workers(workers);
        assert!(spawned.is_ok());
        join_workers(handles).await;
        assert!(counters.is_all_done());
        assert_eq!(counters.count_of('u'), Some(1));
    }
}
