use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::alphabet::to_lower;
use crate::cancel::{CancelToken, Sleep};
use crate::message_log::MessageLog;
use crate::shared_counters::SharedCounters;

pub const MAX_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    #[error("worker for {0:?} has no text to scan")]
    MissingText(char),
    #[error("worker for {0:?} has no counters to write to")]
    MissingCounters(char),
    #[error("worker for {0:?} has no message log")]
    MissingLog(char),
    #[error("symbol {0:?} is not part of the counters' alphabet")]
    UnknownSymbol(char),
    #[error("could not start worker thread for {0:?}: {1}")]
    Spawn(char, String),
}

/// Scheduling perturbation applied after every scanned character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerOptions {
    pub random_delay: bool,
    pub yield_now: bool,
    /// Upper bound (exclusive) of the random delay, sampled in microseconds;
    /// zero disables it.
    pub max_delay: Duration,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        WorkerOptions { random_delay: false, yield_now: false, max_delay: MAX_DELAY }
    }
}

/// Counts one symbol in a text on its own thread.
///
/// Build it with the setters, then [`SymbolSearchWorker::spawn`]. The worker
/// is idle until spawned, running while its thread scans, and done once it
/// has marked its slot in the counters, which it does even when stopped early.
#[derive(Debug)]
pub struct SymbolSearchWorker {
    symbol: char,
    text: Option<String>,
    counters: Option<Arc<SharedCounters>>,
    log: Option<MessageLog>,
    options: WorkerOptions,
    cancel: Arc<CancelToken>,
}

impl SymbolSearchWorker {
    pub fn new(symbol: char) -> SymbolSearchWorker {
        SymbolSearchWorker {
            symbol: to_lower(symbol),
            text: None,
            counters: None,
            log: None,
            options: WorkerOptions::default(),
            cancel: Arc::new(CancelToken::new()),
        }
    }

    pub fn symbol(&self) -> char {
        self.symbol
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn counters(mut self, counters: Arc<SharedCounters>) -> Self {
        self.counters = Some(counters);
        self
    }

    pub fn log(mut self, log: MessageLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn options(mut self, options: WorkerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn cancel_token(mut self, cancel: Arc<CancelToken>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Checks that the worker is fully configured and starts its thread.
    pub fn spawn(self) -> Result<JoinHandle<()>, WorkerError> {
        let symbol = self.symbol;
        let scan = self.prepare()?;
        thread::Builder::new()
            .name(format!("worker_{symbol}"))
            .spawn(move || scan.run())
            .map_err(|e| WorkerError::Spawn(symbol, e.to_string()))
    }

    /// Runs the scan on the calling thread.
    pub fn run(self) -> Result<(), WorkerError> {
        self.prepare()?.run();
        Ok(())
    }

    fn prepare(self) -> Result<Scan, WorkerError> {
        let text = self.text.ok_or(WorkerError::MissingText(self.symbol))?;
        let counters = self.counters.ok_or(WorkerError::MissingCounters(self.symbol))?;
        let log = self.log.ok_or(WorkerError::MissingLog(self.symbol))?;
        let index = counters
            .alphabet()
            .index_of(self.symbol)
            .ok_or(WorkerError::UnknownSymbol(self.symbol))?;
        Ok(Scan {
            symbol: self.symbol,
            index,
            text,
            counters,
            log,
            options: self.options,
            cancel: self.cancel,
        })
    }
}

struct Scan {
    symbol: char,
    index: usize,
    text: String,
    counters: Arc<SharedCounters>,
    log: MessageLog,
    options: WorkerOptions,
    cancel: Arc<CancelToken>,
}

impl Scan {
    fn run(self) {
        let _done = DoneOnDrop { counters: &self.counters, index: self.index };
        let mut rng = rand::thread_rng();
        let max_delay_us = u64::try_from(self.options.max_delay.as_micros()).unwrap_or(u64::MAX);

        debug!("worker {} started", self.symbol);
        for current in self.text.to_lowercase().chars() {
            if self.options.random_delay && max_delay_us > 0 {
                let delay = Duration::from_micros(rng.gen_range(0..max_delay_us));
                if self.cancel.sleep(delay) == Sleep::Cancelled {
                    debug!("worker {} cancelled, stopping scan early", self.symbol);
                    break;
                }
            }

            if self.options.yield_now {
                thread::yield_now();
            }

            if current == self.symbol {
                self.counters.increment(self.index);
                self.log.push(format!("Found the letter {current}"));
            }
        }
        debug!("worker {} finished with {} matches", self.symbol, self.counters.count(self.index));
    }
}

/// Marks the slot done when the scan ends, however it ends.
struct DoneOnDrop<'a> {
    counters: &'a SharedCounters,
    index: usize,
}

impl Drop for DoneOnDrop<'_> {
    fn drop(&mut self) {
        self.counters.mark_done(self.index);
    }
}
