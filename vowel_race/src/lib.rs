//! Coordination core of the vowel race game: one worker thread per symbol
//! counts occurrences in a sentence while the player races a countdown
//! to guess the most frequent one.

pub mod alphabet;
pub mod cancel;
pub mod line_reader;
pub mod line_source;
pub mod message_log;
pub mod round;
pub mod screen;
pub mod shared_counters;
pub mod symbol_search_worker;

pub use alphabet::Alphabet;
pub use cancel::CancelToken;
pub use line_reader::{LineError, LineHandle, LineReader};
pub use line_source::LineSource;
pub use message_log::MessageLog;
pub use round::{play_round, RoundConfig, RoundOutcome, Verdict};
pub use screen::Screen;
pub use shared_counters::{SharedCounters, SymbolCount};
pub use symbol_search_worker::{SymbolSearchWorker, WorkerError, WorkerOptions};
