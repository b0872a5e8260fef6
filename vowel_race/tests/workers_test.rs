// Stress tests for the worker fan-out: once every slot reads as done, all
// counts and log messages must already be visible, without joining threads.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use vowel_race::{Alphabet, MessageLog, SharedCounters, SymbolSearchWorker, WorkerOptions};

fn expected_count(text: &str, symbol: char) -> usize {
    text.to_lowercase().chars().filter(|c| *c == symbol).count()
}

fn run_round(text: &str, options: WorkerOptions) {
    let alphabet = Alphabet::vowels();
    let counters = Arc::new(SharedCounters::new(alphabet.clone()));
    let log = MessageLog::new();

    let handles: Vec<_> = alphabet
        .symbols()
        .iter()
        .map(|symbol| {
            SymbolSearchWorker::new(*symbol)
                .text(text)
                .counters(counters.clone())
                .log(log.clone())
                .options(options)
                .spawn()
                .unwrap()
        })
        .collect();

    while !counters.is_all_done() {
        thread::yield_now();
    }

    let mut total = 0;
    for symbol in alphabet.symbols() {
        let expected = expected_count(text, *symbol);
        assert_eq!(counters.count_of(*symbol), Some(expected), "count of {symbol}");
        total += expected;
    }
    assert_eq!(log.len(), total);

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn done_flags_publish_every_worker_effect() {
    let text = "Questa frase contiene parecchie vocali, ANCHE MAIUSCOLE; o no?".repeat(20);
    for _ in 0..200 {
        run_round(&text, WorkerOptions::default());
    }
}

#[test]
fn yielding_workers_publish_every_worker_effect() {
    let text = "Ogni UOVO ha un tuorlo e un albume".repeat(10);
    let options = WorkerOptions { yield_now: true, ..WorkerOptions::default() };
    for _ in 0..100 {
        run_round(&text, options);
    }
}

#[test]
fn delayed_workers_count_exactly() {
    let options = WorkerOptions {
        random_delay: true,
        yield_now: true,
        max_delay: Duration::from_millis(2),
    };
    for _ in 0..5 {
        run_round("Aiuola ed euforia", options);
    }
}

#[test]
fn empty_text_still_completes() {
    run_round("", WorkerOptions::default());
}
