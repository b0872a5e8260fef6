use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::alphabet::Alphabet;

/// Count and completion flag owned by the worker searching one symbol.
#[derive(Debug)]
struct Slot {
    count: AtomicUsize,
    done: AtomicBool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolCount {
    pub symbol: char,
    pub count: usize,
    pub done: bool,
}

/// Per-symbol counters shared between the workers and the round.
///
/// Each slot has exactly one writer, the worker for that symbol. The
/// done flag is stored with `Release` and read with `Acquire`, so once
/// [`SharedCounters::is_all_done`] returns true every increment and log
/// push made by the workers is visible to the caller.
#[derive(Debug)]
pub struct SharedCounters {
    alphabet: Alphabet,
    slots: Vec<Slot>,
}

impl SharedCounters {
    pub fn new(alphabet: Alphabet) -> SharedCounters {
        let slots = (0..alphabet.len())
            .map(|_| Slot { count: AtomicUsize::new(0), done: AtomicBool::new(false) })
            .collect();
        SharedCounters { alphabet, slots }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// # Panics
    /// If `index` is not a position in the alphabet.
    pub fn increment(&self, index: usize) {
        self.slot(index).count.fetch_add(1, Ordering::Relaxed);
    }

    /// # Panics
    /// If `index` is not a position in the alphabet.
    pub fn mark_done(&self, index: usize) {
        self.slot(index).done.store(true, Ordering::Release);
    }

    pub fn count(&self, index: usize) -> usize {
        self.slot(index).count.load(Ordering::Relaxed)
    }

    pub fn count_of(&self, symbol: char) -> Option<usize> {
        self.alphabet.index_of(symbol).map(|index| self.count(index))
    }

    pub fn is_done(&self, index: usize) -> bool {
        self.slot(index).done.load(Ordering::Acquire)
    }

    pub fn is_all_done(&self) -> bool {
        self.slots.iter().all(|slot| slot.done.load(Ordering::Acquire))
    }

    /// Symbol with the highest count. Ties go to the symbol declared
    /// first in the alphabet, which is also the answer when nothing was found.
    pub fn most_frequent(&self) -> char {
        let mut best = 0;
        let mut best_count = self.count(0);
        for index in 1..self.slots.len() {
            let count = self.count(index);
            if count > best_count {
                best = index;
                best_count = count;
            }
        }
        self.alphabet.symbols()[best]
    }

    pub fn snapshot(&self) -> Vec<SymbolCount> {
        self.alphabet
            .symbols()
            .iter()
            .enumerate()
            .map(|(index, symbol)| SymbolCount {
                symbol: *symbol,
                done: self.is_done(index),
                count: self.count(index),
            })
            .collect()
    }

    fn slot(&self, index: usize) -> &Slot {
        match self.slots.get(index) {
            Some(slot) => slot,
            None => panic!("symbol index {index} out of range for {} slots", self.slots.len()),
        }
    }
}
