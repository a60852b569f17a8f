#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Best-score bookkeeping driven by puzzle events.

use std::convert::Infallible;

use hakoiri_core::Event;

/// Persistence backend for the fewest-moves record.
pub trait ScoreStore {
    /// Error raised when the record cannot be written.
    type Error;

    /// Returns the stored record, if one exists.
    fn best(&self) -> Option<u32>;

    /// Replaces the stored record.
    fn save_best(&mut self, moves: u32) -> Result<(), Self::Error>;
}

/// Store that keeps the record in memory for the lifetime of the value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryScoreStore {
    best: Option<u32>,
}

impl MemoryScoreStore {
    /// Creates an in-memory store seeded with an optional record.
    #[must_use]
    pub const fn new(best: Option<u32>) -> Self {
        Self { best }
    }
}

impl ScoreStore for MemoryScoreStore {
    type Error = Infallible;

    fn best(&self) -> Option<u32> {
        self.best
    }

    fn save_best(&mut self, moves: u32) -> Result<(), Self::Error> {
        self.best = Some(moves);
        Ok(())
    }
}

/// Pure system that records new fewest-moves solutions.
#[derive(Debug)]
pub struct ScoreKeeper<S> {
    store: S,
}

impl<S: ScoreStore> ScoreKeeper<S> {
    /// Creates a score keeper backed by the provided store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Current best score according to the store.
    #[must_use]
    pub fn best(&self) -> Option<u32> {
        self.store.best()
    }

    /// Borrows the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consumes world events, saving strictly better solutions.
    ///
    /// Pushes [`Event::BestScoreImproved`] for every record written. Stops at
    /// the first store failure, leaving later events unprocessed.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) -> Result<(), S::Error> {
        for event in events {
            let Event::PuzzleSolved { move_count } = *event else {
                continue;
            };
            let previous = self.store.best();
            if previous.map_or(true, |best| move_count < best) {
                self.store.save_best(move_count)?;
                out.push(Event::BestScoreImproved {
                    move_count,
                    previous,
                });
            }
        }
        Ok(())
    }
}
