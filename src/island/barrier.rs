//! Abortable rendezvous barrier
//!
//! The standard library barrier cannot be broken, but island teardown
//! requires exactly that: when one island stops, its `last_call` must abort
//! the barrier so peers blocked mid-rendezvous wake up instead of hanging
//! forever. This is a cyclic barrier that can be broken permanently.

use std::sync::{Condvar, Mutex};

use crate::error::{IslandError, IslandResult};

#[derive(Debug)]
struct BarrierState {
    /// Parties currently waiting in this cycle
    count: usize,
    /// Incremented each time a full cycle completes
    generation: u64,
    /// Once broken, every current and future wait fails
    broken: bool,
}

/// A multi-party rendezvous point requiring all parties to arrive before any
/// proceeds
///
/// The barrier is cyclic: it resets automatically after each full rendezvous
/// and can be reused every generation. `abort` breaks it permanently.
#[derive(Debug)]
pub struct Barrier {
    parties: usize,
    state: Mutex<BarrierState>,
    cvar: Condvar,
}

impl Barrier {
    /// Create a barrier for `parties` islands
    pub fn new(parties: usize) -> Self {
        Self {
            parties,
            state: Mutex::new(BarrierState {
                count: 0,
                generation: 0,
                broken: false,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Number of parties required for a rendezvous
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Wait until all parties have arrived.
    ///
    /// Returns `Err(IslandError::BrokenBarrier)` if the barrier was aborted,
    /// whether before this call or while waiting. No timeout: a hang here is
    /// a party-count logic bug, not a recoverable condition.
    pub fn wait(&self) -> IslandResult<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.broken {
            return Err(IslandError::BrokenBarrier);
        }

        state.count += 1;
        if state.count == self.parties {
            state.count = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cvar.notify_all();
            return Ok(());
        }

        let arrival_generation = state.generation;
        loop {
            state = self
                .cvar
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
            if state.broken {
                return Err(IslandError::BrokenBarrier);
            }
            if state.generation != arrival_generation {
                return Ok(());
            }
        }
    }

    /// Break the barrier, waking every waiter with `BrokenBarrier`.
    ///
    /// Idempotent; called from each island's teardown so that no peer is
    /// left blocked when the run winds down.
    pub fn abort(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.broken = true;
        self.cvar.notify_all();
    }

    /// Whether the barrier has been aborted
    pub fn is_broken(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .broken
    }
}
