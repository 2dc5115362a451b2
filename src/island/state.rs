//! Island state
//!
//! The state of a run is split in two: the `Archipelago` is the shared half
//! (mailboxes, barriers, collective continuation flag), created once and
//! handed to every island in an `Arc`; the `IslandState` is the per-island
//! half (rank, feedback vector, outgoing probability row), written only by
//! the island that owns it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::genome::traits::Genome;
use crate::island::barrier::Barrier;
use crate::island::queue::SharedQueue;
use crate::population::individual::Individual;

/// Total probability mass carried by every outgoing probability row.
///
/// Probabilities are fixed-point `u32` mass units rather than floats so the
/// row-sum invariant holds exactly: the last slot of every update is assigned
/// `PROBA_TOTAL - sum(others)` and no drift can accumulate.
pub const PROBA_TOTAL: u32 = 1000;

/// Per-island inbound mailboxes
#[derive(Debug)]
pub struct Mailbox<G: Genome> {
    /// Feedback values pushed by every island each generation
    pub feedbacks: SharedQueue<f64>,
    /// Migrants routed here by the senders' probability rows
    pub migrants: SharedQueue<Individual<G>>,
}

impl<G: Genome> Mailbox<G> {
    fn new() -> Self {
        Self {
            feedbacks: SharedQueue::new(),
            migrants: SharedQueue::new(),
        }
    }
}

/// The shared half of a run: everything every island can touch
///
/// Queues and barriers live for the whole run; the continuation flag is the
/// only other truly shared mutable state and is cleared with an idempotent
/// AND-reduction, so racing clears from several islands are harmless.
#[derive(Debug)]
pub struct Archipelago<G: Genome> {
    mailboxes: Vec<Mailbox<G>>,
    feedback_barrier: Barrier,
    migration_barrier: Barrier,
    running: AtomicBool,
}

impl<G: Genome> Archipelago<G> {
    /// Create the shared state for `size` islands
    pub fn new(size: usize) -> Arc<Self> {
        Arc::new(Self {
            mailboxes: (0..size).map(|_| Mailbox::new()).collect(),
            feedback_barrier: Barrier::new(size),
            migration_barrier: Barrier::new(size),
            running: AtomicBool::new(true),
        })
    }

    /// Number of islands
    pub fn size(&self) -> usize {
        self.mailboxes.len()
    }

    /// Mailbox of island `rank`
    pub fn mailbox(&self, rank: usize) -> &Mailbox<G> {
        &self.mailboxes[rank]
    }

    /// Rendezvous point between feedback send and recv
    pub fn feedback_barrier(&self) -> &Barrier {
        &self.feedback_barrier
    }

    /// Rendezvous point between migration send and recv
    pub fn migration_barrier(&self) -> &Barrier {
        &self.migration_barrier
    }

    /// AND `verdict` into the collective continuation flag and read it back.
    ///
    /// Any island's checkpoint failing clears the flag for all; redundant
    /// clears are idempotent.
    pub fn and_continue(&self, verdict: bool) -> bool {
        if !verdict {
            self.running.store(false, Ordering::SeqCst);
            return false;
        }
        self.running.load(Ordering::SeqCst)
    }

    /// Whether the run is still going
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// The per-island half of the run state
///
/// `feedbacks[i]` is the smoothed effectiveness of this island's migrants as
/// observed on island `i`; `proba[i]` is the outgoing migration mass toward
/// island `i`. Both are indexed by island rank and written only by this
/// island's own feedbacker and updater.
#[derive(Debug)]
pub struct IslandState<G: Genome> {
    rank: usize,
    /// Smoothed effectiveness estimates, one per island
    pub feedbacks: Vec<f64>,
    /// Outgoing migration mass, one slot per island, summing to `PROBA_TOTAL`
    pub proba: Vec<u32>,
    shared: Arc<Archipelago<G>>,
}

impl<G: Genome> IslandState<G> {
    /// Create the state for island `rank`, with a uniform probability row
    pub fn new(rank: usize, shared: Arc<Archipelago<G>>) -> Self {
        let size = shared.size();
        debug_assert!(rank < size);
        let mut proba = vec![PROBA_TOTAL / size as u32; size];
        // remainder of the even split lands on the last slot
        let assigned: u32 = proba.iter().take(size - 1).sum();
        proba[size - 1] = PROBA_TOTAL - assigned;
        Self {
            rank,
            feedbacks: vec![0.0; size],
            proba,
            shared,
        }
    }

    /// This island's index, immutable for the whole run
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Total number of islands
    pub fn size(&self) -> usize {
        self.shared.size()
    }

    /// The shared half of the run state
    pub fn shared(&self) -> &Archipelago<G> {
        &self.shared
    }

    /// This island's own mailbox
    pub fn mailbox(&self) -> &Mailbox<G> {
        self.shared.mailbox(self.rank)
    }

    /// Replace the outgoing probability row, e.g. from an `InitMatrix` row
    pub fn set_proba(&mut self, row: Vec<u32>) {
        debug_assert_eq!(row.len(), self.shared.size());
        debug_assert_eq!(row.iter().sum::<u32>(), PROBA_TOTAL);
        self.proba = row;
    }
}
