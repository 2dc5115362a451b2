//! Migration stage
//!
//! Two-phase relocation separated by a full rendezvous. `send` routes every
//! local individual to a destination drawn from the outgoing probability row
//! and empties the population; after the barrier, `recv` refills it from the
//! migrant inbox. Individuals only ever move, they are never created or
//! destroyed here, and routing to the own island deliberately goes through
//! the same queue as any other destination.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::IslandResult;
use crate::genome::traits::Genome;
use crate::island::state::{IslandState, PROBA_TOTAL};
use crate::operators::traits::IslandOperator;
use crate::population::population::Population;

/// The migration stage of the island pipeline
pub struct Migrator {
    rng: StdRng,
}

impl Migrator {
    /// Create a migrator
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a migrator with a deterministic random stream
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick a destination for one individual.
    ///
    /// Draw `r` uniform in `1..=PROBA_TOTAL` and take the first index whose cumulative
    /// mass reaches `r`. With the row summing to `PROBA_TOTAL` the walk
    /// always terminates on a valid index, and a slot with zero mass can
    /// never be selected.
    fn select_destination(proba: &[u32], rng: &mut StdRng) -> usize {
        let r = rng.gen_range(1..=PROBA_TOTAL);
        let mut cumulative = 0u32;
        for (i, &mass) in proba.iter().enumerate() {
            cumulative += mass;
            if cumulative >= r {
                return i;
            }
        }
        proba.len() - 1
    }

    fn send<G: Genome>(&mut self, pop: &mut Population<G>, state: &IslandState<G>) {
        let rank = state.rank();
        let mut sent = 0usize;
        for ind in pop.drain_all() {
            let dest = Self::select_destination(&state.proba, &mut self.rng);
            state.shared().mailbox(dest).migrants.push(ind, rank);
            sent += 1;
        }
        debug!(rank, sent, "migrants routed");
    }

    fn recv<G: Genome>(pop: &mut Population<G>, state: &IslandState<G>) {
        let mut received = 0usize;
        while let Some((ind, _from)) = state.mailbox().migrants.pop() {
            pop.push(ind);
            received += 1;
        }
        debug!(rank = state.rank(), received, "migrant inbox drained");
    }
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Genome> IslandOperator<G> for Migrator {
    fn apply(&mut self, pop: &mut Population<G>, state: &mut IslandState<G>) -> IslandResult<()> {
        self.send(pop, state);
        state.shared().migration_barrier().wait()?;
        Self::recv(pop, state);
        Ok(())
    }

    fn last_call(&mut self, _pop: &mut Population<G>, state: &mut IslandState<G>) {
        // unblock any peer still waiting for this island
        state.shared().migration_barrier().abort();
    }
}
