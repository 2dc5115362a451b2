//! Memorizing stage
//!
//! Stamps every individual with the rank of the island it currently resides
//! on. Runs once before the first generation and again every generation, so
//! provenance is correct both for the first feedback round and after each
//! migration. Idempotent.

use crate::error::IslandResult;
use crate::genome::traits::Genome;
use crate::island::state::IslandState;
use crate::operators::traits::IslandOperator;
use crate::population::population::Population;

/// The memorizing stage of the island pipeline
#[derive(Clone, Debug, Default)]
pub struct Memorizer;

impl Memorizer {
    /// Create a memorizer
    pub fn new() -> Self {
        Self
    }

    fn stamp<G: Genome>(pop: &mut Population<G>, state: &IslandState<G>) {
        let rank = state.rank();
        for ind in pop.iter_mut() {
            ind.set_last_island(rank);
        }
    }
}

impl<G: Genome> IslandOperator<G> for Memorizer {
    fn first_call(&mut self, pop: &mut Population<G>, state: &mut IslandState<G>) {
        Self::stamp(pop, state);
    }

    fn apply(&mut self, pop: &mut Population<G>, state: &mut IslandState<G>) -> IslandResult<()> {
        Self::stamp(pop, state);
        Ok(())
    }
}
