//! Evolving stage
//!
//! Elitist (1+1)-style local search: each individual is cloned, varied and
//! re-evaluated, and the clone replaces the original only when it is
//! strictly better. No crossover, no selection pressure beyond the greedy
//! accept-if-better rule.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::IslandResult;
use crate::genome::traits::Genome;
use crate::island::state::IslandState;
use crate::operators::traits::{Evaluator, IslandOperator, VariationOperator};
use crate::population::population::Population;

/// The evolving stage of the island pipeline
pub struct Evolver<G: Genome, E: Evaluator<G>> {
    evaluator: E,
    variation: Box<dyn VariationOperator<G>>,
    rng: StdRng,
}

impl<G: Genome, E: Evaluator<G>> Evolver<G, E> {
    /// Create an evolver from an evaluator and a variation operator
    pub fn new(evaluator: E, variation: Box<dyn VariationOperator<G>>) -> Self {
        Self {
            evaluator,
            variation,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an evolver with a deterministic random stream
    pub fn with_seed(evaluator: E, variation: Box<dyn VariationOperator<G>>, seed: u64) -> Self {
        Self {
            evaluator,
            variation,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<G: Genome, E: Evaluator<G>> IslandOperator<G> for Evolver<G, E> {
    fn apply(&mut self, pop: &mut Population<G>, _state: &mut IslandState<G>) -> IslandResult<()> {
        for ind in pop.iter_mut() {
            let mut candidate = ind.clone();
            self.variation.apply(candidate.genome_mut(), &mut self.rng);
            self.evaluator.evaluate(&mut candidate);

            if candidate.is_better_than(ind) {
                *ind = candidate;
            }
        }
        Ok(())
    }
}
