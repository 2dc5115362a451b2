//! Operator traits
//!
//! `IslandOperator` is the seam every pipeline stage implements; `Evaluator`
//! and `VariationOperator` are the collaborator interfaces supplied by the
//! problem being optimized.

use rand::RngCore;

use crate::error::IslandResult;
use crate::genome::traits::Genome;
use crate::island::state::IslandState;
use crate::population::individual::Individual;
use crate::population::population::Population;

/// A stage of the per-generation island pipeline
///
/// Stages run in a fixed order every generation and get a lifecycle around
/// the loop: `first_call` once before the first generation, `apply` once per
/// generation, `last_call` once during teardown (even when the loop ended on
/// a broken barrier).
pub trait IslandOperator<G: Genome> {
    /// One-time setup before the first generation
    fn first_call(&mut self, _pop: &mut Population<G>, _state: &mut IslandState<G>) {}

    /// Run this stage for one generation
    fn apply(&mut self, pop: &mut Population<G>, state: &mut IslandState<G>) -> IslandResult<()>;

    /// One-time teardown after the loop ends
    fn last_call(&mut self, _pop: &mut Population<G>, _state: &mut IslandState<G>) {}
}

/// Fitness evaluation collaborator
///
/// Implementations must call `individual.set_fitness`.
pub trait Evaluator<G: Genome>: Send + Sync {
    /// Evaluate one individual, recording its fitness
    fn evaluate(&self, individual: &mut Individual<G>);
}

/// In-place variation (mutation) collaborator
///
/// Object safe so each island can carry a differently configured operator.
pub trait VariationOperator<G: Genome>: Send {
    /// Mutate the genome in place
    fn apply(&self, genome: &mut G, rng: &mut dyn RngCore);
}
