//! Stopping conditions
//!
//! Continuators answer one question per generation: should this island keep
//! going? The checkpoint ANDs every registered continuator; any single
//! failure stops the whole archipelago through the shared flag.

use tracing::warn;

use crate::genome::traits::Genome;
use crate::island::state::IslandState;
use crate::population::population::Population;

/// A stopping condition evaluated once per generation
pub trait Continuator<G: Genome>: Send {
    /// `false` means stop
    fn should_continue(&mut self, pop: &Population<G>, state: &IslandState<G>) -> bool;

    /// Final notification when the run stops
    fn last_call(&mut self, _pop: &Population<G>, _state: &IslandState<G>) {}
}

/// Continue for a bounded number of generations.
///
/// The internal counter resets to zero when the bound fires, so a reused
/// instance counts a fresh budget.
#[derive(Debug)]
pub struct MaxGen {
    max_generations: u64,
    generation: u64,
}

impl MaxGen {
    /// Continue for at most `max_generations` generations
    pub fn new(max_generations: u64) -> Self {
        Self {
            max_generations,
            generation: 0,
        }
    }
}

impl<G: Genome> Continuator<G> for MaxGen {
    fn should_continue(&mut self, _pop: &Population<G>, state: &IslandState<G>) -> bool {
        if self.generation < self.max_generations {
            self.generation += 1;
            return true;
        }
        warn!(
            rank = state.rank(),
            generations = self.generation,
            "stop: maximum number of generations reached"
        );
        self.generation = 0;
        false
    }
}

/// Continue until the best fitness reaches a target
#[derive(Debug)]
pub struct TargetFitness {
    target: f64,
}

impl TargetFitness {
    /// Stop once the population's best fitness reaches `target`
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl<G: Genome> Continuator<G> for TargetFitness {
    fn should_continue(&mut self, pop: &Population<G>, state: &IslandState<G>) -> bool {
        let Some(best) = pop.best_fitness() else {
            // transiently empty populations keep going
            warn!(rank = state.rank(), "target fitness check on empty population");
            return true;
        };
        if best >= self.target {
            warn!(rank = state.rank(), best, "stop: target fitness reached");
            return false;
        }
        true
    }
}

/// Logical AND over a chain of continuators, short-circuiting on the first
/// failure
pub struct Combined<G: Genome> {
    continuators: Vec<Box<dyn Continuator<G>>>,
}

impl<G: Genome> Combined<G> {
    /// Create a chain seeded with one continuator
    pub fn new(first: Box<dyn Continuator<G>>) -> Self {
        Self {
            continuators: vec![first],
        }
    }

    /// Add another continuator to the chain
    pub fn add(&mut self, continuator: Box<dyn Continuator<G>>) {
        self.continuators.push(continuator);
    }
}

impl<G: Genome> Continuator<G> for Combined<G> {
    fn should_continue(&mut self, pop: &Population<G>, state: &IslandState<G>) -> bool {
        for continuator in &mut self.continuators {
            if !continuator.should_continue(pop, state) {
                return false;
            }
        }
        true
    }

    fn last_call(&mut self, pop: &Population<G>, state: &IslandState<G>) {
        for continuator in &mut self.continuators {
            continuator.last_call(pop, state);
        }
    }
}
