//! Per-island orchestrator
//!
//! Runs the setup / step / teardown lifecycle over the five-stage
//! pipeline for one island. The loop stops cooperatively when any island's
//! checkpoint fails (through the shared continuation flag) or abruptly when
//! a barrier breaks; teardown always runs and aborts both barriers so peers
//! blocked mid-rendezvous wake up.

use tracing::{debug, error};

use crate::checkpoint::Checkpoint;
use crate::error::IslandError;
use crate::genome::traits::Genome;
use crate::island::state::IslandState;
use crate::operators::traits::IslandOperator;
use crate::population::population::Population;

/// The five pipeline stages in their fixed execution order plus the
/// checkpoint run before them each generation
pub struct IslandAlgo<G: Genome> {
    steps: Vec<Box<dyn IslandOperator<G> + Send>>,
    checkpoint: Checkpoint<G>,
}

impl<G: Genome> IslandAlgo<G> {
    /// Assemble the pipeline. The stage order [evolve, feedback, update,
    /// memorize, migrate] is fixed by construction.
    pub fn new(
        evolver: Box<dyn IslandOperator<G> + Send>,
        feedbacker: Box<dyn IslandOperator<G> + Send>,
        updater: Box<dyn IslandOperator<G> + Send>,
        memorizer: Box<dyn IslandOperator<G> + Send>,
        migrator: Box<dyn IslandOperator<G> + Send>,
        checkpoint: Checkpoint<G>,
    ) -> Self {
        Self {
            steps: vec![evolver, feedbacker, updater, memorizer, migrator],
            checkpoint,
        }
    }

    /// Run this island to completion, returning the number of generations
    /// fully entered.
    pub fn run(&mut self, pop: &mut Population<G>, state: &mut IslandState<G>) -> u64 {
        for step in &mut self.steps {
            step.first_call(pop, state);
        }

        let mut generations = 0u64;
        loop {
            let verdict = self.checkpoint.check(pop, state);
            if !state.shared().and_continue(verdict) {
                debug!(rank = state.rank(), generations, "island stopping");
                break;
            }

            generations += 1;
            let mut broken = false;
            for step in &mut self.steps {
                match step.apply(pop, state) {
                    Ok(()) => {}
                    Err(IslandError::BrokenBarrier) => {
                        error!(rank = state.rank(), "broken barrier");
                        broken = true;
                        break;
                    }
                    Err(err) => {
                        error!(rank = state.rank(), %err, "pipeline stage failed");
                        broken = true;
                        break;
                    }
                }
            }
            if broken {
                break;
            }
        }

        for step in &mut self.steps {
            step.last_call(pop, state);
        }
        generations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::continuators::MaxGen;
    use crate::genome::bit_string::{BitString, DetBitFlip, OneMax};
    use crate::island::state::Archipelago;
    use crate::operators::evolver::Evolver;
    use crate::operators::feedbacker::Feedbacker;
    use crate::operators::memorizer::Memorizer;
    use crate::operators::migrator::Migrator;
    use crate::operators::updater::{BestReward, Updater};

    fn single_island_algo(max_gen: u64) -> IslandAlgo<BitString> {
        let checkpoint = Checkpoint::with_continuator(Box::new(MaxGen::new(max_gen)));
        IslandAlgo::new(
            Box::new(Evolver::with_seed(OneMax, Box::new(DetBitFlip::new(1)), 42)),
            Box::new(Feedbacker::new()),
            Box::new(Updater::new(Box::new(BestReward::with_seed(0.2, 0.01, 42)))),
            Box::new(Memorizer::new()),
            Box::new(Migrator::with_seed(42)),
            checkpoint,
        )
    }

    #[test]
    fn test_single_island_runs_to_generation_budget() {
        let shared = Archipelago::new(1);
        let mut state = IslandState::new(0, shared);
        let mut pop = Population::init(10, || BitString::zeros(8));
        pop.evaluate_with(&OneMax);

        let generations = single_island_algo(5).run(&mut pop, &mut state);
        assert_eq!(generations, 5);
        assert_eq!(pop.len(), 10);
        assert!(!state.shared().is_running());
        // teardown aborted both barriers
        assert!(state.shared().feedback_barrier().is_broken());
        assert!(state.shared().migration_barrier().is_broken());
    }

    #[test]
    fn test_population_improves_under_the_loop() {
        let shared = Archipelago::new(1);
        let mut state = IslandState::new(0, shared);
        let mut pop = Population::init(10, || BitString::zeros(16));
        pop.evaluate_with(&OneMax);
        let before = pop.best_fitness().unwrap();

        single_island_algo(30).run(&mut pop, &mut state);
        assert!(pop.best_fitness().unwrap() > before);
    }

    #[test]
    fn test_broken_barrier_before_start_stops_after_first_generation_entry() {
        let shared = Archipelago::<BitString>::new(1);
        shared.feedback_barrier().abort();
        let mut state = IslandState::new(0, shared);
        let mut pop = Population::init(5, || BitString::zeros(4));
        pop.evaluate_with(&OneMax);

        // the evolve stage still runs, then the feedback stage hits the
        // broken barrier and the island tears down
        let generations = single_island_algo(100).run(&mut pop, &mut state);
        assert_eq!(generations, 1);
    }
}
