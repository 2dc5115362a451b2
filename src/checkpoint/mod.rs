//! Checkpoint: per-generation observation and stopping
//!
//! The checkpoint runs once per generation before the operator chain. It
//! feeds sort-dependent statistics a sorted snapshot (never the live
//! population), updates the plain statistics, lets monitors write their
//! rows, then ANDs the registered continuators. When continuation fails,
//! every registered piece receives one final `last_call` and the checkpoint
//! returns `false` for good.

pub mod continuators;
pub mod monitors;
pub mod stats;

use tracing::error;

use crate::genome::traits::Genome;
use crate::island::state::IslandState;
use crate::population::population::Population;

use continuators::Continuator;
use monitors::{Monitor, StatId};
use stats::Statistic;

/// Composable per-generation statistics and stopping pipeline
pub struct Checkpoint<G: Genome> {
    sorted_stats: Vec<Box<dyn Statistic<G>>>,
    stats: Vec<Box<dyn Statistic<G>>>,
    monitors: Vec<Box<dyn Monitor<G>>>,
    continuators: Vec<Box<dyn Continuator<G>>>,
}

impl<G: Genome> Checkpoint<G> {
    /// Create an empty checkpoint
    pub fn new() -> Self {
        Self {
            sorted_stats: Vec::new(),
            stats: Vec::new(),
            monitors: Vec::new(),
            continuators: Vec::new(),
        }
    }

    /// Create a checkpoint seeded with one continuator
    pub fn with_continuator(continuator: Box<dyn Continuator<G>>) -> Self {
        let mut checkpoint = Self::new();
        checkpoint.add_continuator(continuator);
        checkpoint
    }

    /// Register a statistic fed the live population; returns its handle for
    /// monitors to watch
    pub fn add_stat(&mut self, stat: Box<dyn Statistic<G>>) -> StatId {
        self.stats.push(stat);
        StatId(self.stats.len() - 1)
    }

    /// Register a statistic fed a fitness-sorted snapshot of the population
    pub fn add_sorted_stat(&mut self, stat: Box<dyn Statistic<G>>) {
        self.sorted_stats.push(stat);
    }

    /// Register a monitor sink
    pub fn add_monitor(&mut self, monitor: Box<dyn Monitor<G>>) {
        self.monitors.push(monitor);
    }

    /// Register a stopping condition
    pub fn add_continuator(&mut self, continuator: Box<dyn Continuator<G>>) {
        self.continuators.push(continuator);
    }

    /// Run one generation of observation; `false` means stop.
    ///
    /// All continuators are evaluated even after one fails, so stateful ones
    /// (generation counters) stay in step with each other.
    pub fn check(&mut self, pop: &Population<G>, state: &IslandState<G>) -> bool {
        let sorted_pop = if self.sorted_stats.is_empty() {
            None
        } else {
            let snapshot = Population::from_individuals(pop.sorted_snapshot());
            for stat in &mut self.sorted_stats {
                stat.collect(&snapshot, state);
            }
            Some(snapshot)
        };

        for stat in &mut self.stats {
            stat.collect(pop, state);
        }
        for monitor in &mut self.monitors {
            if let Err(err) = monitor.record(&self.stats) {
                error!(rank = state.rank(), %err, "monitor write failed");
            }
        }

        let mut keep_going = true;
        for continuator in &mut self.continuators {
            if !continuator.should_continue(pop, state) {
                keep_going = false;
            }
        }

        if !keep_going {
            if let Some(snapshot) = &sorted_pop {
                for stat in &mut self.sorted_stats {
                    stat.last_call(snapshot, state);
                }
            }
            for stat in &mut self.stats {
                stat.last_call(pop, state);
            }
            for monitor in &mut self.monitors {
                if let Err(err) = monitor.last_call(&self.stats) {
                    error!(rank = state.rank(), %err, "monitor teardown failed");
                }
            }
            for continuator in &mut self.continuators {
                continuator.last_call(pop, state);
            }
        }

        keep_going
    }
}

impl<G: Genome> Default for Checkpoint<G> {
    fn default() -> Self {
        Self::new()
    }
}

/// Prelude for checkpoint module
pub mod prelude {
    pub use super::continuators::{Combined, Continuator, MaxGen, TargetFitness};
    pub use super::monitors::{FileMonitor, Monitor, StatId};
    pub use super::stats::{
        AverageFitness, BestFeedbacks, BestFitness, ElapsedTime, Feedbacks, Generation,
        IslandRank, PopSize, Probabilities, Statistic,
    };
    pub use super::Checkpoint;
}
