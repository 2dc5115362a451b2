//! Statistics collectors
//!
//! Small accumulators updated once per generation by the checkpoint and
//! rendered by monitors. Each exposes an explicit `render` string rather
//! than numeric operator overloading.

use std::time::Instant;

use crate::genome::traits::Genome;
use crate::island::state::IslandState;
use crate::population::population::Population;

/// A per-generation statistics accumulator
pub trait Statistic<G: Genome>: Send {
    /// Column name written in the monitor header
    fn name(&self) -> &'static str;

    /// Update the accumulator from the current generation
    fn collect(&mut self, pop: &Population<G>, state: &IslandState<G>);

    /// Render the current value for a monitor row
    fn render(&self) -> String;

    /// Final flush when the run stops
    fn last_call(&mut self, _pop: &Population<G>, _state: &IslandState<G>) {}
}

/// This island's rank
#[derive(Debug, Default)]
pub struct IslandRank(usize);

impl IslandRank {
    /// Create the collector
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: Genome> Statistic<G> for IslandRank {
    fn name(&self) -> &'static str {
        "IslandRank"
    }

    fn collect(&mut self, _pop: &Population<G>, state: &IslandState<G>) {
        self.0 = state.rank();
    }

    fn render(&self) -> String {
        self.0.to_string()
    }
}

/// Generation counter, incremented once per collect
#[derive(Debug, Default)]
pub struct Generation(u64);

impl Generation {
    /// Create the collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Generations counted so far
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl<G: Genome> Statistic<G> for Generation {
    fn name(&self) -> &'static str {
        "Generation"
    }

    fn collect(&mut self, _pop: &Population<G>, _state: &IslandState<G>) {
        self.0 += 1;
    }

    fn render(&self) -> String {
        self.0.to_string()
    }
}

/// Current population size
#[derive(Debug, Default)]
pub struct PopSize(usize);

impl PopSize {
    /// Create the collector
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: Genome> Statistic<G> for PopSize {
    fn name(&self) -> &'static str {
        "PopSize"
    }

    fn collect(&mut self, pop: &Population<G>, _state: &IslandState<G>) {
        self.0 = pop.len();
    }

    fn render(&self) -> String {
        self.0.to_string()
    }
}

/// Average fitness over evaluated individuals, rounded to two decimals
#[derive(Debug, Default)]
pub struct AverageFitness(f64);

impl AverageFitness {
    /// Create the collector
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: Genome> Statistic<G> for AverageFitness {
    fn name(&self) -> &'static str {
        "AverageFitness"
    }

    fn collect(&mut self, pop: &Population<G>, _state: &IslandState<G>) {
        if let Some(avg) = pop.average_fitness() {
            self.0 = (avg * 100.0).round() / 100.0;
        }
    }

    fn render(&self) -> String {
        self.0.to_string()
    }
}

/// Best fitness in the population
#[derive(Debug, Default)]
pub struct BestFitness(f64);

impl BestFitness {
    /// Create the collector
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: Genome> Statistic<G> for BestFitness {
    fn name(&self) -> &'static str {
        "BestFitness"
    }

    fn collect(&mut self, pop: &Population<G>, _state: &IslandState<G>) {
        if !pop.is_empty() {
            if let Some(best) = pop.best_fitness() {
                self.0 = best;
            }
        }
    }

    fn render(&self) -> String {
        self.0.to_string()
    }
}

/// Snapshot of the outgoing probability row
#[derive(Debug, Default)]
pub struct Probabilities(Vec<u32>);

impl Probabilities {
    /// Create the collector
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: Genome> Statistic<G> for Probabilities {
    fn name(&self) -> &'static str {
        "Probabilities"
    }

    fn collect(&mut self, _pop: &Population<G>, state: &IslandState<G>) {
        self.0 = state.proba.clone();
    }

    fn render(&self) -> String {
        self.0
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Snapshot of the feedback vector, rounded to two decimals
#[derive(Debug, Default)]
pub struct Feedbacks(Vec<f64>);

impl Feedbacks {
    /// Create the collector
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: Genome> Statistic<G> for Feedbacks {
    fn name(&self) -> &'static str {
        "Feedbacks"
    }

    fn collect(&mut self, _pop: &Population<G>, state: &IslandState<G>) {
        self.0 = state
            .feedbacks
            .iter()
            .map(|f| (f * 100.0).round() / 100.0)
            .collect();
    }

    fn render(&self) -> String {
        self.0
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 0/1 mask marking the maximum feedback slot(s)
#[derive(Debug, Default)]
pub struct BestFeedbacks(Vec<u8>);

impl BestFeedbacks {
    /// Create the collector
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: Genome> Statistic<G> for BestFeedbacks {
    fn name(&self) -> &'static str {
        "BestFeedbacks"
    }

    fn collect(&mut self, _pop: &Population<G>, state: &IslandState<G>) {
        let max = state
            .feedbacks
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        self.0 = state
            .feedbacks
            .iter()
            .map(|&f| u8::from(f == max))
            .collect();
    }

    fn render(&self) -> String {
        self.0
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Seconds elapsed since the run started, rounded to two decimals
#[derive(Debug)]
pub struct ElapsedTime {
    start: Instant,
    seconds: f64,
}

impl ElapsedTime {
    /// Create the collector, starting the clock now
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            seconds: 0.0,
        }
    }
}

impl Default for ElapsedTime {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Genome> Statistic<G> for ElapsedTime {
    fn name(&self) -> &'static str {
        "ElapsedTime"
    }

    fn collect(&mut self, _pop: &Population<G>, _state: &IslandState<G>) {
        self.seconds = (self.start.elapsed().as_secs_f64() * 100.0).round() / 100.0;
    }

    fn render(&self) -> String {
        self.seconds.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::bit_string::BitString;
    use crate::island::state::Archipelago;
    use crate::population::individual::Individual;

    fn fixture() -> (Population<BitString>, IslandState<BitString>) {
        let shared = Archipelago::new(2);
        let state = IslandState::new(1, shared);
        let pop = Population::from_individuals(vec![
            Individual::with_fitness(BitString::zeros(2), 1.0),
            Individual::with_fitness(BitString::zeros(2), 3.0),
        ]);
        (pop, state)
    }

    #[test]
    fn test_island_rank_and_pop_size() {
        let (pop, state) = fixture();
        let mut rank = IslandRank::new();
        let mut size = PopSize::new();
        rank.collect(&pop, &state);
        size.collect(&pop, &state);
        assert_eq!(Statistic::<BitString>::render(&rank), "1");
        assert_eq!(Statistic::<BitString>::render(&size), "2");
    }

    #[test]
    fn test_generation_increments_per_collect() {
        let (pop, state) = fixture();
        let mut generation = Generation::new();
        for _ in 0..3 {
            generation.collect(&pop, &state);
        }
        assert_eq!(generation.value(), 3);
    }

    #[test]
    fn test_fitness_stats() {
        let (pop, state) = fixture();
        let mut avg = AverageFitness::new();
        let mut best = BestFitness::new();
        avg.collect(&pop, &state);
        best.collect(&pop, &state);
        assert_eq!(Statistic::<BitString>::render(&avg), "2");
        assert_eq!(Statistic::<BitString>::render(&best), "3");
    }

    #[test]
    fn test_fitness_stats_keep_last_value_on_empty_population() {
        let (pop, state) = fixture();
        let mut avg = AverageFitness::new();
        avg.collect(&pop, &state);
        let empty = Population::new();
        avg.collect(&empty, &state);
        assert_eq!(Statistic::<BitString>::render(&avg), "2");
    }

    #[test]
    fn test_probabilities_renders_row() {
        let (pop, mut state) = fixture();
        state.set_proba(vec![400, 600]);
        let mut probas = Probabilities::new();
        probas.collect(&pop, &state);
        assert_eq!(Statistic::<BitString>::render(&probas), "400 600");
    }

    #[test]
    fn test_best_feedbacks_masks_maximum() {
        let (pop, mut state) = fixture();
        state.feedbacks = vec![0.1, 0.7];
        let mut best = BestFeedbacks::new();
        best.collect(&pop, &state);
        assert_eq!(Statistic::<BitString>::render(&best), "0 1");
    }
}
