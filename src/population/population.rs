//! Population type
//!
//! This module provides the Population container owned by exactly one island
//! at any instant.

use tracing::warn;

use crate::genome::traits::Genome;
use crate::operators::traits::Evaluator;
use crate::population::individual::Individual;

/// A population of individuals
///
/// Ordered container; during migration every individual is moved out (the
/// population transiently becomes empty) and refilled from the migrant inbox.
/// An empty population is a valid state, not an error.
#[derive(Clone, Debug)]
pub struct Population<G: Genome> {
    individuals: Vec<Individual<G>>,
}

impl<G: Genome> Population<G> {
    /// Create an empty population
    pub fn new() -> Self {
        Self {
            individuals: Vec::new(),
        }
    }

    /// Create a population with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            individuals: Vec::with_capacity(capacity),
        }
    }

    /// Create a population from a vector of individuals
    pub fn from_individuals(individuals: Vec<Individual<G>>) -> Self {
        Self { individuals }
    }

    /// Create a population of `size` individuals produced by `init`
    pub fn init<F>(size: usize, mut init: F) -> Self
    where
        F: FnMut() -> G,
    {
        let individuals = (0..size).map(|_| Individual::new(init())).collect();
        Self { individuals }
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Get an individual by index
    pub fn get(&self, index: usize) -> Option<&Individual<G>> {
        self.individuals.get(index)
    }

    /// Add an individual to the population
    pub fn push(&mut self, individual: Individual<G>) {
        self.individuals.push(individual);
    }

    /// Clear the population
    pub fn clear(&mut self) {
        self.individuals.clear();
    }

    /// Move every individual out, leaving the population empty
    pub fn drain_all(&mut self) -> Vec<Individual<G>> {
        std::mem::take(&mut self.individuals)
    }

    /// Get an iterator over the individuals
    pub fn iter(&self) -> impl Iterator<Item = &Individual<G>> {
        self.individuals.iter()
    }

    /// Get a mutable iterator over the individuals
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Individual<G>> {
        self.individuals.iter_mut()
    }

    /// Evaluate every individual with the given evaluator
    pub fn evaluate_with<E: Evaluator<G>>(&mut self, evaluator: &E) {
        for ind in &mut self.individuals {
            evaluator.evaluate(ind);
        }
    }

    /// Best individual by fitness, first-encountered wins on ties.
    ///
    /// Returns `None` on an empty population (logged as a warning).
    pub fn best(&self) -> Option<&Individual<G>> {
        if self.individuals.is_empty() {
            warn!("empty population, when querying best element");
            return None;
        }
        let mut best = &self.individuals[0];
        for ind in &self.individuals[1..] {
            if ind.is_better_than(best) {
                best = ind;
            }
        }
        Some(best)
    }

    /// Worst individual by fitness, first-encountered wins on ties.
    ///
    /// Returns `None` on an empty population (logged as a warning).
    pub fn worst(&self) -> Option<&Individual<G>> {
        if self.individuals.is_empty() {
            warn!("empty population, when querying worst element");
            return None;
        }
        let mut worst = &self.individuals[0];
        for ind in &self.individuals[1..] {
            if worst.is_better_than(ind) {
                worst = ind;
            }
        }
        Some(worst)
    }

    /// Best fitness in the population, `None` if empty or unevaluated
    pub fn best_fitness(&self) -> Option<f64> {
        self.best().and_then(|ind| ind.fitness())
    }

    /// Average fitness over evaluated individuals, `None` if there are none
    pub fn average_fitness(&self) -> Option<f64> {
        let (sum, count) = self
            .individuals
            .iter()
            .filter_map(|ind| ind.fitness())
            .fold((0.0, 0usize), |(s, c), f| (s + f, c + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    /// A copy of the individuals sorted ascending by fitness
    pub fn sorted_snapshot(&self) -> Vec<Individual<G>> {
        let mut snapshot = self.individuals.clone();
        snapshot.sort_by(|a, b| match (a.fitness(), b.fitness()) {
            (Some(fa), Some(fb)) => fa.partial_cmp(&fb).unwrap_or(std::cmp::Ordering::Equal),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => std::cmp::Ordering::Equal,
        });
        snapshot
    }
}

impl<G: Genome> Default for Population<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Genome> IntoIterator for Population<G> {
    type Item = Individual<G>;
    type IntoIter = std::vec::IntoIter<Individual<G>>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::bit_string::BitString;

    fn pop_with_fitness(values: &[f64]) -> Population<BitString> {
        Population::from_individuals(
            values
                .iter()
                .map(|&f| Individual::with_fitness(BitString::zeros(2), f))
                .collect(),
        )
    }

    #[test]
    fn test_init_builds_requested_size() {
        let pop: Population<BitString> = Population::init(5, || BitString::zeros(3));
        assert_eq!(pop.len(), 5);
        assert!(pop.iter().all(|ind| !ind.is_evaluated()));
    }

    #[test]
    fn test_best_and_worst() {
        let pop = pop_with_fitness(&[3.0, 7.0, 1.0, 7.0]);
        assert_eq!(pop.best().and_then(|i| i.fitness()), Some(7.0));
        assert_eq!(pop.worst().and_then(|i| i.fitness()), Some(1.0));
    }

    #[test]
    fn test_best_ties_first_encountered_wins() {
        let mut pop = pop_with_fitness(&[5.0, 5.0]);
        pop.iter_mut().next().unwrap().set_last_island(0);
        let best = pop.best().unwrap();
        // the first of the two tied individuals carries the island stamp
        assert_eq!(best.last_island(), Some(0));
    }

    #[test]
    fn test_empty_population_queries_return_none() {
        let pop: Population<BitString> = Population::new();
        assert!(pop.best().is_none());
        assert!(pop.worst().is_none());
        assert!(pop.average_fitness().is_none());
    }

    #[test]
    fn test_average_fitness() {
        let pop = pop_with_fitness(&[1.0, 2.0, 3.0]);
        assert_eq!(pop.average_fitness(), Some(2.0));
    }

    #[test]
    fn test_drain_all_empties_population() {
        let mut pop = pop_with_fitness(&[1.0, 2.0]);
        let drained = pop.drain_all();
        assert_eq!(drained.len(), 2);
        assert!(pop.is_empty());
    }

    #[test]
    fn test_sorted_snapshot_does_not_mutate_live_population() {
        let pop = pop_with_fitness(&[3.0, 1.0, 2.0]);
        let snapshot = pop.sorted_snapshot();
        let sorted: Vec<_> = snapshot.iter().filter_map(|i| i.fitness()).collect();
        assert_eq!(sorted, vec![1.0, 2.0, 3.0]);
        let live: Vec<_> = pop.iter().filter_map(|i| i.fitness()).collect();
        assert_eq!(live, vec![3.0, 1.0, 2.0]);
    }
}
