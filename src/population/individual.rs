//! Individual wrapper type
//!
//! This module provides the Individual type that wraps a genome with its
//! fitness history and island provenance.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::genome::traits::Genome;

/// An individual in an island population
///
/// Wraps a genome with its current and previous fitness and the rank of the
/// island it last resided on. The fitness pair drives the feedbacker's
/// effectiveness estimate: the delta `fitness - last_fitness` measures how
/// much an individual improved since it arrived.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Individual<G: Genome> {
    /// The genome of this individual
    genome: G,
    /// Current fitness (None if never evaluated)
    fitness: Option<f64>,
    /// Fitness before the most recent evaluation
    previous_fitness: Option<f64>,
    /// Rank of the island this individual last resided on
    last_island: Option<usize>,
}

impl<G: Genome> Individual<G> {
    /// Create a new unevaluated individual
    pub fn new(genome: G) -> Self {
        Self {
            genome,
            fitness: None,
            previous_fitness: None,
            last_island: None,
        }
    }

    /// Create an individual with a known fitness
    pub fn with_fitness(genome: G, fitness: f64) -> Self {
        Self {
            genome,
            fitness: Some(fitness),
            previous_fitness: None,
            last_island: None,
        }
    }

    /// Check if this individual has been evaluated at least once
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Current fitness, `None` if never evaluated
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Record a new fitness value, shifting the current one into the history
    pub fn set_fitness(&mut self, value: f64) {
        self.previous_fitness = self.fitness;
        self.fitness = Some(value);
    }

    /// Fitness before the most recent evaluation.
    ///
    /// Resolution order: never evaluated yields `None`; evaluated exactly
    /// once falls back to the current fitness (a zero delta on the first
    /// generation); evaluated twice or more yields the previous value.
    pub fn last_fitness(&self) -> Option<f64> {
        match (self.fitness, self.previous_fitness) {
            (None, _) => None,
            (Some(current), None) => Some(current),
            (Some(_), Some(previous)) => Some(previous),
        }
    }

    /// Fitness improvement since the previous evaluation, `None` if never
    /// evaluated
    pub fn fitness_delta(&self) -> Option<f64> {
        match (self.fitness, self.last_fitness()) {
            (Some(current), Some(last)) => Some(current - last),
            _ => None,
        }
    }

    /// Rank of the island this individual last resided on
    pub fn last_island(&self) -> Option<usize> {
        self.last_island
    }

    /// Stamp the island this individual currently resides on
    pub fn set_last_island(&mut self, rank: usize) {
        self.last_island = Some(rank);
    }

    /// Get a reference to the genome
    pub fn genome(&self) -> &G {
        &self.genome
    }

    /// Get a mutable reference to the genome
    pub fn genome_mut(&mut self) -> &mut G {
        &mut self.genome
    }

    /// Take the genome out of this individual
    pub fn into_genome(self) -> G {
        self.genome
    }

    /// Check if this individual's fitness strictly beats another's
    pub fn is_better_than(&self, other: &Self) -> bool {
        match (self.fitness, other.fitness) {
            (Some(a), Some(b)) => a > b,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

impl<G: Genome + PartialEq> PartialEq for Individual<G> {
    fn eq(&self, other: &Self) -> bool {
        self.genome == other.genome && self.fitness == other.fitness
    }
}

impl<G: Genome + PartialEq> PartialOrd for Individual<G> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.fitness, other.fitness) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            (Some(_), None) => Some(Ordering::Greater),
            (None, Some(_)) => Some(Ordering::Less),
            (None, None) => Some(Ordering::Equal),
        }
    }
}
