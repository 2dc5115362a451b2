//! Feedback stage
//!
//! Two-phase exchange separated by a full rendezvous. `send` measures how
//! effective each source island's migrants have been locally (mean fitness
//! delta) and broadcasts one value to every island, self included. After the
//! barrier, `recv` drains the local inbox and folds each value into the
//! feedback vector with an exponential moving average.

use tracing::debug;

use crate::error::IslandResult;
use crate::genome::traits::Genome;
use crate::island::state::IslandState;
use crate::operators::traits::IslandOperator;
use crate::population::population::Population;

/// Incremental mean accumulator
#[derive(Clone, Debug, Default)]
pub struct Mean {
    value: f64,
    n: usize,
}

impl Mean {
    /// Create a zeroed accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation into the running mean
    pub fn add(&mut self, x: f64) {
        self.n += 1;
        self.value += (x - self.value) / self.n as f64;
    }

    /// Current mean, 0.0 when no observations were added
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Number of observations folded in
    pub fn count(&self) -> usize {
        self.n
    }
}

/// The feedback stage of the island pipeline
pub struct Feedbacker {
    alpha: f64,
}

impl Feedbacker {
    /// Default smoothing factor for the feedback moving average
    pub const DEFAULT_ALPHA: f64 = 0.01;

    /// Create a feedbacker with the default smoothing factor
    pub fn new() -> Self {
        Self::with_alpha(Self::DEFAULT_ALPHA)
    }

    /// Create a feedbacker with the given smoothing factor
    pub fn with_alpha(alpha: f64) -> Self {
        Self { alpha }
    }

    /// Mean fitness delta of local individuals per source island.
    ///
    /// Index `i` holds the mean of `fitness - last_fitness` over individuals
    /// whose provenance is island `i`, 0.0 when the island sent none.
    fn effectivenesses<G: Genome>(
        &self,
        pop: &Population<G>,
        state: &IslandState<G>,
    ) -> Vec<Mean> {
        let mut means = vec![Mean::new(); state.size()];
        for ind in pop.iter() {
            if let (Some(source), Some(delta)) = (ind.last_island(), ind.fitness_delta()) {
                means[source].add(delta);
            }
        }
        means
    }

    fn send<G: Genome>(&self, pop: &Population<G>, state: &IslandState<G>) {
        let means = self.effectivenesses(pop, state);
        for (i, mean) in means.iter().enumerate() {
            state
                .shared()
                .mailbox(i)
                .feedbacks
                .push(mean.value(), state.rank());
        }
    }

    fn recv<G: Genome>(&self, state: &mut IslandState<G>) {
        let alpha = self.alpha;
        let mut received = 0usize;
        while let Some((value, from)) = state.mailbox().feedbacks.pop() {
            state.feedbacks[from] = (1.0 - alpha) * state.feedbacks[from] + alpha * value;
            received += 1;
        }
        debug!(rank = state.rank(), received, "feedback inbox drained");
    }
}

impl Default for Feedbacker {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Genome> IslandOperator<G> for Feedbacker {
    fn apply(&mut self, pop: &mut Population<G>, state: &mut IslandState<G>) -> IslandResult<()> {
        self.send(pop, state);
        state.shared().feedback_barrier().wait()?;
        self.recv(state);
        Ok(())
    }

    fn last_call(&mut self, _pop: &mut Population<G>, state: &mut IslandState<G>) {
        // unblock any peer still waiting for this island
        state.shared().feedback_barrier().abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::bit_string::BitString;
    use crate::island::state::Archipelago;
    use crate::population::individual::Individual;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_mean_matches_arithmetic_mean() {
        let mut mean = Mean::new();
        for x in [1.0, 2.0, 3.0, 4.0] {
            mean.add(x);
        }
        assert!((mean.value() - 2.5).abs() < 1e-12);
        assert_eq!(mean.count(), 4);
    }

    #[test]
    fn test_empty_mean_is_zero() {
        assert_eq!(Mean::new().value(), 0.0);
    }

    #[test]
    fn test_single_value_ema_is_exact() {
        // alpha 0.01, initial feedback 0, one incoming value 1.0
        let shared = Archipelago::<BitString>::new(1);
        let mut state = IslandState::new(0, shared);
        state.mailbox().feedbacks.push(1.0, 0);

        let feedbacker = Feedbacker::new();
        feedbacker.recv(&mut state);
        assert_eq!(state.feedbacks[0], 0.01);
    }

    #[test]
    fn test_effectiveness_groups_by_provenance() {
        let shared = Archipelago::<BitString>::new(2);
        let state = IslandState::new(0, shared);

        let mut pop = Population::new();
        for (island, first, second) in [(0, 0.0, 1.0), (0, 0.0, 3.0), (1, 2.0, 2.0)] {
            let mut ind = Individual::new(BitString::zeros(4));
            ind.set_fitness(first);
            ind.set_fitness(second);
            ind.set_last_island(island);
            pop.push(ind);
        }

        let means = Feedbacker::new().effectivenesses(&pop, &state);
        assert_eq!(means[0].value(), 2.0);
        assert_eq!(means[1].value(), 0.0);
    }

    #[test]
    fn test_two_island_exchange() {
        // each island broadcasts its per-source means, then smooths what
        // it receives; only the diagonal entries should move
        let shared = Archipelago::<BitString>::new(2);
        let mut handles = Vec::new();
        for rank in 0..2 {
            let shared = Arc::clone(&shared);
            handles.push(thread::spawn(move || {
                let mut state = IslandState::new(rank, shared);
                let mut pop = Population::new();
                for _ in 0..5 {
                    let mut ind = Individual::new(BitString::zeros(2));
                    ind.set_fitness(0.0);
                    // island 0's individuals improved by 1, island 1's by 2
                    ind.set_fitness((rank + 1) as f64);
                    ind.set_last_island(rank);
                    pop.push(ind);
                }
                let mut feedbacker = Feedbacker::new();
                feedbacker.apply(&mut pop, &mut state).unwrap();
                state.feedbacks
            }));
        }

        let feedbacks: Vec<Vec<f64>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        // each island only saw its own residents, so only the diagonal moves
        assert_eq!(feedbacks[0], vec![0.01, 0.0]);
        assert_eq!(feedbacks[1], vec![0.0, 0.02]);
    }
}
