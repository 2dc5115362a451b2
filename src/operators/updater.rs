//! Probability vector update stage
//!
//! Converts the smoothed feedback vector into a revised outgoing migration
//! row. Two interchangeable reward policies are provided: winner-take-most
//! (`BestReward`) and proportional sharing (`AverageReward`). Both blend in a
//! freshly drawn exploration vector and both assign the last slot by
//! subtraction so the row keeps its exact total mass.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::IslandResult;
use crate::genome::traits::Genome;
use crate::island::state::{IslandState, PROBA_TOTAL};
use crate::operators::traits::IslandOperator;
use crate::population::population::Population;

/// Rule converting feedback into a revised probability row
///
/// Implementations read `feedbacks` and are the only writer of `proba`.
pub trait RewardPolicy: Send {
    /// Rewrite `proba` in place from `feedbacks`
    fn update(&mut self, feedbacks: &[f64], proba: &mut [u32]);
}

/// Draw a random exploration vector normalized to the row total
fn exploration_vector(n: usize, rng: &mut StdRng) -> Vec<f64> {
    let weights: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return vec![f64::from(PROBA_TOTAL) / n as f64; n];
    }
    weights
        .into_iter()
        .map(|w| w / total * f64::from(PROBA_TOTAL))
        .collect()
}

/// Assign the first `n-1` slots from float targets, clamped to the mass
/// still available, then give the last slot the exact remainder.
fn commit_row(targets: &[f64], proba: &mut [u32]) {
    let n = proba.len();
    let mut assigned = 0u32;
    for i in 0..n - 1 {
        let remaining = PROBA_TOTAL - assigned;
        let value = targets[i].round().max(0.0).min(f64::from(remaining)) as u32;
        proba[i] = value;
        assigned += value;
    }
    proba[n - 1] = PROBA_TOTAL - assigned;
}

/// Winner-take-most policy: pull the best-performing destination toward the
/// full row mass and decay every other slot
pub struct BestReward {
    alpha: f64,
    beta: f64,
    rng: StdRng,
}

impl BestReward {
    /// Default exploitation rate
    pub const DEFAULT_ALPHA: f64 = 0.2;
    /// Default exploration rate
    pub const DEFAULT_BETA: f64 = 0.01;

    /// Create the policy with the given exploitation/exploration rates
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha,
            beta,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create the policy with a deterministic random stream
    pub fn with_seed(alpha: f64, beta: f64, seed: u64) -> Self {
        Self {
            alpha,
            beta,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for BestReward {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ALPHA, Self::DEFAULT_BETA)
    }
}

impl RewardPolicy for BestReward {
    fn update(&mut self, feedbacks: &[f64], proba: &mut [u32]) {
        let n = proba.len();
        // first maximum wins ties
        let mut best = 0usize;
        for (i, &f) in feedbacks.iter().enumerate() {
            if f > feedbacks[best] {
                best = i;
            }
        }

        let noise = exploration_vector(n, &mut self.rng);
        let a = self.alpha;
        let b = self.beta;
        let total = f64::from(PROBA_TOTAL);

        let targets: Vec<f64> = (0..n)
            .map(|i| {
                let p = f64::from(proba[i]);
                if i == best {
                    (1.0 - b) * ((1.0 - a) * p + a * total) + b * noise[i]
                } else {
                    (1.0 - b) * (1.0 - a) * p + b * noise[i]
                }
            })
            .collect();
        commit_row(&targets, proba);
    }
}

/// Proportional policy: share the row mass according to normalized feedback
pub struct AverageReward {
    alpha: f64,
    beta: f64,
    rng: StdRng,
}

impl AverageReward {
    /// Create the policy with the given exploitation/exploration rates
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha,
            beta,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create the policy with a deterministic random stream
    pub fn with_seed(alpha: f64, beta: f64, seed: u64) -> Self {
        Self {
            alpha,
            beta,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for AverageReward {
    fn default() -> Self {
        Self::new(BestReward::DEFAULT_ALPHA, BestReward::DEFAULT_BETA)
    }
}

impl RewardPolicy for AverageReward {
    fn update(&mut self, feedbacks: &[f64], proba: &mut [u32]) {
        let n = proba.len();
        let total_feedback: f64 = feedbacks.iter().sum();
        if total_feedback <= 0.0 {
            // nothing to learn from yet; not an error
            debug!("skipping proportional update, no positive feedback");
            return;
        }

        let shares: Vec<f64> = feedbacks
            .iter()
            .map(|&f| f / total_feedback * f64::from(PROBA_TOTAL))
            .collect();
        let noise = exploration_vector(n, &mut self.rng);
        let a = self.alpha;
        let b = self.beta;

        let targets: Vec<f64> = (0..n)
            .map(|i| {
                let p = f64::from(proba[i]);
                (1.0 - b) * ((1.0 - a) * p + a * shares[i]) + b * noise[i]
            })
            .collect();
        commit_row(&targets, proba);
    }
}

/// The update stage of the island pipeline, wrapping a reward policy
pub struct Updater {
    reward: Box<dyn RewardPolicy>,
}

impl Updater {
    /// Create an updater from a reward policy
    pub fn new(reward: Box<dyn RewardPolicy>) -> Self {
        Self { reward }
    }
}

impl<G: Genome> IslandOperator<G> for Updater {
    fn apply(&mut self, _pop: &mut Population<G>, state: &mut IslandState<G>) -> IslandResult<()> {
        self.reward.update(&state.feedbacks, &mut state.proba);
        Ok(())
    }
}
