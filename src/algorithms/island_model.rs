//! Top-level driver
//!
//! Owns the run configuration, seeds the probability matrix, builds one
//! pipeline per island and runs every island on its own thread until the
//! archipelago stops. One execution context per island, joined together;
//! there is no central scheduler, the islands coordinate peer-to-peer
//! through the shared barriers and queues.

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::algorithms::island_algo::IslandAlgo;
use crate::checkpoint::continuators::{MaxGen, TargetFitness};
use crate::checkpoint::monitors::FileMonitor;
use crate::checkpoint::stats::{
    AverageFitness, BestFitness, Feedbacks, Generation, IslandRank, PopSize, Probabilities,
};
use crate::checkpoint::Checkpoint;
use crate::error::{IslandError, IslandResult};
use crate::genome::traits::Genome;
use crate::island::matrix::InitMatrix;
use crate::island::state::{Archipelago, IslandState};
use crate::operators::evolver::Evolver;
use crate::operators::feedbacker::Feedbacker;
use crate::operators::memorizer::Memorizer;
use crate::operators::migrator::Migrator;
use crate::operators::traits::{Evaluator, VariationOperator};
use crate::operators::updater::{AverageReward, BestReward, RewardPolicy, Updater};
use crate::population::individual::Individual;
use crate::population::population::Population;

/// Reward policy selection for the update stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardStrategy {
    /// Winner-take-most
    Best,
    /// Proportional sharing
    Average,
}

impl RewardStrategy {
    fn build(self, alpha: f64, beta: f64, seed: Option<u64>) -> Box<dyn RewardPolicy> {
        match (self, seed) {
            (Self::Best, Some(seed)) => Box::new(BestReward::with_seed(alpha, beta, seed)),
            (Self::Best, None) => Box::new(BestReward::new(alpha, beta)),
            (Self::Average, Some(seed)) => Box::new(AverageReward::with_seed(alpha, beta, seed)),
            (Self::Average, None) => Box::new(AverageReward::new(alpha, beta)),
        }
    }
}

/// Configuration for an island-model run
#[derive(Clone, Debug)]
pub struct IslandModelConfig {
    /// Number of islands (one thread each)
    pub num_islands: usize,
    /// Population size per island
    pub population_size: usize,
    /// Smoothing factor of the feedback moving average
    pub feedback_alpha: f64,
    /// Exploitation rate of the reward policy
    pub reward_alpha: f64,
    /// Exploration rate of the reward policy
    pub reward_beta: f64,
    /// Which reward policy runs in the update stage
    pub reward: RewardStrategy,
    /// Stop once any island's best fitness reaches this value
    pub target_fitness: Option<f64>,
    /// Stop after this many generations
    pub max_generations: Option<u64>,
    /// How the migration matrix is seeded
    pub init_matrix: InitMatrix,
    /// Minimum time between monitor rows
    pub monitor_step: Option<Duration>,
    /// Seed for deterministic runs; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for IslandModelConfig {
    fn default() -> Self {
        Self {
            num_islands: 4,
            population_size: 100,
            feedback_alpha: Feedbacker::DEFAULT_ALPHA,
            reward_alpha: BestReward::DEFAULT_ALPHA,
            reward_beta: BestReward::DEFAULT_BETA,
            reward: RewardStrategy::Best,
            target_fitness: None,
            max_generations: None,
            init_matrix: InitMatrix::Uniform,
            monitor_step: None,
            seed: None,
        }
    }
}

/// Outcome of one island's run
pub struct IslandReport<G: Genome> {
    /// Island rank
    pub rank: usize,
    /// Final population after the last migration
    pub population: Population<G>,
    /// Best individual in the final population
    pub best: Option<Individual<G>>,
    /// Generations this island entered
    pub generations: u64,
}

/// Outcome of a full run
pub struct RunReport<G: Genome> {
    /// One report per island, ordered by rank
    pub islands: Vec<IslandReport<G>>,
}

impl<G: Genome> RunReport<G> {
    /// Best individual across all islands
    pub fn best(&self) -> Option<&Individual<G>> {
        self.islands
            .iter()
            .filter_map(|island| island.best.as_ref())
            .fold(None, |acc, ind| match acc {
                None => Some(ind),
                Some(best) if ind.is_better_than(best) => Some(ind),
                keep => keep,
            })
    }
}

type GenomeInit<G> = Box<dyn FnMut() -> G>;
type VariationFactory<G> = Box<dyn Fn(usize) -> Box<dyn VariationOperator<G>>>;
type MonitorSinkFactory = Box<dyn Fn(usize) -> std::io::Result<Box<dyn Write + Send>>>;

/// Builder for [`IslandModel`]
pub struct IslandModelBuilder<G: Genome, E: Evaluator<G> + Clone> {
    config: IslandModelConfig,
    evaluator: E,
    genome_init: Option<GenomeInit<G>>,
    variation: Option<VariationFactory<G>>,
    monitor_sink: Option<MonitorSinkFactory>,
}

impl<G: Genome, E: Evaluator<G> + Clone + 'static> IslandModelBuilder<G, E> {
    /// Start a builder around the problem evaluator
    pub fn new(evaluator: E) -> Self {
        Self {
            config: IslandModelConfig::default(),
            evaluator,
            genome_init: None,
            variation: None,
            monitor_sink: None,
        }
    }

    /// Set number of islands
    pub fn num_islands(mut self, n: usize) -> Self {
        self.config.num_islands = n;
        self
    }

    /// Set population size per island
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the feedback smoothing factor
    pub fn feedback_alpha(mut self, alpha: f64) -> Self {
        self.config.feedback_alpha = alpha;
        self
    }

    /// Set the reward exploitation and exploration rates
    pub fn reward_rates(mut self, alpha: f64, beta: f64) -> Self {
        self.config.reward_alpha = alpha;
        self.config.reward_beta = beta;
        self
    }

    /// Choose the reward policy
    pub fn reward(mut self, strategy: RewardStrategy) -> Self {
        self.config.reward = strategy;
        self
    }

    /// Stop once any island reaches this fitness
    pub fn target_fitness(mut self, target: f64) -> Self {
        self.config.target_fitness = Some(target);
        self
    }

    /// Stop after this many generations
    pub fn max_generations(mut self, generations: u64) -> Self {
        self.config.max_generations = Some(generations);
        self
    }

    /// Choose how the migration matrix is seeded
    pub fn init_matrix(mut self, init: InitMatrix) -> Self {
        self.config.init_matrix = init;
        self
    }

    /// Throttle monitor rows to at most one per `step`
    pub fn monitor_step(mut self, step: Duration) -> Self {
        self.config.monitor_step = Some(step);
        self
    }

    /// Seed every random stream for a deterministic run
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// How initial genomes are produced
    pub fn genome_init<F: FnMut() -> G + 'static>(mut self, init: F) -> Self {
        self.genome_init = Some(Box::new(init));
        self
    }

    /// Per-island variation operator, keyed by rank so islands can run
    /// different mutation strengths
    pub fn variation<F>(mut self, factory: F) -> Self
    where
        F: Fn(usize) -> Box<dyn VariationOperator<G>> + 'static,
    {
        self.variation = Some(Box::new(factory));
        self
    }

    /// Per-island monitor sink, keyed by rank (e.g. one log file per island)
    pub fn monitor_sink<F>(mut self, factory: F) -> Self
    where
        F: Fn(usize) -> std::io::Result<Box<dyn Write + Send>> + 'static,
    {
        self.monitor_sink = Some(Box::new(factory));
        self
    }

    /// Validate the configuration and build the model
    pub fn build(self) -> IslandResult<IslandModel<G, E>> {
        let config = self.config;
        if config.num_islands == 0 {
            return Err(IslandError::Configuration(
                "at least one island is required".to_string(),
            ));
        }
        if config.population_size == 0 {
            return Err(IslandError::Configuration(
                "population size must be positive".to_string(),
            ));
        }
        if config.target_fitness.is_none() && config.max_generations.is_none() {
            return Err(IslandError::Configuration(
                "a stopping condition is required (target fitness or max generations)"
                    .to_string(),
            ));
        }
        let genome_init = self.genome_init.ok_or_else(|| {
            IslandError::Configuration("a genome initializer is required".to_string())
        })?;
        let variation = self.variation.ok_or_else(|| {
            IslandError::Configuration("a variation operator factory is required".to_string())
        })?;

        Ok(IslandModel {
            config,
            evaluator: self.evaluator,
            genome_init,
            variation,
            monitor_sink: self.monitor_sink,
        })
    }
}

/// The assembled island model, ready to run
pub struct IslandModel<G: Genome, E: Evaluator<G> + Clone> {
    config: IslandModelConfig,
    evaluator: E,
    genome_init: GenomeInit<G>,
    variation: VariationFactory<G>,
    monitor_sink: Option<MonitorSinkFactory>,
}

struct IslandSetup<G: Genome> {
    rank: usize,
    pop: Population<G>,
    state: IslandState<G>,
    variation: Box<dyn VariationOperator<G>>,
    sink: Option<Box<dyn Write + Send>>,
    seed: Option<u64>,
}

impl<G: Genome, E: Evaluator<G> + Clone + 'static> IslandModel<G, E> {
    /// Run all islands to completion and collect the per-island reports
    pub fn run(mut self) -> IslandResult<RunReport<G>> {
        let config = self.config.clone();
        let n = config.num_islands;
        info!(
            islands = n,
            population = config.population_size,
            "starting island model run"
        );

        let mut matrix_rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let matrix = config.init_matrix.build(n, &mut matrix_rng)?;

        let shared = Archipelago::new(n);
        let mut setups = Vec::with_capacity(n);
        for rank in 0..n {
            let mut pop = Population::init(config.population_size, &mut self.genome_init);
            pop.evaluate_with(&self.evaluator);

            let mut state = IslandState::new(rank, Arc::clone(&shared));
            state.set_proba(matrix[rank].clone());

            let sink = match &self.monitor_sink {
                Some(factory) => Some(factory(rank)?),
                None => None,
            };

            setups.push(IslandSetup {
                rank,
                pop,
                state,
                variation: (self.variation)(rank),
                sink,
                seed: config.seed.map(|s| s.wrapping_add(rank as u64)),
            });
        }

        let evaluator = self.evaluator;
        let islands = thread::scope(|scope| {
            let handles: Vec<_> = setups
                .into_iter()
                .map(|setup| {
                    let evaluator = evaluator.clone();
                    let config = config.clone();
                    scope.spawn(move || run_island(setup, evaluator, &config))
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| {
                    handle.join().map_err(|_| IslandError::IslandPanicked(rank))
                })
                .collect::<IslandResult<Vec<_>>>()
        })?;

        info!("island model run finished");
        Ok(RunReport { islands })
    }
}

fn run_island<G: Genome, E: Evaluator<G> + Clone + 'static>(
    setup: IslandSetup<G>,
    evaluator: E,
    config: &IslandModelConfig,
) -> IslandReport<G> {
    let IslandSetup {
        rank,
        mut pop,
        mut state,
        variation,
        sink,
        seed,
    } = setup;

    let mut checkpoint = Checkpoint::new();
    if let Some(target) = config.target_fitness {
        checkpoint.add_continuator(Box::new(TargetFitness::new(target)));
    }
    if let Some(max_gen) = config.max_generations {
        checkpoint.add_continuator(Box::new(MaxGen::new(max_gen)));
    }

    // the standard monitor row: rank, generation, size, average, best,
    // then one probability and one feedback column per island
    let ids = [
        checkpoint.add_stat(Box::new(IslandRank::new())),
        checkpoint.add_stat(Box::new(Generation::new())),
        checkpoint.add_stat(Box::new(PopSize::new())),
        checkpoint.add_stat(Box::new(AverageFitness::new())),
        checkpoint.add_stat(Box::new(BestFitness::new())),
        checkpoint.add_stat(Box::new(Probabilities::new())),
        checkpoint.add_stat(Box::new(Feedbacks::new())),
    ];
    if let Some(sink) = sink {
        let mut monitor = FileMonitor::new(sink);
        if let Some(step) = config.monitor_step {
            monitor = monitor.min_step(step);
        }
        for id in ids {
            monitor.watch(id);
        }
        checkpoint.add_monitor(Box::new(monitor));
    }

    let evolver = match seed {
        Some(seed) => Evolver::with_seed(evaluator, variation, seed),
        None => Evolver::new(evaluator, variation),
    };
    let migrator = match seed {
        Some(seed) => Migrator::with_seed(seed),
        None => Migrator::new(),
    };
    let reward = config
        .reward
        .build(config.reward_alpha, config.reward_beta, seed);

    let mut algo = IslandAlgo::new(
        Box::new(evolver),
        Box::new(Feedbacker::with_alpha(config.feedback_alpha)),
        Box::new(Updater::new(reward)),
        Box::new(Memorizer::new()),
        Box::new(migrator),
        checkpoint,
    );

    let generations = algo.run(&mut pop, &mut state);
    let best = pop.best().cloned();
    IslandReport {
        rank,
        population: pop,
        best,
        generations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::bit_string::{BitString, DetBitFlip, OneMax};

    #[test]
    fn test_builder_rejects_zero_islands() {
        let result = IslandModelBuilder::new(OneMax)
            .num_islands(0)
            .max_generations(1)
            .genome_init(|| BitString::zeros(4))
            .variation(|_| Box::new(DetBitFlip::new(1)) as _)
            .build();
        assert!(matches!(result, Err(IslandError::Configuration(_))));
    }

    #[test]
    fn test_builder_requires_stopping_condition() {
        let result = IslandModelBuilder::new(OneMax)
            .genome_init(|| BitString::zeros(4))
            .variation(|_| Box::new(DetBitFlip::new(1)) as _)
            .build();
        assert!(matches!(result, Err(IslandError::Configuration(_))));
    }

    #[test]
    fn test_builder_requires_variation_factory() {
        let result = IslandModelBuilder::new(OneMax)
            .max_generations(1)
            .genome_init(|| BitString::zeros(4))
            .build();
        assert!(matches!(result, Err(IslandError::Configuration(_))));
    }

    #[test]
    fn test_two_island_run_conserves_population() {
        let report = IslandModelBuilder::new(OneMax)
            .num_islands(2)
            .population_size(5)
            .max_generations(3)
            .seed(42)
            .genome_init(|| BitString::zeros(2))
            .variation(|_| Box::new(DetBitFlip::new(1)) as _)
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(report.islands.len(), 2);
        let total: usize = report
            .islands
            .iter()
            .map(|island| island.population.len())
            .sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_target_fitness_stops_the_run() {
        let report = IslandModelBuilder::new(OneMax)
            .num_islands(2)
            .population_size(10)
            .target_fitness(4.0)
            .max_generations(500)
            .seed(7)
            .genome_init(|| BitString::zeros(4))
            .variation(|_| Box::new(DetBitFlip::new(1)) as _)
            .build()
            .unwrap()
            .run()
            .unwrap();

        let best = report.best().and_then(|ind| ind.fitness()).unwrap();
        assert!(best >= 4.0);
    }
}
