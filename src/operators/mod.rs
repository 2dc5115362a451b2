//! Island pipeline operators
//!
//! The five per-generation stages (evolve, feedback, update, memorize,
//! migrate) plus the collaborator traits they are parameterized over.

pub mod evolver;
pub mod feedbacker;
pub mod memorizer;
pub mod migrator;
pub mod traits;
pub mod updater;

pub mod prelude {
    pub use super::evolver::Evolver;
    pub use super::feedbacker::{Feedbacker, Mean};
    pub use super::memorizer::Memorizer;
    pub use super::migrator::Migrator;
    pub use super::traits::{Evaluator, IslandOperator, VariationOperator};
    pub use super::updater::{AverageReward, BestReward, RewardPolicy, Updater};
}
