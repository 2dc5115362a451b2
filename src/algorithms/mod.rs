//! Run orchestration
//!
//! [`island_algo`] drives a single island's generation loop; [`island_model`]
//! assembles and runs the whole archipelago across threads.

pub mod island_algo;
pub mod island_model;

pub mod prelude {
    pub use super::island_algo::IslandAlgo;
    pub use super::island_model::{
        IslandModel, IslandModelBuilder, IslandModelConfig, IslandReport, RewardStrategy,
        RunReport,
    };
}
