//! # archipelago
//!
//! A Dynamic Islands Model runtime for Rust.
//!
//! This library implements a parallel evolutionary algorithm in which several
//! independent islands, each running its own hill-climbing loop, periodically
//! exchange individuals and adapt how much they migrate toward each peer based
//! on the observed effectiveness of past migrants.
//!
//! ## Core Concepts
//!
//! - **Islands**: one concurrently running evolutionary loop per island, with
//!   its own population and outgoing migration-probability vector
//! - **Feedback**: a smoothed scalar estimating how effective migrants from a
//!   given island have been for the island that received them
//! - **Reward policies**: rules converting feedback into revised migration
//!   probabilities (winner-take-most or proportional sharing)
//! - **Barriers**: every generation, all islands rendezvous twice, once to
//!   exchange feedback and once to exchange migrants
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use archipelago::prelude::*;
//!
//! let report = IslandModelBuilder::new(OneMax)
//!     .num_islands(4)
//!     .population_size(100)
//!     .max_generations(200)
//!     .genome_init(|| BitString::random(1000, &mut rand::thread_rng()))
//!     .variation(|rank| Box::new(DetBitFlip::new(rank + 1)) as _)
//!     .build()?
//!     .run()?;
//! ```

pub mod algorithms;
pub mod checkpoint;
pub mod error;
pub mod genome;
pub mod island;
pub mod operators;
pub mod population;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::checkpoint::prelude::*;
    pub use crate::error::*;
    pub use crate::genome::prelude::*;
    pub use crate::island::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
}
