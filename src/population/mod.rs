//! Population types
//!
//! Individuals with fitness history and island provenance, grouped into
//! populations owned by exactly one island at a time.

pub mod individual;
#[allow(clippy::module_inception)]
pub mod population;

pub use individual::Individual;
pub use population::Population;

/// Prelude for population module
pub mod prelude {
    pub use super::individual::Individual;
    pub use super::population::Population;
}
