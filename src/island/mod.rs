//! Island coordination primitives
//!
//! Shared queues, the abortable rendezvous barrier, the split run state
//! (`Archipelago` / `IslandState`) and migration-matrix seeding.

pub mod barrier;
pub mod matrix;
pub mod queue;
pub mod state;

pub mod prelude {
    pub use super::barrier::Barrier;
    pub use super::matrix::InitMatrix;
    pub use super::queue::SharedQueue;
    pub use super::state::{Archipelago, IslandState, Mailbox, PROBA_TOTAL};
}
