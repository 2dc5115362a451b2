//! Genome abstractions and implementations
//!
//! The core `Genome` trait bound plus the built-in bit-string toolkit used
//! by demos and tests.

pub mod bit_string;
pub mod traits;

pub mod prelude {
    pub use super::bit_string::{BitMutation, BitString, DetBitFlip, OneMax};
    pub use super::traits::Genome;
}
