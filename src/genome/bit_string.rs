//! Bit string genome and its toolkit
//!
//! A fixed-length bit string plus the collaborators the demos and
//! integration tests plug into the core: the OneMax evaluator and two
//! bit-flip variation operators.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::operators::traits::{Evaluator, VariationOperator};
use crate::population::individual::Individual;

/// Fixed-length bit string genome
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    /// Create a bit string from the given bits
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Create an all-zeros bit string of the given length
    pub fn zeros(length: usize) -> Self {
        Self {
            bits: vec![false; length],
        }
    }

    /// Create an all-ones bit string of the given length
    pub fn ones(length: usize) -> Self {
        Self {
            bits: vec![true; length],
        }
    }

    /// Create a uniformly random bit string of the given length
    pub fn random<R: Rng>(length: usize, rng: &mut R) -> Self {
        Self {
            bits: (0..length).map(|_| rng.gen()).collect(),
        }
    }

    /// Get the length of the bit string
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check if the bit string is empty
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Get a specific bit
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Flip a specific bit
    pub fn flip(&mut self, index: usize) {
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = !*bit;
        }
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// OneMax evaluator: fitness is the number of set bits
#[derive(Clone, Copy, Debug, Default)]
pub struct OneMax;

impl Evaluator<BitString> for OneMax {
    fn evaluate(&self, individual: &mut Individual<BitString>) {
        let fitness = individual.genome().count_ones() as f64;
        individual.set_fitness(fitness);
    }
}

/// Flip exactly `nbits` distinct, randomly chosen bits
#[derive(Clone, Copy, Debug)]
pub struct DetBitFlip {
    nbits: usize,
}

impl DetBitFlip {
    /// Create the operator; `nbits` bits are flipped per application
    pub fn new(nbits: usize) -> Self {
        Self { nbits }
    }
}

impl VariationOperator<BitString> for DetBitFlip {
    fn apply(&self, genome: &mut BitString, rng: &mut dyn RngCore) {
        let len = genome.len();
        if len == 0 || self.nbits == 0 {
            return;
        }
        let nbits = self.nbits.min(len);

        let mut selected: Vec<usize> = Vec::with_capacity(nbits);
        while selected.len() < nbits {
            let index = rng.gen_range(0..len);
            if !selected.contains(&index) {
                selected.push(index);
            }
        }
        for index in selected {
            genome.flip(index);
        }
    }
}

/// Flip each bit independently with a fixed rate
#[derive(Clone, Copy, Debug)]
pub struct BitMutation {
    rate: f64,
    /// Divide the rate by the genome length, giving one expected flip per
    /// application regardless of size
    normalize: bool,
}

impl BitMutation {
    /// Create the operator with a per-bit flip rate
    pub fn new(rate: f64, normalize: bool) -> Self {
        Self { rate, normalize }
    }
}

impl VariationOperator<BitString> for BitMutation {
    fn apply(&self, genome: &mut BitString, rng: &mut dyn RngCore) {
        let len = genome.len();
        if len == 0 {
            return;
        }
        let p = if self.normalize {
            self.rate / len as f64
        } else {
            self.rate
        };
        for index in 0..len {
            if rng.gen::<f64>() < p {
                genome.flip(index);
            }
        }
    }
}
