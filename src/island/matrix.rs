//! Migration matrix initialization
//!
//! Produces the N×N row-stochastic matrix used to seed each island's
//! outgoing probability row at startup. Every row sums to `PROBA_TOTAL`
//! exactly; rounding remainders land on the row's last adjustable slot.

use rand::Rng;

use crate::error::{IslandError, IslandResult};
use crate::island::state::PROBA_TOTAL;

/// Seeding mode for the migration matrix
#[derive(Clone, Debug, PartialEq)]
pub enum InitMatrix {
    /// Every destination gets an equal share of the row mass
    Uniform,
    /// Each island keeps `retention` mass for itself and splits the
    /// remainder evenly among the other destinations
    Diagonal {
        /// Self-retention mass, at most `PROBA_TOTAL`
        retention: u32,
    },
    /// Each row is an independently drawn random distribution
    Random,
}

impl InitMatrix {
    /// Build the N×N matrix; row `i` seeds island `i`'s probability row
    pub fn build<R: Rng>(&self, size: usize, rng: &mut R) -> IslandResult<Vec<Vec<u32>>> {
        if size == 0 {
            return Err(IslandError::Configuration(
                "island count must be positive".to_string(),
            ));
        }
        match self {
            Self::Uniform => Ok((0..size).map(|_| uniform_row(size)).collect()),
            Self::Diagonal { retention } => {
                if *retention > PROBA_TOTAL {
                    return Err(IslandError::Configuration(format!(
                        "diagonal retention {retention} exceeds row mass {PROBA_TOTAL}"
                    )));
                }
                if size == 1 {
                    return Ok(vec![vec![PROBA_TOTAL]]);
                }
                Ok((0..size).map(|i| diagonal_row(size, i, *retention)).collect())
            }
            Self::Random => Ok((0..size).map(|_| random_row(size, rng)).collect()),
        }
    }
}

fn uniform_row(size: usize) -> Vec<u32> {
    let share = PROBA_TOTAL / size as u32;
    let mut row = vec![share; size];
    let assigned: u32 = share * (size as u32 - 1);
    row[size - 1] = PROBA_TOTAL - assigned;
    row
}

fn diagonal_row(size: usize, diag: usize, retention: u32) -> Vec<u32> {
    let spread = PROBA_TOTAL - retention;
    let share = spread / (size as u32 - 1);
    let mut row = vec![share; size];
    row[diag] = retention;
    // remainder lands on the last off-diagonal slot
    let last_off_diag = if diag == size - 1 { size - 2 } else { size - 1 };
    let assigned: u32 = row
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != last_off_diag)
        .map(|(_, &v)| v)
        .sum();
    row[last_off_diag] = PROBA_TOTAL - assigned;
    row
}

fn random_row<R: Rng>(size: usize, rng: &mut R) -> Vec<u32> {
    let weights: Vec<f64> = (0..size).map(|_| rng.gen::<f64>()).collect();
    let total: f64 = weights.iter().sum();
    let mut row: Vec<u32> = weights
        .iter()
        .map(|w| ((w / total) * f64::from(PROBA_TOTAL)).floor() as u32)
        .collect();
    let assigned: u32 = row.iter().take(size - 1).sum();
    row[size - 1] = PROBA_TOTAL - assigned.min(PROBA_TOTAL);
    row
}
