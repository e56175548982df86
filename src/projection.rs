//! Feature projection in front of the chain ensemble.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, check_input};

/// Maps raw input vectors to the fixed-width space the chains partition.
///
/// Callers check raw inputs against [`input_dim`](Projector::input_dim)
/// before projecting, so a rejected sample never reaches `project_partial`.
pub trait Projector {
    /// Width of the raw vectors accepted.
    fn input_dim(&self) -> usize;

    /// Width of the projected vectors.
    fn output_dim(&self) -> usize;

    /// Project without touching any internal state. Used for scoring.
    fn project(&self, x: &[f64]) -> Result<Vec<f64>>;

    /// Project a sample that is being learned; may update streaming state.
    fn project_partial(&mut self, x: &[f64]) -> Result<Vec<f64>> {
        self.project(x)
    }
}

/// Passes inputs through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityProjector {
    dim: usize,
}

impl IdentityProjector {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Projector for IdentityProjector {
    fn input_dim(&self) -> usize {
        self.dim
    }

    fn output_dim(&self) -> usize {
        self.dim
    }

    fn project(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_input(x, self.dim)?;
        Ok(x.to_vec())
    }
}

/// Sparse random projection to `n_components` dimensions.
///
/// Every input feature owns a row generated from its own seeded RNG, so the
/// same `(seed, feature)` always yields the same row. Entries are
/// `±sqrt(3 / n_components)` with probability 1/6 each and zero otherwise.
#[derive(Debug, Clone)]
pub struct StreamHashProjector {
    rows: Vec<Vec<f64>>,
    n_components: usize,
}

impl StreamHashProjector {
    pub fn new(input_dim: usize, n_components: usize, seed: u64) -> Self {
        let magnitude = (3.0 / n_components as f64).sqrt();
        let rows = (0..input_dim)
            .map(|feature| {
                let mut rng = StdRng::seed_from_u64(seed ^ (feature as u64).wrapping_mul(FEATURE_MIX));
                (0..n_components)
                    .map(|_| match rng.random_range(0..6u8) {
                        0 => magnitude,
                        1 => -magnitude,
                        _ => 0.0,
                    })
                    .collect()
            })
            .collect();
        Self { rows, n_components }
    }
}

const FEATURE_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

impl Projector for StreamHashProjector {
    fn input_dim(&self) -> usize {
        self.rows.len()
    }

    fn output_dim(&self) -> usize {
        self.n_components
    }

    fn project(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_input(x, self.input_dim())?;
        let mut z = vec![0.0; self.n_components];
        for (row, &v) in self.rows.iter().zip(x) {
            if v == 0.0 {
                continue;
            }
            for (zj, &r) in z.iter_mut().zip(row) {
                *zj += v * r;
            }
        }
        Ok(z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XStreamError;

    #[test]
    fn identity_checks_width() {
        let p = IdentityProjector::new(2);
        assert_eq!(p.project(&[1.0, 2.0]), Ok(vec![1.0, 2.0]));
        assert_eq!(
            p.project(&[1.0]),
            Err(XStreamError::DimensionMismatch { expected: 2, got: 1 })
        );
    }

    #[test]
    fn streamhash_is_deterministic_per_seed() {
        let a = StreamHashProjector::new(5, 16, 3);
        let b = StreamHashProjector::new(5, 16, 3);
        let x = [0.5, -1.0, 2.0, 0.0, 3.0];
        assert_eq!(a.project(&x), b.project(&x));
        assert_eq!(a.output_dim(), 16);
    }

    #[test]
    fn streamhash_is_linear() {
        let p = StreamHashProjector::new(3, 8, 11);
        let x = p.project(&[1.0, 2.0, 3.0]).unwrap();
        let y = p.project(&[2.0, 4.0, 6.0]).unwrap();
        for (a, b) in x.iter().zip(&y) {
            assert!((2.0 * a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn streamhash_entries_take_three_values() {
        let p = StreamHashProjector::new(4, 32, 0);
        let m = (3.0f64 / 32.0).sqrt();
        for row in &p.rows {
            assert!(row.iter().all(|&r| r == 0.0 || r == m || r == -m));
        }
    }
}
