//! Labelled pairwise distance matrices.
//!
//! Storage is condensed: only the upper triangle (excluding the zero
//! diagonal) is kept, row by row.

use piqtree_core::{PiqtreeError, Result, Summarizable};
use serde::{Deserialize, Serialize};

/// A symmetric, zero-diagonal distance matrix with one label per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    names: Vec<String>,
    condensed: Vec<f64>,
}

impl DistanceMatrix {
    /// Create from a condensed upper-triangle vector.
    pub fn from_condensed(names: Vec<String>, condensed: Vec<f64>) -> Result<Self> {
        let n = names.len();
        let expected = n * n.saturating_sub(1) / 2;
        if condensed.len() != expected {
            return Err(PiqtreeError::InvalidInput(format!(
                "condensed length {} doesn't match n={} (expected {})",
                condensed.len(),
                n,
                expected
            )));
        }
        Ok(Self { names, condensed })
    }

    /// Create from a flat row-major `n * n` matrix. Only the upper triangle
    /// is read; the caller's matrix is assumed symmetric.
    pub fn from_square(names: Vec<String>, flat: &[f64]) -> Result<Self> {
        let n = names.len();
        if flat.len() != n * n {
            return Err(PiqtreeError::InvalidInput(format!(
                "expected {} distances for {} names, got {}",
                n * n,
                n,
                flat.len()
            )));
        }
        let mut condensed = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                condensed.push(flat[i * n + j]);
            }
        }
        Ok(Self { names, condensed })
    }

    /// Distance between rows `i` and `j`; 0.0 on the diagonal.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        self.condensed[self.index(a, b)]
    }

    /// Distance between two labelled rows.
    pub fn get_by_name(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.get(i, j))
    }

    /// Number of rows.
    pub fn n(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Access the raw condensed storage.
    pub fn condensed(&self) -> &[f64] {
        &self.condensed
    }

    /// The full row-major `n * n` matrix, as IQ-TREE expects it.
    pub fn to_square(&self) -> Vec<f64> {
        let n = self.n();
        let mut flat = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.get(i, j);
                flat[i * n + j] = d;
                flat[j * n + i] = d;
            }
        }
        flat
    }

    /// Map (i, j) where i < j to condensed index.
    fn index(&self, i: usize, j: usize) -> usize {
        let n = self.n();
        i * n - i * (i + 1) / 2 + (j - i - 1)
    }
}

impl Summarizable for DistanceMatrix {
    fn summary(&self) -> String {
        format!("DistanceMatrix: {}x{}", self.n(), self.n())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("s{i}")).collect()
    }

    #[test]
    fn square_to_condensed() {
        #[rustfmt::skip]
        let flat = [
            0.0, 1.0, 2.0,
            1.0, 0.0, 3.0,
            2.0, 3.0, 0.0,
        ];
        let dm = DistanceMatrix::from_square(names(3), &flat).unwrap();
        assert_eq!(dm.condensed(), &[1.0, 2.0, 3.0]);
        assert_eq!(dm.get(2, 1), 3.0);
        assert_eq!(dm.get(1, 1), 0.0);
        assert_eq!(dm.get_by_name("s0", "s2"), Some(2.0));
        assert_eq!(dm.to_square(), flat.to_vec());
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(DistanceMatrix::from_square(names(3), &[0.0; 8]).is_err());
        assert!(DistanceMatrix::from_condensed(names(4), vec![0.0; 5]).is_err());
    }

    #[test]
    fn single_and_empty() {
        let dm = DistanceMatrix::from_square(names(1), &[0.0]).unwrap();
        assert!(dm.condensed().is_empty());
        let dm = DistanceMatrix::from_condensed(Vec::new(), Vec::new()).unwrap();
        assert_eq!(dm.n(), 0);
        assert!(dm.to_square().is_empty());
    }
}
