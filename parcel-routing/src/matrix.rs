use crate::model::AddressId;
use anyhow::{anyhow, Result};
use ndarray::Array2;

/// Symmetric address-to-address distance table.
///
/// Defined for every pair of addresses that can appear in a route; distances
/// are non-negative and `get(a, b) == get(b, a)` always holds.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    distances: Array2<f64>,
}

impl DistanceMatrix {
    pub fn new(num_addresses: usize) -> Self {
        Self {
            distances: Array2::zeros((num_addresses, num_addresses)),
        }
    }

    /// Builds the matrix from per-address rows. Rows may be full or
    /// lower-triangular (the common spreadsheet export); missing cells are
    /// mirrored from the transposed position.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        let mut matrix = Self::new(n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() > n {
                return Err(anyhow!(
                    "distance row {} has {} entries for {} addresses",
                    i,
                    row.len(),
                    n
                ));
            }
            for (j, &d) in row.iter().enumerate() {
                if d < 0.0 {
                    return Err(anyhow!("negative distance between {} and {}", i, j));
                }
                matrix.set(i, j, d);
            }
        }
        Ok(matrix)
    }

    pub fn set(&mut self, a: AddressId, b: AddressId, distance: f64) {
        self.distances[[a, b]] = distance;
        self.distances[[b, a]] = distance;
    }

    pub fn get(&self, a: AddressId, b: AddressId) -> f64 {
        self.distances[[a, b]]
    }

    pub fn num_addresses(&self) -> usize {
        self.distances.nrows()
    }
}
