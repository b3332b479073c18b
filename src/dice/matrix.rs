//! Row-major trials × dice matrix

use crate::core::error::{Result, SimError};
use crate::dice::DIE_FACES;

/// One row per trial, one column per die. Values are always in 1..=6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceMatrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl DiceMatrix {
    /// Wrap an existing buffer, checking shape and face values
    pub fn new(rows: usize, cols: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(SimError::Dice(format!(
                "buffer of {} values does not fit a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        if let Some(bad) = data.iter().find(|&&v| v == 0 || v > DIE_FACES) {
            return Err(SimError::Dice(format!("die face {} out of range", bad)));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build from explicit rows (test fixtures, scripted sequences)
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return Err(SimError::Dice("ragged dice rows".into()));
        }
        let n = rows.len();
        Self::new(n, cols, rows.into_iter().flatten().collect())
    }

    /// A matrix with no dice in it (zero rows or zero columns)
    pub fn empty(rows: usize, cols: usize) -> Self {
        debug_assert!(rows == 0 || cols == 0);
        Self {
            rows,
            cols,
            data: Vec::new(),
        }
    }

    /// Caller guarantees shape and face range
    pub(crate) fn from_raw(rows: usize, cols: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, i: usize) -> &[u8] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [u8] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterate rows; yields `rows()` empty slices for a zero-width matrix
    pub fn iter_rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let cols = self.cols;
        (0..self.rows).map(move |i| &self.data[i * cols..(i + 1) * cols])
    }

    /// Copy without the last `k` columns (saturating at zero width)
    pub fn drop_last_columns(&self, k: usize) -> Self {
        let keep = self.cols.saturating_sub(k);
        if keep == self.cols {
            return self.clone();
        }
        let data = if keep == 0 {
            Vec::new()
        } else {
            self.iter_rows()
                .flat_map(|r| r[..keep].iter().copied())
                .collect()
        };
        Self {
            rows: self.rows,
            cols: keep,
            data,
        }
    }

    /// Per-row count of dice satisfying `pred`
    pub fn count_per_row(&self, pred: impl Fn(u8) -> bool) -> Vec<u32> {
        self.iter_rows()
            .map(|r| r.iter().filter(|&&v| pred(v)).count() as u32)
            .collect()
    }
}
