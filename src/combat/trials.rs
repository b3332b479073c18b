//! Trial vectors: parallel per-trial counters and mask operations
//!
//! Every stage works on whole batches. A `Mask` selects trials, and the
//! `*_where` helpers apply an update to the selected ones without branching.

use serde::{Deserialize, Serialize};

/// Per-trial selection
pub type Mask = Vec<bool>;

/// Crit / success / fail counters for one side, one entry per trial
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitCounts {
    pub crit: Vec<u32>,
    pub success: Vec<u32>,
    pub fail: Vec<u32>,
}

impl HitCounts {
    pub fn zeros(trials: usize) -> Self {
        Self {
            crit: vec![0; trials],
            success: vec![0; trials],
            fail: vec![0; trials],
        }
    }

    /// crit + success + fail for one trial
    pub fn total(&self, trial: usize) -> u32 {
        self.crit[trial] + self.success[trial] + self.fail[trial]
    }

    /// crit + success summed over the whole batch
    pub fn remaining_hits(&self) -> u64 {
        sum(&self.crit) + sum(&self.success)
    }

    /// Counters of a single trial as (crit, success, fail)
    pub fn trial(&self, trial: usize) -> (u32, u32, u32) {
        (self.crit[trial], self.success[trial], self.fail[trial])
    }
}

/// Mask of trials whose value satisfies `pred`
pub fn mask_of(values: &[u32], pred: impl Fn(u32) -> bool) -> Mask {
    values.iter().map(|&v| pred(v)).collect()
}

pub fn add_where(values: &mut [u32], mask: &[bool], amount: u32) {
    debug_assert_eq!(values.len(), mask.len());
    for (v, &m) in values.iter_mut().zip(mask) {
        *v += amount * m as u32;
    }
}

/// Caller guarantees every selected value is at least `amount`
pub fn sub_where(values: &mut [u32], mask: &[bool], amount: u32) {
    debug_assert_eq!(values.len(), mask.len());
    for (v, &m) in values.iter_mut().zip(mask) {
        *v -= amount * m as u32;
    }
}

/// Move one unit from `from` to `to` on every selected trial
pub fn shift_where(from: &mut [u32], to: &mut [u32], mask: &[bool]) {
    sub_where(from, mask, 1);
    add_where(to, mask, 1);
}

pub fn any_positive(values: &[u32]) -> bool {
    values.iter().any(|&v| v > 0)
}

pub fn sum(values: &[u32]) -> u64 {
    values.iter().map(|&v| v as u64).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_updates() {
        let mut v = vec![1, 2, 3];
        let mask = mask_of(&v, |x| x >= 2);
        assert_eq!(mask, vec![false, true, true]);

        sub_where(&mut v, &mask, 2);
        assert_eq!(v, vec![1, 0, 1]);

        add_where(&mut v, &mask, 5);
        assert_eq!(v, vec![1, 5, 6]);
    }

    #[test]
    fn test_shift_where_conserves_total() {
        let mut a = vec![2, 1, 0];
        let mut b = vec![0, 0, 4];
        shift_where(&mut a, &mut b, &[true, true, false]);
        assert_eq!(a, vec![1, 0, 0]);
        assert_eq!(b, vec![1, 1, 4]);
    }

    #[test]
    fn test_counts_helpers() {
        let counts = HitCounts {
            crit: vec![1, 0],
            success: vec![1, 2],
            fail: vec![2, 2],
        };
        assert_eq!(counts.total(0), 4);
        assert_eq!(counts.remaining_hits(), 4);
        assert_eq!(counts.trial(1), (0, 2, 2));
        assert!(any_positive(&counts.crit));
        assert!(!any_positive(&[0, 0]));
    }
}
