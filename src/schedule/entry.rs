//! Single scheduled block contraction.

use serde::{Deserialize, Serialize};

use crate::symmetry::Permutation;

/// Contribution of one pair of canonical operand blocks to a result block.
///
/// The canonical block of `A` is permuted by `perm_a`, the canonical block of
/// `B` by `perm_b`, and their contraction is accumulated with `coeff`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockContraction {
    pub abs_index_a: usize,
    pub abs_index_b: usize,
    pub coeff: f64,
    pub perm_a: Permutation,
    pub perm_b: Permutation,
}

impl BlockContraction {
    pub fn new(
        abs_index_a: usize,
        abs_index_b: usize,
        coeff: f64,
        perm_a: Permutation,
        perm_b: Permutation,
    ) -> Self {
        Self {
            abs_index_a,
            abs_index_b,
            coeff,
            perm_a,
            perm_b,
        }
    }

    /// Returns true if the entry applies exactly these two permutations.
    ///
    /// Entries for the same result block that pass this test are merged by
    /// adding their coefficients.
    #[inline]
    pub fn is_same_perm(&self, perm_a: &Permutation, perm_b: &Permutation) -> bool {
        self.perm_a == *perm_a && self.perm_b == *perm_b
    }
}
