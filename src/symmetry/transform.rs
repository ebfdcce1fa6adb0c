//! Block transformations: a permutation together with a scalar coefficient.

use serde::{Deserialize, Serialize};

use super::permutation::Permutation;

/// Maps a canonical block onto another block of its orbit.
///
/// The target block index is `perm.apply(index)` and the target data is
/// `coeff * data.permuted(perm)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub perm: Permutation,
    pub coeff: f64,
}

/// A generator of a symmetry group has the same shape as a transform.
pub type SymmetryElement = Transform;

impl Transform {
    pub fn new(perm: Permutation, coeff: f64) -> Self {
        Self { perm, coeff }
    }

    pub fn identity(order: usize) -> Self {
        Self::new(Permutation::identity(order), 1.0)
    }

    /// Symmetric (`+1`) permutation of two slots.
    pub fn symmetric(perm: Permutation) -> Self {
        Self::new(perm, 1.0)
    }

    /// Antisymmetric (`-1`) permutation of two slots.
    pub fn antisymmetric(perm: Permutation) -> Self {
        Self::new(perm, -1.0)
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.perm.order()
    }

    pub fn is_identity(&self) -> bool {
        self.perm.is_identity() && self.coeff == 1.0
    }

    /// Applies `self` first and `next` second.
    pub fn then(&self, next: &Transform) -> Transform {
        Transform::new(self.perm.then(&next.perm), self.coeff * next.coeff)
    }
}
