//! Permutations of tensor slots.

use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{ContractError, ContractResult};

/// Inline storage for per-slot sequences; tensors of order up to eight never allocate.
pub type SlotVec<T> = SmallVec<[T; 8]>;

/// A permutation of `order` slots.
///
/// Applying a permutation to a sequence produces `out[i] = seq[map[i]]`, so
/// slot `i` of the result is slot `map[i]` of the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permutation {
    map: SlotVec<usize>,
}

impl Permutation {
    /// Identity permutation of the given order.
    pub fn identity(order: usize) -> Self {
        Self {
            map: (0..order).collect(),
        }
    }

    /// Builds a permutation from its map, checking that it is a bijection.
    pub fn from_map(map: &[usize]) -> ContractResult<Self> {
        let mut seen: SlotVec<bool> = SmallVec::from_elem(false, map.len());
        for &p in map {
            if p >= map.len() {
                return Err(ContractError::permutation(alloc::format!(
                    "entry {} out of range for order {}",
                    p,
                    map.len()
                )));
            }
            if seen[p] {
                return Err(ContractError::permutation(alloc::format!(
                    "entry {} appears twice in {:?}",
                    p, map
                )));
            }
            seen[p] = true;
        }
        Ok(Self { map: map.iter().copied().collect() })
    }

    /// Wraps a map that is known to be a bijection.
    pub(crate) fn from_validated(map: SlotVec<usize>) -> Self {
        debug_assert!(Self::from_map(&map).is_ok());
        Self { map }
    }

    /// Transposition of slots `i` and `j`.
    pub fn swap(order: usize, i: usize, j: usize) -> ContractResult<Self> {
        if i >= order || j >= order {
            return Err(ContractError::permutation(alloc::format!(
                "cannot swap slots {} and {} of order {}",
                i, j, order
            )));
        }
        let mut perm = Self::identity(order);
        perm.map.swap(i, j);
        Ok(perm)
    }

    /// Cyclic shift of all slots by one: `out[i] = seq[(i + 1) % order]`.
    pub fn cycle(order: usize) -> Self {
        Self {
            map: (0..order).map(|i| (i + 1) % order.max(1)).collect(),
        }
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn map(&self) -> &[usize] {
        &self.map
    }

    /// Source slot of output slot `i`.
    #[inline]
    pub fn source(&self, i: usize) -> usize {
        self.map[i]
    }

    pub fn is_identity(&self) -> bool {
        self.map.iter().enumerate().all(|(i, &p)| i == p)
    }

    /// Permutes a sequence.
    pub fn apply<T: Copy>(&self, seq: &[T]) -> SlotVec<T> {
        debug_assert_eq!(seq.len(), self.order());
        self.map.iter().map(|&p| seq[p]).collect()
    }

    /// Applies `self` first and `next` second.
    pub fn then(&self, next: &Permutation) -> Permutation {
        debug_assert_eq!(self.order(), next.order());
        Self {
            map: next.map.iter().map(|&p| self.map[p]).collect(),
        }
    }

    pub fn inverse(&self) -> Permutation {
        let mut map: SlotVec<usize> = SmallVec::from_elem(0, self.order());
        for (i, &p) in self.map.iter().enumerate() {
            map[p] = i;
        }
        Self { map }
    }

    /// Returns true if every slot outside `mask` is mapped onto itself.
    pub fn fixes_unmasked(&self, mask: &[bool]) -> bool {
        self.map
            .iter()
            .enumerate()
            .all(|(i, &p)| mask[i] || i == p)
    }

    /// Returns true if slots in `mask` are only permuted among themselves.
    pub fn preserves_mask(&self, mask: &[bool]) -> bool {
        self.map.iter().enumerate().all(|(i, &p)| mask[i] == mask[p])
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.map.to_vec()
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, p) in self.map.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, "]")
    }
}
