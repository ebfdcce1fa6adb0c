//! Extents of a multi-dimensional index space.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{ContractError, ContractResult};
use crate::symmetry::SlotVec;

/// Per-slot extents with row-major (last slot fastest) absolute indexing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    dims: SlotVec<usize>,
}

impl Dimensions {
    pub fn new(dims: &[usize]) -> Self {
        Self {
            dims: SmallVec::from_slice(dims),
        }
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn get(&self, slot: usize) -> usize {
        self.dims[slot]
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.dims
    }

    /// Number of elements. An order-zero space holds one element.
    pub fn total(&self) -> usize {
        self.dims.iter().product()
    }

    /// Row-major strides.
    pub fn strides(&self) -> SlotVec<usize> {
        let mut strides: SlotVec<usize> = SmallVec::from_elem(1, self.order());
        for i in (0..self.order().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    pub fn contains(&self, index: &[usize]) -> bool {
        index.len() == self.order() && index.iter().zip(self.dims.iter()).all(|(&i, &d)| i < d)
    }

    /// Absolute index of an in-range multi-index.
    pub fn abs_index(&self, index: &[usize]) -> usize {
        debug_assert!(self.contains(index), "{:?} not in {:?}", index, self.dims);
        index
            .iter()
            .zip(self.dims.iter())
            .fold(0, |acc, (&i, &d)| acc * d + i)
    }

    /// Absolute index with bounds checking.
    pub fn try_abs_index(&self, index: &[usize]) -> ContractResult<usize> {
        if !self.contains(index) {
            return Err(ContractError::out_of_bounds(index, &self.dims));
        }
        Ok(self.abs_index(index))
    }

    /// Multi-index of an absolute index.
    pub fn index(&self, mut abs: usize) -> SlotVec<usize> {
        let mut index: SlotVec<usize> = SmallVec::from_elem(0, self.order());
        for i in (0..self.order()).rev() {
            index[i] = abs % self.dims[i];
            abs /= self.dims[i];
        }
        index
    }

    /// Advances `index` to the next multi-index in row-major order.
    /// Returns false after the last one.
    pub fn next_index(&self, index: &mut [usize]) -> bool {
        for i in (0..self.order()).rev() {
            index[i] += 1;
            if index[i] < self.dims[i] {
                return true;
            }
            index[i] = 0;
        }
        false
    }
}
