//! Dense row-major blocks.

use alloc::vec::Vec;

use crate::error::{ContractError, ContractResult};
use crate::layout::Dimensions;
use crate::symmetry::{Permutation, SlotVec};

/// Dense data of one block, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseBlock {
    dims: Dimensions,
    data: Vec<f64>,
}

impl DenseBlock {
    pub fn zeros(dims: Dimensions) -> Self {
        let data = alloc::vec![0.0; dims.total()];
        Self { dims, data }
    }

    pub fn from_vec(dims: Dimensions, data: Vec<f64>) -> ContractResult<Self> {
        if data.len() != dims.total() {
            return Err(ContractError::shape(&[dims.total()], &[data.len()]));
        }
        Ok(Self { dims, data })
    }

    /// Fills a block by evaluating `f` at every multi-index.
    pub fn from_fn(dims: Dimensions, mut f: impl FnMut(&[usize]) -> f64) -> Self {
        let mut data = Vec::with_capacity(dims.total());
        if dims.total() > 0 {
            let mut idx: SlotVec<usize> = SlotVec::from_elem(0, dims.order());
            loop {
                data.push(f(&idx));
                if !dims.next_index(&mut idx) {
                    break;
                }
            }
        }
        Self { dims, data }
    }

    #[inline]
    pub fn dims(&self) -> &Dimensions {
        &self.dims
    }

    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, index: &[usize]) -> f64 {
        self.data[self.dims.abs_index(index)]
    }

    #[inline]
    pub fn set(&mut self, index: &[usize], value: f64) {
        let abs = self.dims.abs_index(index);
        self.data[abs] = value;
    }

    /// Returns the block with its slots reordered: slot `i` of the result is
    /// slot `perm[i]` of `self`.
    pub fn permuted(&self, perm: &Permutation) -> DenseBlock {
        if perm.is_identity() {
            return self.clone();
        }
        let out_dims = Dimensions::new(&perm.apply(self.dims.as_slice()));
        let out_strides = out_dims.strides();
        let mut out = alloc::vec![0.0; self.data.len()];
        if !self.data.is_empty() {
            let mut idx: SlotVec<usize> = SlotVec::from_elem(0, self.dims.order());
            let mut abs = 0;
            loop {
                let target: usize = (0..idx.len())
                    .map(|i| idx[perm.source(i)] * out_strides[i])
                    .sum();
                out[target] = self.data[abs];
                abs += 1;
                if !self.dims.next_index(&mut idx) {
                    break;
                }
            }
        }
        DenseBlock {
            dims: out_dims,
            data: out,
        }
    }

    pub fn scale(&mut self, factor: f64) {
        self.data.iter_mut().for_each(|x| *x *= factor);
    }

    /// `self += factor * other`.
    pub fn add_scaled(&mut self, other: &DenseBlock, factor: f64) -> ContractResult<()> {
        if self.dims != other.dims {
            return Err(ContractError::shape(self.dims.as_slice(), other.dims.as_slice()));
        }
        self.data
            .iter_mut()
            .zip(other.data.iter())
            .for_each(|(x, &y)| *x += factor * y);
        Ok(())
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&x| x == 0.0)
    }

    /// Largest elementwise absolute difference, or infinity for different shapes.
    pub fn max_abs_diff(&self, other: &DenseBlock) -> f64 {
        if self.dims != other.dims {
            return f64::INFINITY;
        }
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(&x, &y)| if x > y { x - y } else { y - x })
            .fold(0.0, f64::max)
    }
}
