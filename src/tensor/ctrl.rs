//! Access to the blocks of a block tensor.
//!
//! Operand blocks are handed out as shared `Arc`s, so any number of readers
//! may hold the same block; dropping the handle releases it. Result blocks are
//! handed out as exclusive mutable borrows.

use alloc::sync::Arc;

use super::dense::DenseBlock;
use crate::error::ContractResult;
use crate::layout::{BlockLayout, Dimensions};
use crate::symmetry::SymmetryGroup;

/// Read access to a block tensor.
pub trait BlockTensorRead {
    fn layout(&self) -> &BlockLayout;

    fn symmetry(&self) -> &SymmetryGroup;

    /// Returns true if the block at `index` holds no data.
    fn is_zero_block(&self, index: &[usize]) -> bool;

    /// Shared handle to the block at `index`; absent blocks are returned as zeros.
    fn request_block(&self, index: &[usize]) -> ContractResult<Arc<DenseBlock>>;

    /// Number of blocks along every slot.
    fn block_dims(&self) -> Dimensions {
        self.layout().block_dims()
    }
}

/// Write access to a block tensor.
pub trait BlockTensorWrite: BlockTensorRead {
    /// Exclusive handle to the block at `index`, creating zeroed storage if absent.
    fn request_block_mut(&mut self, index: &[usize]) -> ContractResult<&mut DenseBlock>;

    /// Replaces the symmetry and drops every stored block.
    fn install_symmetry(&mut self, symmetry: SymmetryGroup) -> ContractResult<()>;

    /// Multiplies every stored block by `factor`.
    fn scale_blocks(&mut self, factor: f64);
}
