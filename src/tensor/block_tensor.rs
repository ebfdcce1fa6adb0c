//! In-memory block tensor storing canonical blocks only.

use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashMap;

use super::ctrl::{BlockTensorRead, BlockTensorWrite};
use super::dense::DenseBlock;
use crate::error::{ContractError, ContractResult};
use crate::layout::{BlockLayout, Dimensions};
use crate::symmetry::{OrbitList, SlotVec, SymmetryGroup};

/// Block tensor backed by a hash map of canonical blocks.
///
/// A block that has never been written is a zero block.
#[derive(Debug, Clone)]
pub struct BlockTensor {
    layout: BlockLayout,
    block_dims: Dimensions,
    symmetry: SymmetryGroup,
    blocks: HashMap<usize, Arc<DenseBlock>>,
}

impl BlockTensor {
    /// Creates an empty tensor without symmetry.
    pub fn new(layout: BlockLayout) -> Self {
        let block_dims = layout.block_dims();
        let symmetry = SymmetryGroup::new(layout.order());
        Self {
            layout,
            block_dims,
            symmetry,
            blocks: HashMap::new(),
        }
    }

    /// Creates an empty tensor with the given symmetry.
    pub fn with_symmetry(layout: BlockLayout, symmetry: SymmetryGroup) -> ContractResult<Self> {
        symmetry.check_layout(&layout)?;
        let mut tensor = Self::new(layout);
        tensor.symmetry = symmetry;
        Ok(tensor)
    }

    /// Imports the canonical blocks of a full dense tensor.
    ///
    /// The data is assumed to obey `symmetry`; blocks that are entirely zero
    /// are not stored.
    pub fn from_dense(
        layout: BlockLayout,
        symmetry: SymmetryGroup,
        dense: &DenseBlock,
    ) -> ContractResult<Self> {
        if dense.dims() != layout.dims() {
            return Err(ContractError::shape(layout.dims().as_slice(), dense.dims().as_slice()));
        }
        let mut tensor = Self::with_symmetry(layout, symmetry)?;
        let orbits = OrbitList::new(&tensor.symmetry, &tensor.block_dims);
        for abs in orbits.iter() {
            let index = orbits.index(abs);
            let shape = tensor.layout.block_shape(&index);
            let offset = tensor.layout.block_offset(&index);
            let block = DenseBlock::from_fn(shape, |i| {
                let pos: SlotVec<usize> = i.iter().zip(offset.iter()).map(|(a, b)| a + b).collect();
                dense.get(&pos)
            });
            if !block.is_zero() {
                tensor.blocks.insert(abs, Arc::new(block));
            }
        }
        Ok(tensor)
    }

    /// Expands the stored canonical blocks through their orbits into a full
    /// dense tensor.
    pub fn to_dense(&self) -> DenseBlock {
        let mut dense = DenseBlock::zeros(self.layout.dims().clone());
        let orbits = OrbitList::new(&self.symmetry, &self.block_dims);
        for (&abs, block) in &self.blocks {
            if !orbits.contains(abs) {
                continue;
            }
            for (member, tr) in orbits.orbit(abs).members() {
                let index = self.block_dims.index(*member);
                let offset = self.layout.block_offset(&index);
                let mut data = block.permuted(&tr.perm);
                data.scale(tr.coeff);
                write_block(&mut dense, &data, &offset);
            }
        }
        dense
    }

    #[inline]
    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    #[inline]
    pub fn symmetry(&self) -> &SymmetryGroup {
        &self.symmetry
    }

    /// Number of blocks along every slot.
    #[inline]
    pub fn block_dims(&self) -> &Dimensions {
        &self.block_dims
    }

    /// Number of stored (non-zero) blocks.
    #[inline]
    pub fn num_stored_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Absolute indices of the stored blocks in increasing order.
    pub fn stored_blocks(&self) -> Vec<usize> {
        let mut stored: Vec<usize> = self.blocks.keys().copied().collect();
        stored.sort_unstable();
        stored
    }

    /// Stored block at `index`, if any.
    pub fn block(&self, index: &[usize]) -> Option<&DenseBlock> {
        let abs = self.block_dims.try_abs_index(index).ok()?;
        self.blocks.get(&abs).map(|b| b.as_ref())
    }

    /// Stores the data of a canonical block.
    pub fn set_block(&mut self, index: &[usize], block: DenseBlock) -> ContractResult<()> {
        let abs = self.block_dims.try_abs_index(index)?;
        let expected = self.layout.block_shape(index);
        if block.dims() != &expected {
            return Err(ContractError::shape(expected.as_slice(), block.dims().as_slice()));
        }
        let orbits = OrbitList::new(&self.symmetry, &self.block_dims);
        if !orbits.contains(abs) {
            return Err(ContractError::symmetry(alloc::format!(
                "block {:?} is not the canonical block of its orbit",
                index
            )));
        }
        self.blocks.insert(abs, Arc::new(block));
        Ok(())
    }

    /// Turns the block at `index` into a zero block.
    pub fn remove_block(&mut self, index: &[usize]) -> ContractResult<()> {
        let abs = self.block_dims.try_abs_index(index)?;
        self.blocks.remove(&abs);
        Ok(())
    }
}

fn write_block(dense: &mut DenseBlock, block: &DenseBlock, offset: &[usize]) {
    if block.dims().total() == 0 {
        return;
    }
    let mut idx: SlotVec<usize> = SlotVec::from_elem(0, block.dims().order());
    loop {
        let pos: SlotVec<usize> = idx.iter().zip(offset.iter()).map(|(a, b)| a + b).collect();
        dense.set(&pos, block.get(&idx));
        if !block.dims().next_index(&mut idx) {
            break;
        }
    }
}

impl BlockTensorRead for BlockTensor {
    fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    fn symmetry(&self) -> &SymmetryGroup {
        &self.symmetry
    }

    fn is_zero_block(&self, index: &[usize]) -> bool {
        match self.block_dims.try_abs_index(index) {
            Ok(abs) => !self.blocks.contains_key(&abs),
            Err(_) => true,
        }
    }

    fn request_block(&self, index: &[usize]) -> ContractResult<Arc<DenseBlock>> {
        let abs = self.block_dims.try_abs_index(index)?;
        Ok(match self.blocks.get(&abs) {
            Some(block) => Arc::clone(block),
            None => Arc::new(DenseBlock::zeros(self.layout.block_shape(index))),
        })
    }

    fn block_dims(&self) -> Dimensions {
        self.block_dims.clone()
    }
}

impl BlockTensorWrite for BlockTensor {
    fn request_block_mut(&mut self, index: &[usize]) -> ContractResult<&mut DenseBlock> {
        let abs = self.block_dims.try_abs_index(index)?;
        let layout = &self.layout;
        let block = self
            .blocks
            .entry(abs)
            .or_insert_with(|| Arc::new(DenseBlock::zeros(layout.block_shape(index))));
        Ok(Arc::make_mut(block))
    }

    fn install_symmetry(&mut self, symmetry: SymmetryGroup) -> ContractResult<()> {
        symmetry.check_layout(&self.layout)?;
        self.blocks.clear();
        self.symmetry = symmetry;
        Ok(())
    }

    fn scale_blocks(&mut self, factor: f64) {
        for block in self.blocks.values_mut() {
            Arc::make_mut(block).scale(factor);
        }
    }
}
