//! Block index spaces: extents, split points and slot types.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::dimensions::Dimensions;
use crate::error::{ContractError, ContractResult};
use crate::symmetry::SlotVec;

/// Partition of every slot of a tensor into contiguous blocks.
///
/// Slots belong to types; all slots of a type share their extent and their
/// split points. Types are numbered in order of first appearance, so two
/// layouts compare equal exactly when they describe the same partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockLayout {
    dims: Dimensions,
    types: SlotVec<usize>,
    splits: Vec<Vec<usize>>,
}

impl BlockLayout {
    /// Creates an unsplit layout. Slots with equal extent share a type.
    pub fn new(dims: Dimensions) -> Self {
        let mut types: SlotVec<usize> = SmallVec::with_capacity(dims.order());
        let mut extents: SlotVec<usize> = SmallVec::new();
        for &d in dims.as_slice() {
            match extents.iter().position(|&e| e == d) {
                Some(t) => types.push(t),
                None => {
                    types.push(extents.len());
                    extents.push(d);
                }
            }
        }
        let splits = alloc::vec![Vec::new(); extents.len()];
        Self { dims, types, splits }
    }

    /// Creates a layout whose slots all share one extent and one set of split points.
    pub fn uniform(order: usize, extent: usize, points: &[usize]) -> ContractResult<Self> {
        let dims = Dimensions::new(&alloc::vec![extent; order]);
        let mut layout = Self::new(dims);
        layout.split_all(&alloc::vec![true; order], points)?;
        Ok(layout)
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.dims.order()
    }

    /// Total extents of the tensor.
    #[inline]
    pub fn dims(&self) -> &Dimensions {
        &self.dims
    }

    #[inline]
    pub fn get_type(&self, slot: usize) -> usize {
        self.types[slot]
    }

    #[inline]
    pub fn num_types(&self) -> usize {
        self.splits.len()
    }

    #[inline]
    pub fn get_splits(&self, ty: usize) -> &[usize] {
        &self.splits[ty]
    }

    /// Split points of the type of `slot`.
    #[inline]
    pub fn splits_of(&self, slot: usize) -> &[usize] {
        &self.splits[self.types[slot]]
    }

    /// Adds a split point to the slots selected by `mask`.
    ///
    /// Selected slots must share an extent. Selected slots leave their old
    /// type; unselected slots keep it.
    pub fn split(&mut self, mask: &[bool], point: usize) -> ContractResult<()> {
        if mask.len() != self.order() {
            return Err(ContractError::layout(alloc::format!(
                "split mask of length {} for layout of order {}",
                mask.len(),
                self.order()
            )));
        }
        let Some(first) = mask.iter().position(|&m| m) else {
            return Ok(());
        };
        let extent = self.dims.get(first);
        if let Some(slot) = (0..self.order()).find(|&i| mask[i] && self.dims.get(i) != extent) {
            return Err(ContractError::layout(alloc::format!(
                "cannot split slots {} and {} together: extents {} and {}",
                first,
                slot,
                extent,
                self.dims.get(slot)
            )));
        }
        if point == 0 || point >= extent {
            return Err(ContractError::layout(alloc::format!(
                "split point {} outside (0, {})",
                point, extent
            )));
        }

        let mut keys: Vec<(usize, bool)> = Vec::new();
        let mut types: SlotVec<usize> = SmallVec::with_capacity(self.order());
        let mut splits: Vec<Vec<usize>> = Vec::new();
        for (slot, &masked) in mask.iter().enumerate() {
            let key = (self.types[slot], masked);
            let ty = match keys.iter().position(|k| *k == key) {
                Some(ty) => ty,
                None => {
                    let mut pts = self.splits[key.0].clone();
                    if masked {
                        if let Err(pos) = pts.binary_search(&point) {
                            pts.insert(pos, point);
                        }
                    }
                    keys.push(key);
                    splits.push(pts);
                    keys.len() - 1
                }
            };
            types.push(ty);
        }
        self.types = types;
        self.splits = splits;
        Ok(())
    }

    /// Applies [`BlockLayout::split`] for every point in turn.
    pub fn split_all(&mut self, mask: &[bool], points: &[usize]) -> ContractResult<()> {
        for &point in points {
            self.split(mask, point)?;
        }
        Ok(())
    }

    /// Merges types that have the same extent and the same split points.
    pub fn match_splits(&mut self) {
        let mut types: SlotVec<usize> = SmallVec::with_capacity(self.order());
        let mut keys: Vec<(usize, Vec<usize>)> = Vec::new();
        for slot in 0..self.order() {
            let key = (self.dims.get(slot), self.splits_of(slot).to_vec());
            let ty = match keys.iter().position(|k| *k == key) {
                Some(ty) => ty,
                None => {
                    keys.push(key);
                    keys.len() - 1
                }
            };
            types.push(ty);
        }
        self.types = types;
        self.splits = keys.into_iter().map(|(_, pts)| pts).collect();
    }

    /// Returns true if both layouts cut the same extents at the same points,
    /// regardless of how slots are grouped into types.
    pub fn matches(&self, other: &BlockLayout) -> bool {
        if self.dims != other.dims {
            return false;
        }
        let mut lhs = self.clone();
        let mut rhs = other.clone();
        lhs.match_splits();
        rhs.match_splits();
        lhs == rhs
    }

    /// Number of blocks along every slot.
    pub fn block_dims(&self) -> Dimensions {
        let counts: SlotVec<usize> = (0..self.order())
            .map(|slot| self.splits_of(slot).len() + 1)
            .collect();
        Dimensions::new(&counts)
    }

    /// Start and extent of block `block` along `slot`.
    pub fn block_range(&self, slot: usize, block: usize) -> (usize, usize) {
        let pts = self.splits_of(slot);
        let start = if block == 0 { 0 } else { pts[block - 1] };
        let end = pts.get(block).copied().unwrap_or(self.dims.get(slot));
        (start, end - start)
    }

    /// Extents of the block at a block multi-index.
    pub fn block_shape(&self, index: &[usize]) -> Dimensions {
        let shape: SlotVec<usize> = index
            .iter()
            .enumerate()
            .map(|(slot, &b)| self.block_range(slot, b).1)
            .collect();
        Dimensions::new(&shape)
    }

    /// Offset of the first element of a block within the full tensor.
    pub fn block_offset(&self, index: &[usize]) -> SlotVec<usize> {
        index
            .iter()
            .enumerate()
            .map(|(slot, &b)| self.block_range(slot, b).0)
            .collect()
    }

    /// Block containing element position `pos` along `slot`, with the
    /// position inside that block.
    pub fn locate(&self, slot: usize, pos: usize) -> (usize, usize) {
        let pts = self.splits_of(slot);
        let block = pts.partition_point(|&p| p <= pos);
        let start = if block == 0 { 0 } else { pts[block - 1] };
        (block, pos - start)
    }
}
