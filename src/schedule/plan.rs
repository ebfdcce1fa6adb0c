//! Schedule containers.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use super::entry::BlockContraction;
use crate::layout::Dimensions;

/// Contraction plan keyed by absolute canonical result block index.
///
/// Entry lists are owned values; dropping the schedule releases all of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    blocks: BTreeMap<usize, Vec<BlockContraction>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of result blocks with at least one entry.
    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total number of entries over all result blocks.
    pub fn num_contractions(&self) -> usize {
        self.blocks.values().map(Vec::len).sum()
    }

    pub fn contains(&self, abs_index_c: usize) -> bool {
        self.blocks.contains_key(&abs_index_c)
    }

    /// Entries of a result block.
    pub fn get(&self, abs_index_c: usize) -> Option<&[BlockContraction]> {
        self.blocks.get(&abs_index_c).map(Vec::as_slice)
    }

    /// Appends an entry, creating the list of the result block on first use.
    pub fn push(&mut self, abs_index_c: usize, entry: BlockContraction) {
        self.blocks.entry(abs_index_c).or_default().push(entry);
    }

    /// Moves every entry of `other` behind the existing ones.
    pub fn append(&mut self, other: Schedule) {
        for (abs, mut list) in other.blocks {
            self.blocks.entry(abs).or_default().append(&mut list);
        }
    }

    /// Result blocks in increasing order of absolute index.
    pub fn result_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[BlockContraction])> + '_ {
        self.blocks.iter().map(|(abs, list)| (*abs, list.as_slice()))
    }
}

/// Set of canonical result blocks an operation writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentSchedule {
    block_dims: Dimensions,
    blocks: BTreeSet<usize>,
}

impl AssignmentSchedule {
    pub fn new(block_dims: Dimensions) -> Self {
        Self {
            block_dims,
            blocks: BTreeSet::new(),
        }
    }

    /// Result blocks of a contraction schedule.
    pub fn from_schedule(block_dims: Dimensions, schedule: &Schedule) -> Self {
        Self {
            block_dims,
            blocks: schedule.result_indices().collect(),
        }
    }

    #[inline]
    pub fn block_dims(&self) -> &Dimensions {
        &self.block_dims
    }

    pub fn insert(&mut self, abs_index: usize) {
        self.blocks.insert(abs_index);
    }

    pub fn contains(&self, abs_index: usize) -> bool {
        self.blocks.contains(&abs_index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.iter().copied()
    }
}
