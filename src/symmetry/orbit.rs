//! Orbits of block indices under a symmetry group.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use super::group::{SymmetryGroup, closure_is_consistent};
use super::permutation::SlotVec;
use super::transform::Transform;
use crate::layout::Dimensions;

/// Set of block indices related by symmetry.
///
/// The canonical block is the member with the smallest absolute index; every
/// member carries the transform that produces it from the canonical block.
#[derive(Debug, Clone)]
pub struct Orbit {
    canonical: usize,
    members: Vec<(usize, Transform)>,
    allowed: bool,
}

impl Orbit {
    /// Computes the orbit of `index` in block index space `dims`.
    pub fn new(group: &SymmetryGroup, dims: &Dimensions, index: &[usize]) -> Self {
        let closure = group.closure();
        Self::with_closure(&closure, dims, index)
    }

    /// Same as [`Orbit::new`] with a precomputed group closure whose first
    /// element is the identity.
    pub(crate) fn with_closure(closure: &[Transform], dims: &Dimensions, index: &[usize]) -> Self {
        let canonical = closure
            .iter()
            .map(|g| dims.abs_index(&g.perm.apply(index)))
            .min()
            .unwrap_or_else(|| dims.abs_index(index));
        let canonical_index = dims.index(canonical);

        let mut members: Vec<(usize, Transform)> = Vec::new();
        for g in closure {
            let abs = dims.abs_index(&g.perm.apply(&canonical_index));
            if !members.iter().any(|(a, _)| *a == abs) {
                members.push((abs, g.clone()));
            }
        }
        members.sort_by_key(|(abs, _)| *abs);

        Self {
            canonical,
            members,
            allowed: closure_is_consistent(closure),
        }
    }

    #[inline]
    pub fn abs_canonical_index(&self) -> usize {
        self.canonical
    }

    /// Members as `(absolute index, transform from the canonical block)`.
    #[inline]
    pub fn members(&self) -> &[(usize, Transform)] {
        &self.members
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// False if the symmetry forces every block of the orbit to zero.
    #[inline]
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Transform producing the member at `abs`, if it belongs to the orbit.
    pub fn transform(&self, abs: usize) -> Option<&Transform> {
        self.members
            .binary_search_by_key(&abs, |(a, _)| *a)
            .ok()
            .map(|pos| &self.members[pos].1)
    }
}

/// Canonical indices of all allowed orbits of a block index space.
#[derive(Debug, Clone)]
pub struct OrbitList {
    dims: Dimensions,
    closure: Vec<Transform>,
    canonical: BTreeSet<usize>,
}

impl OrbitList {
    pub fn new(group: &SymmetryGroup, dims: &Dimensions) -> Self {
        let closure = group.closure();
        let mut canonical = BTreeSet::new();
        if closure_is_consistent(&closure) {
            for abs in 0..dims.total() {
                let index = dims.index(abs);
                let is_min = closure
                    .iter()
                    .all(|g| dims.abs_index(&g.perm.apply(&index)) >= abs);
                if is_min {
                    canonical.insert(abs);
                }
            }
        }
        Self {
            dims: dims.clone(),
            closure,
            canonical,
        }
    }

    #[inline]
    pub fn dims(&self) -> &Dimensions {
        &self.dims
    }

    #[inline]
    pub fn contains(&self, abs: usize) -> bool {
        self.canonical.contains(&abs)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Canonical absolute indices in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.canonical.iter().copied()
    }

    pub fn index(&self, abs: usize) -> SlotVec<usize> {
        self.dims.index(abs)
    }

    /// Orbit of the block at absolute index `abs`.
    pub fn orbit(&self, abs: usize) -> Orbit {
        Orbit::with_closure(&self.closure, &self.dims, &self.dims.index(abs))
    }
}
