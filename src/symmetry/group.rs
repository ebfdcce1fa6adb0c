//! Permutational symmetry groups of block tensors.

use alloc::vec::Vec;

use super::permutation::{Permutation, SlotVec};
use super::transform::{SymmetryElement, Transform};
use crate::error::{ContractError, ContractResult};
use crate::layout::BlockLayout;

/// A set of generators acting on the slots of a tensor of fixed order.
///
/// Each generator is a slot permutation with coefficient `+1` (symmetric) or
/// `-1` (antisymmetric). The group itself is the closure of the generators;
/// redundant generators are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryGroup {
    order: usize,
    elements: Vec<SymmetryElement>,
}

impl SymmetryGroup {
    /// Creates the trivial group for a tensor of the given order.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            elements: Vec::new(),
        }
    }

    /// Creates a group from a list of generators.
    pub fn from_elements(
        order: usize,
        elements: impl IntoIterator<Item = SymmetryElement>,
    ) -> ContractResult<Self> {
        let mut group = Self::new(order);
        for elem in elements {
            group.add_element(elem)?;
        }
        Ok(group)
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn elements(&self) -> &[SymmetryElement] {
        &self.elements
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Adds a generator. Identities and exact duplicates are dropped.
    pub fn add_element(&mut self, elem: SymmetryElement) -> ContractResult<()> {
        if elem.order() != self.order {
            return Err(ContractError::symmetry(alloc::format!(
                "element of order {} added to group of order {}",
                elem.order(),
                self.order
            )));
        }
        if elem.coeff != 1.0 && elem.coeff != -1.0 {
            return Err(ContractError::symmetry(alloc::format!(
                "coefficient {} is not +1 or -1",
                elem.coeff
            )));
        }
        if elem.perm.is_identity() {
            if elem.coeff != 1.0 {
                return Err(ContractError::symmetry(
                    "identity permutation with coefficient -1",
                ));
            }
            return Ok(());
        }
        if !self.elements.contains(&elem) {
            self.elements.push(elem);
        }
        Ok(())
    }

    /// Enumerates every element of the generated group, identity first.
    ///
    /// A permutation reachable with both signs appears twice; see
    /// [`SymmetryGroup::is_consistent`].
    pub fn closure(&self) -> Vec<Transform> {
        let mut all = alloc::vec![Transform::identity(self.order)];
        let mut next = 0;
        while next < all.len() {
            let current = all[next].clone();
            for elem in &self.elements {
                let candidate = current.then(elem);
                if !all.contains(&candidate) {
                    all.push(candidate);
                }
            }
            next += 1;
        }
        all
    }

    /// Returns false if some permutation is generated with two different
    /// coefficients. Every block of such a tensor is forced to zero.
    pub fn is_consistent(&self) -> bool {
        closure_is_consistent(&self.closure())
    }

    /// Checks that every generator only exchanges slots with identical
    /// extents and split points.
    pub fn check_layout(&self, layout: &BlockLayout) -> ContractResult<()> {
        if layout.order() != self.order {
            return Err(ContractError::symmetry(alloc::format!(
                "group of order {} used with layout of order {}",
                self.order,
                layout.order()
            )));
        }
        for elem in &self.elements {
            for (i, &p) in elem.perm.map().iter().enumerate() {
                if layout.dims().get(i) != layout.dims().get(p)
                    || layout.splits_of(i) != layout.splits_of(p)
                {
                    return Err(ContractError::symmetry(alloc::format!(
                        "element {} exchanges slots {} and {} with different block structure",
                        elem.perm, i, p
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns true if both groups generate the same set of elements.
    pub fn equivalent(&self, other: &SymmetryGroup) -> bool {
        if self.order != other.order {
            return false;
        }
        let lhs = self.closure();
        let rhs = other.closure();
        lhs.len() == rhs.len() && lhs.iter().all(|e| rhs.contains(e))
    }

    /// Returns true if every element generated by `self` is also generated by `other`.
    pub fn is_subgroup_of(&self, other: &SymmetryGroup) -> bool {
        if self.order != other.order {
            return false;
        }
        let theirs = other.closure();
        self.elements.iter().all(|e| theirs.contains(e))
    }

    /// Restricts an element to the slots selected by `mask`.
    ///
    /// The element survives only if it leaves every unselected slot in place;
    /// otherwise the identity of the reduced order is returned.
    pub fn project_down(elem: &SymmetryElement, mask: &[bool]) -> SymmetryElement {
        let slots: SlotVec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
            .collect();
        if !elem.perm.fixes_unmasked(mask) {
            return Transform::identity(slots.len());
        }
        let reduced: SlotVec<usize> = slots
            .iter()
            .map(|&s| {
                let target = elem.perm.source(s);
                slots
                    .iter()
                    .position(|&t| t == target)
                    .unwrap_or_default()
            })
            .collect();
        Transform::new(Permutation::from_validated(reduced), elem.coeff)
    }

    /// Lifts an element of reduced order into a group of order `order`,
    /// placing reduced slot `j` at slot `slot_map[j]`.
    pub fn project_up(
        elem: &SymmetryElement,
        slot_map: &[usize],
        order: usize,
    ) -> ContractResult<SymmetryElement> {
        if slot_map.len() != elem.order() {
            return Err(ContractError::symmetry(alloc::format!(
                "slot map of length {} for element of order {}",
                slot_map.len(),
                elem.order()
            )));
        }
        let mut lifted: SlotVec<usize> = (0..order).collect();
        for (j, &slot) in slot_map.iter().enumerate() {
            if slot >= order {
                return Err(ContractError::symmetry(alloc::format!(
                    "slot {} out of range for order {}",
                    slot, order
                )));
            }
            lifted[slot] = slot_map[elem.perm.source(j)];
        }
        Ok(Transform::new(Permutation::from_map(&lifted)?, elem.coeff))
    }

    /// Symmetry of the direct sum of two tensors over disjoint slot sets.
    ///
    /// An element `x ⊕ y` belongs to the result when `x` and `y` carry the same
    /// coefficient.
    pub fn direct_sum(a: &SymmetryGroup, b: &SymmetryGroup) -> SymmetryGroup {
        let order = a.order + b.order;
        let mut result = SymmetryGroup::new(order);
        let closure_b = b.closure();
        for x in a.closure() {
            for y in closure_b.iter().filter(|y| y.coeff == x.coeff) {
                let map: SlotVec<usize> = x
                    .perm
                    .map()
                    .iter()
                    .copied()
                    .chain(y.perm.map().iter().map(|&p| p + a.order))
                    .collect();
                let elem = Transform::new(Permutation::from_validated(map), x.coeff);
                if !elem.perm.is_identity() && !result.elements.contains(&elem) {
                    result.elements.push(elem);
                }
            }
        }
        result
    }

    /// Collapses slots that share a target in `seq` into a single slot.
    ///
    /// Slot `i` becomes slot `seq[i]` of a group of order `order`. Only
    /// elements that move all slots of a merged group together survive.
    pub fn merge(&self, seq: &[usize], order: usize) -> ContractResult<SymmetryGroup> {
        if seq.len() != self.order || seq.iter().any(|&s| s >= order) {
            return Err(ContractError::symmetry(alloc::format!(
                "merge sequence {:?} does not map order {} onto order {}",
                seq, self.order, order
            )));
        }
        let mut result = SymmetryGroup::new(order);
        for elem in self.closure() {
            let mut merged: SlotVec<Option<usize>> = SlotVec::from_elem(None, order);
            let consistent = (0..self.order).all(|i| {
                let target = seq[elem.perm.source(i)];
                match merged[seq[i]] {
                    Some(existing) => existing == target,
                    None => {
                        merged[seq[i]] = Some(target);
                        true
                    }
                }
            });
            if !consistent {
                continue;
            }
            let map: SlotVec<usize> = merged
                .iter()
                .enumerate()
                .map(|(i, m)| m.unwrap_or(i))
                .collect();
            let Ok(perm) = Permutation::from_map(&map) else {
                continue;
            };
            if perm.is_identity() {
                continue;
            }
            let reduced = Transform::new(perm, elem.coeff);
            if !result.elements.contains(&reduced) {
                result.elements.push(reduced);
            }
        }
        Ok(result)
    }

    /// Elements common to both groups, computed as a direct sum followed by
    /// merging each slot with its copy.
    pub fn intersection(a: &SymmetryGroup, b: &SymmetryGroup) -> ContractResult<SymmetryGroup> {
        if a.order != b.order {
            return Err(ContractError::symmetry(alloc::format!(
                "cannot intersect groups of order {} and {}",
                a.order, b.order
            )));
        }
        let seq: SlotVec<usize> = (0..a.order).chain(0..a.order).collect();
        SymmetryGroup::direct_sum(a, b).merge(&seq, a.order)
    }
}

pub(crate) fn closure_is_consistent(closure: &[Transform]) -> bool {
    closure.iter().enumerate().all(|(i, x)| {
        closure[i + 1..]
            .iter()
            .all(|y| x.perm != y.perm || x.coeff == y.coeff)
    })
}
