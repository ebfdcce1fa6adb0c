//! Index connectivity between two operands and their contraction result.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::validation::validate_contraction;
use crate::error::{ContractError, ContractResult};
use crate::symmetry::{Permutation, SlotVec};

const UNSET: usize = usize::MAX;

/// Reference to a slot of the result or of one of the operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRef {
    Result(usize),
    A(usize),
    B(usize),
}

/// Connectivity of a contraction `C = A * B`.
///
/// `A` has `n` free slots and `k` contracted slots, `B` has `m` free slots and
/// `k` contracted slots, and `C` has the `n + m` free slots. Slots are numbered
/// globally: result slots first, then the slots of `A`, then those of `B`. The
/// connection table stores for every slot the global slot it is joined to and
/// is symmetric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contraction {
    n: usize,
    m: usize,
    k: usize,
    conn: SmallVec<[usize; 24]>,
    num_contracted: usize,
}

impl Contraction {
    /// Creates an empty descriptor; call [`Contraction::contract`] `k` times to complete it.
    ///
    /// With `k == 0` the descriptor is complete immediately (direct product).
    pub fn new(n: usize, m: usize, k: usize) -> Self {
        let total = 2 * (n + m + k);
        let mut contr = Self {
            n,
            m,
            k,
            conn: SmallVec::from_elem(UNSET, total),
            num_contracted: 0,
        };
        if k == 0 {
            contr.connect_free_slots();
        }
        contr
    }

    /// Builds a descriptor from a raw connection table and validates it.
    pub fn from_conn(n: usize, m: usize, k: usize, conn: &[usize]) -> ContractResult<Self> {
        let contr = Self {
            n,
            m,
            k,
            conn: SmallVec::from_slice(conn),
            num_contracted: k,
        };
        validate_contraction(&contr)?;
        Ok(contr)
    }

    #[inline]
    pub fn order_a(&self) -> usize {
        self.n + self.k
    }

    #[inline]
    pub fn order_b(&self) -> usize {
        self.m + self.k
    }

    #[inline]
    pub fn order_c(&self) -> usize {
        self.n + self.m
    }

    /// Number of contracted slot pairs.
    #[inline]
    pub fn num_contracted(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.num_contracted == self.k
    }

    /// Raw connection table.
    #[inline]
    pub fn conn(&self) -> &[usize] {
        &self.conn
    }

    #[inline]
    fn offset_a(&self) -> usize {
        self.order_c()
    }

    #[inline]
    fn offset_b(&self) -> usize {
        self.order_c() + self.order_a()
    }

    /// Converts a global slot number into a slot reference.
    pub fn slot(&self, global: usize) -> SlotRef {
        if global < self.offset_a() {
            SlotRef::Result(global)
        } else if global < self.offset_b() {
            SlotRef::A(global - self.offset_a())
        } else {
            SlotRef::B(global - self.offset_b())
        }
    }

    /// Converts a slot reference into its global slot number.
    pub fn global(&self, slot: SlotRef) -> usize {
        match slot {
            SlotRef::Result(i) => i,
            SlotRef::A(i) => self.offset_a() + i,
            SlotRef::B(i) => self.offset_b() + i,
        }
    }

    /// Slot joined to slot `i` of the result.
    #[inline]
    pub fn conn_c(&self, i: usize) -> SlotRef {
        self.slot(self.conn[i])
    }

    /// Slot joined to slot `i` of `A`.
    #[inline]
    pub fn conn_a(&self, i: usize) -> SlotRef {
        self.slot(self.conn[self.offset_a() + i])
    }

    /// Slot joined to slot `i` of `B`.
    #[inline]
    pub fn conn_b(&self, i: usize) -> SlotRef {
        self.slot(self.conn[self.offset_b() + i])
    }

    /// Contracts slot `ia` of `A` with slot `ib` of `B`.
    ///
    /// Once the last pair is added, the free slots of `A` are connected to
    /// result slots `0..n` and the free slots of `B` to `n..n + m`, in order.
    pub fn contract(&mut self, ia: usize, ib: usize) -> ContractResult<()> {
        if self.is_complete() {
            return Err(ContractError::contraction(alloc::format!(
                "all {} contracted pairs are already set",
                self.k
            )));
        }
        if ia >= self.order_a() || ib >= self.order_b() {
            return Err(ContractError::contraction(alloc::format!(
                "pair ({}, {}) out of range for orders ({}, {})",
                ia,
                ib,
                self.order_a(),
                self.order_b()
            )));
        }
        let ga = self.global(SlotRef::A(ia));
        let gb = self.global(SlotRef::B(ib));
        if self.conn[ga] != UNSET || self.conn[gb] != UNSET {
            return Err(ContractError::contraction(alloc::format!(
                "slot {} of A or slot {} of B is already contracted",
                ia, ib
            )));
        }
        self.conn[ga] = gb;
        self.conn[gb] = ga;
        self.num_contracted += 1;
        if self.is_complete() {
            self.connect_free_slots();
        }
        Ok(())
    }

    fn connect_free_slots(&mut self) {
        let mut ic = 0;
        for slot in (self.offset_a()..self.offset_b()).chain(self.offset_b()..self.conn.len()) {
            if self.conn[slot] == UNSET {
                self.conn[slot] = ic;
                self.conn[ic] = slot;
                ic += 1;
            }
        }
    }

    /// Reorders the result slots: new result slot `i` is old result slot `perm[i]`.
    pub fn permute_c(&mut self, perm: &Permutation) -> ContractResult<()> {
        self.check_complete()?;
        check_order(perm, self.order_c(), "result")?;
        let old = self.conn.clone();
        for i in 0..self.order_c() {
            let operand = old[perm.source(i)];
            self.conn[i] = operand;
            self.conn[operand] = i;
        }
        Ok(())
    }

    /// Rewrites the descriptor for the unpermuted block of `A`.
    ///
    /// Contracting a block `a` with the rewritten descriptor gives the same
    /// result as contracting `a.permuted(perm)` with the original one.
    pub fn permute_a(&mut self, perm: &Permutation) -> ContractResult<()> {
        self.check_complete()?;
        check_order(perm, self.order_a(), "A")?;
        let offset = self.offset_a();
        self.permute_operand(perm, offset);
        Ok(())
    }

    /// Same as [`Contraction::permute_a`] for operand `B`.
    pub fn permute_b(&mut self, perm: &Permutation) -> ContractResult<()> {
        self.check_complete()?;
        check_order(perm, self.order_b(), "B")?;
        let offset = self.offset_b();
        self.permute_operand(perm, offset);
        Ok(())
    }

    /// Applies [`Contraction::permute_a`] and [`Contraction::permute_b`].
    pub fn permute_ab(&mut self, perm_a: &Permutation, perm_b: &Permutation) -> ContractResult<()> {
        if !perm_a.is_identity() {
            self.permute_a(perm_a)?;
        }
        if !perm_b.is_identity() {
            self.permute_b(perm_b)?;
        }
        Ok(())
    }

    fn permute_operand(&mut self, perm: &Permutation, offset: usize) {
        let old = self.conn.clone();
        for i in 0..perm.order() {
            let target = old[offset + i];
            let slot = offset + perm.source(i);
            self.conn[slot] = target;
            self.conn[target] = slot;
        }
    }

    /// Pairs `(slot of A, slot of B)` that are summed over, in `A` order.
    pub fn contracted_pairs(&self) -> SlotVec<(usize, usize)> {
        (0..self.order_a())
            .filter_map(|i| match self.conn_a(i) {
                SlotRef::B(j) => Some((i, j)),
                _ => None,
            })
            .collect()
    }

    fn check_complete(&self) -> ContractResult<()> {
        if !self.is_complete() {
            return Err(ContractError::contraction(alloc::format!(
                "only {} of {} contracted pairs are set",
                self.num_contracted,
                self.k
            )));
        }
        Ok(())
    }
}

fn check_order(perm: &Permutation, order: usize, what: &str) -> ContractResult<()> {
    if perm.order() != order {
        return Err(ContractError::permutation(alloc::format!(
            "permutation of order {} applied to {} of order {}",
            perm.order(),
            what,
            order
        )));
    }
    Ok(())
}
