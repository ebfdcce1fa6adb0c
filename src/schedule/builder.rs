//! Construction of block contraction schedules from operand orbits.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use super::entry::BlockContraction;
use super::plan::Schedule;
use crate::contraction::{Contraction, SlotRef};
use crate::error::{ContractError, ContractResult};
use crate::layout::{BlockLayout, Dimensions};
use crate::symmetry::{Orbit, OrbitList, SlotVec, SymmetryGroup};
use crate::tensor::BlockTensorRead;

/// Schedules the contraction of one orbit of `A` with one orbit of `B`.
///
/// Every member of `orbit_a` is paired with every member of `orbit_b`. A pair
/// contributes when the block indices agree on all contracted slots and the
/// result block index it produces is canonical in `orbits_c`. Contributions to
/// the same result block with identical permutations are merged; merged
/// entries whose coefficient does not exceed `zero_threshold` in magnitude
/// are dropped.
pub fn schedule_orbit_pair(
    contr: &Contraction,
    orbit_a: &Orbit,
    dims_a: &Dimensions,
    orbit_b: &Orbit,
    dims_b: &Dimensions,
    orbits_c: &OrbitList,
    zero_threshold: f64,
) -> Schedule {
    let dims_c = orbits_c.dims();
    let conn_a: SlotVec<SlotRef> = (0..contr.order_a()).map(|i| contr.conn_a(i)).collect();
    let conn_b: SlotVec<SlotRef> = (0..contr.order_b()).map(|i| contr.conn_b(i)).collect();

    let mut local = LocalSchedule::default();
    let mut idx_c: SlotVec<usize> = SlotVec::from_elem(0, contr.order_c());

    for (abs_a, tr_a) in orbit_a.members() {
        let idx_a = dims_a.index(*abs_a);
        'pairs: for (abs_b, tr_b) in orbit_b.members() {
            let idx_b = dims_b.index(*abs_b);

            for (i, slot) in conn_a.iter().enumerate() {
                match *slot {
                    SlotRef::Result(ic) => idx_c[ic] = idx_a[i],
                    SlotRef::B(ib) => {
                        if idx_a[i] != idx_b[ib] {
                            continue 'pairs;
                        }
                    }
                    SlotRef::A(_) => continue 'pairs,
                }
            }
            for (i, slot) in conn_b.iter().enumerate() {
                if let SlotRef::Result(ic) = *slot {
                    idx_c[ic] = idx_b[i];
                }
            }

            let abs_c = dims_c.abs_index(&idx_c);
            if !orbits_c.contains(abs_c) {
                continue;
            }
            local.add(
                abs_c,
                BlockContraction::new(
                    orbit_a.abs_canonical_index(),
                    orbit_b.abs_canonical_index(),
                    tr_a.coeff * tr_b.coeff,
                    tr_a.perm.clone(),
                    tr_b.perm.clone(),
                ),
            );
        }
    }

    local.into_schedule(zero_threshold)
}

/// Contributions of one orbit pair before pruning.
#[derive(Debug, Default)]
struct LocalSchedule {
    blocks: BTreeMap<usize, Vec<BlockContraction>>,
}

impl LocalSchedule {
    /// Adds a contribution, merging it into an existing entry of the same
    /// result block that applies the same pair of permutations.
    fn add(&mut self, abs_c: usize, contribution: BlockContraction) {
        let list = self.blocks.entry(abs_c).or_default();
        match list
            .iter_mut()
            .find(|e| e.is_same_perm(&contribution.perm_a, &contribution.perm_b))
        {
            Some(entry) => entry.coeff += contribution.coeff,
            None => list.push(contribution),
        }
    }

    fn into_schedule(self, zero_threshold: f64) -> Schedule {
        let mut schedule = Schedule::new();
        for (abs_c, list) in self.blocks {
            for entry in list {
                if entry.coeff > zero_threshold || entry.coeff < -zero_threshold {
                    schedule.push(abs_c, entry);
                }
            }
        }
        schedule
    }
}

/// Builds the full schedule of `C = A * B` against the result symmetry `sym_c`.
///
/// Only allowed orbits of the operands are visited, so blocks forced to zero
/// by an operand symmetry never appear.
#[tracing::instrument(level = "debug", skip_all, fields(order_c = contr.order_c()))]
pub fn build_schedule(
    contr: &Contraction,
    a: &dyn BlockTensorRead,
    b: &dyn BlockTensorRead,
    layout_c: &BlockLayout,
    sym_c: &SymmetryGroup,
    zero_threshold: f64,
) -> ContractResult<Schedule> {
    if a.layout().order() != contr.order_a()
        || b.layout().order() != contr.order_b()
        || layout_c.order() != contr.order_c()
    {
        return Err(ContractError::layout(alloc::format!(
            "tensor orders ({}, {}, {}) do not match descriptor ({}, {}, {})",
            a.layout().order(),
            b.layout().order(),
            layout_c.order(),
            contr.order_a(),
            contr.order_b(),
            contr.order_c()
        )));
    }

    let dims_a = a.block_dims();
    let dims_b = b.block_dims();
    let dims_c = layout_c.block_dims();

    let orbits_a = OrbitList::new(a.symmetry(), &dims_a);
    let orbits_b = OrbitList::new(b.symmetry(), &dims_b);
    let orbits_c = OrbitList::new(sym_c, &dims_c);
    let orbits_b: Vec<Orbit> = orbits_b.iter().map(|abs| orbits_b.orbit(abs)).collect();

    let mut schedule = Schedule::new();
    for abs_a in orbits_a.iter() {
        let orbit_a = orbits_a.orbit(abs_a);
        for orbit_b in &orbits_b {
            let partial = schedule_orbit_pair(
                contr,
                &orbit_a,
                &dims_a,
                orbit_b,
                &dims_b,
                &orbits_c,
                zero_threshold,
            );
            schedule.append(partial);
        }
    }

    tracing::debug!(
        orbits_a = orbits_a.len(),
        orbits_b = orbits_b.len(),
        result_blocks = schedule.len(),
        contractions = schedule.num_contractions(),
        "schedule built"
    );
    Ok(schedule)
}
