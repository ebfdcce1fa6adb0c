//! Block layout of the contraction result.

use alloc::vec;

use crate::contraction::{Contraction, SlotRef};
use crate::error::{ContractError, ContractResult};
use crate::layout::{BlockLayout, Dimensions};
use crate::symmetry::SlotVec;

/// Derives the block layout of `C = A * B`.
///
/// Every contracted pair must have the same extent and split points on both
/// sides, otherwise a `LayoutMismatch` is returned. Result slots take their
/// extent from the operand slot they are connected to. Split points are
/// copied per operand slot type, so result slots that share a type in an
/// operand also share it in the result.
pub fn build_result_layout(
    contr: &Contraction,
    layout_a: &BlockLayout,
    layout_b: &BlockLayout,
) -> ContractResult<BlockLayout> {
    if !contr.is_complete() {
        return Err(ContractError::contraction("descriptor is incomplete"));
    }
    if layout_a.order() != contr.order_a() || layout_b.order() != contr.order_b() {
        return Err(ContractError::layout(alloc::format!(
            "operand orders ({}, {}) do not match descriptor ({}, {})",
            layout_a.order(),
            layout_b.order(),
            contr.order_a(),
            contr.order_b()
        )));
    }

    for (ia, ib) in contr.contracted_pairs() {
        if layout_a.dims().get(ia) != layout_b.dims().get(ib)
            || layout_a.splits_of(ia) != layout_b.splits_of(ib)
        {
            return Err(ContractError::layout(alloc::format!(
                "contracted slot {} of A and slot {} of B are split differently",
                ia, ib
            )));
        }
    }

    let order = contr.order_c();
    let dims: SlotVec<usize> = (0..order)
        .map(|i| match contr.conn_c(i) {
            SlotRef::A(j) => layout_a.dims().get(j),
            SlotRef::B(j) => layout_b.dims().get(j),
            SlotRef::Result(_) => 0,
        })
        .collect();
    let mut layout = BlockLayout::new(Dimensions::new(&dims));

    let mut done = vec![false; order];
    for i in 0..order {
        if done[i] {
            continue;
        }
        let (source, slot, retained): (&BlockLayout, usize, fn(&Contraction, usize) -> SlotRef) =
            match contr.conn_c(i) {
                SlotRef::A(j) => (layout_a, j, Contraction::conn_a),
                SlotRef::B(j) => (layout_b, j, Contraction::conn_b),
                SlotRef::Result(_) => continue,
            };
        let ty = source.get_type(slot);

        let mut todo = vec![false; order];
        for s in 0..source.order() {
            if source.get_type(s) != ty {
                continue;
            }
            if let SlotRef::Result(ic) = retained(contr, s) {
                todo[ic] = true;
            }
        }
        layout.split_all(&todo, source.get_splits(ty))?;
        for (d, t) in done.iter_mut().zip(todo.iter()) {
            *d |= *t;
        }
    }

    Ok(layout)
}
