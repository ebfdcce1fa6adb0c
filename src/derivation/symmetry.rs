//! Symmetry of the contraction result.

use alloc::vec::Vec;

use crate::contraction::{Contraction, SlotRef};
use crate::error::{ContractError, ContractResult};
use crate::layout::BlockLayout;
use crate::symmetry::{SlotVec, SymmetryGroup};

/// Derives the symmetry of `C = A * B` from the operand symmetries.
///
/// An element of an operand group carries over to the result when it only
/// permutes the slots of that operand that survive into the result. The
/// projected element is lifted onto the matching result slots. Elements that
/// mix retained and contracted slots are dropped, so the result group is a
/// subgroup of the true symmetry of `C`.
pub fn propagate_symmetry(
    contr: &Contraction,
    layout_c: &BlockLayout,
    sym_a: &SymmetryGroup,
    sym_b: &SymmetryGroup,
) -> ContractResult<SymmetryGroup> {
    if sym_a.order() != contr.order_a() || sym_b.order() != contr.order_b() {
        return Err(ContractError::symmetry(alloc::format!(
            "operand symmetry orders ({}, {}) do not match descriptor ({}, {})",
            sym_a.order(),
            sym_b.order(),
            contr.order_a(),
            contr.order_b()
        )));
    }
    if layout_c.order() != contr.order_c() {
        return Err(ContractError::layout(alloc::format!(
            "result layout of order {} for descriptor of order {}",
            layout_c.order(),
            contr.order_c()
        )));
    }

    let mut sym_c = SymmetryGroup::new(contr.order_c());
    let conn_a: SlotVec<SlotRef> = (0..contr.order_a()).map(|i| contr.conn_a(i)).collect();
    let conn_b: SlotVec<SlotRef> = (0..contr.order_b()).map(|i| contr.conn_b(i)).collect();
    lift_operand(&mut sym_c, sym_a, &conn_a)?;
    lift_operand(&mut sym_c, sym_b, &conn_b)?;

    sym_c.check_layout(layout_c)?;
    Ok(sym_c)
}

fn lift_operand(
    sym_c: &mut SymmetryGroup,
    sym: &SymmetryGroup,
    conn: &[SlotRef],
) -> ContractResult<()> {
    let mask: Vec<bool> = conn.iter().map(|s| matches!(s, SlotRef::Result(_))).collect();
    let slot_map: SlotVec<usize> = conn
        .iter()
        .filter_map(|s| match s {
            SlotRef::Result(ic) => Some(*ic),
            _ => None,
        })
        .collect();

    for elem in sym.closure() {
        let reduced = SymmetryGroup::project_down(&elem, &mask);
        if reduced.perm.is_identity() {
            continue;
        }
        let lifted = SymmetryGroup::project_up(&reduced, &slot_map, sym_c.order())?;
        sym_c.add_element(lifted)?;
    }
    Ok(())
}
