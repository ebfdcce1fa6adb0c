//! Consistency checks for connectivity descriptors.

use super::descriptor::{Contraction, SlotRef};
use crate::error::{ContractError, ContractResult};

/// Validates a connectivity descriptor.
///
/// Checks:
/// - Every slot is connected and the table is symmetric
/// - Result slots connect to operand slots only
/// - Operand slots connect to the result or to the other operand
/// - Exactly `k` pairs are contracted
pub fn validate_contraction(contr: &Contraction) -> ContractResult<()> {
    validate_table(contr)?;
    validate_targets(contr)?;
    validate_pair_count(contr)?;
    Ok(())
}

fn validate_table(contr: &Contraction) -> ContractResult<()> {
    let conn = contr.conn();
    let expected = 2 * (contr.order_c() + contr.num_contracted());
    if conn.len() != expected {
        return Err(ContractError::contraction(alloc::format!(
            "connection table has {} entries, expected {}",
            conn.len(),
            expected
        )));
    }
    for (slot, &target) in conn.iter().enumerate() {
        if target >= conn.len() {
            return Err(ContractError::contraction(alloc::format!(
                "slot {} is not connected",
                slot
            )));
        }
        if conn[target] != slot {
            return Err(ContractError::contraction(alloc::format!(
                "slot {} points to {} which points to {}",
                slot, target, conn[target]
            )));
        }
    }
    Ok(())
}

fn validate_targets(contr: &Contraction) -> ContractResult<()> {
    for i in 0..contr.order_c() {
        if let SlotRef::Result(j) = contr.conn_c(i) {
            return Err(ContractError::contraction(alloc::format!(
                "result slot {} is connected to result slot {}",
                i, j
            )));
        }
    }
    for i in 0..contr.order_a() {
        if let SlotRef::A(j) = contr.conn_a(i) {
            return Err(ContractError::contraction(alloc::format!(
                "slot {} of A is connected to slot {} of A",
                i, j
            )));
        }
    }
    for i in 0..contr.order_b() {
        if let SlotRef::B(j) = contr.conn_b(i) {
            return Err(ContractError::contraction(alloc::format!(
                "slot {} of B is connected to slot {} of B",
                i, j
            )));
        }
    }
    Ok(())
}

fn validate_pair_count(contr: &Contraction) -> ContractResult<()> {
    let pairs = contr.contracted_pairs().len();
    if pairs != contr.num_contracted() {
        return Err(ContractError::contraction(alloc::format!(
            "{} slot pairs are contracted, expected {}",
            pairs,
            contr.num_contracted()
        )));
    }
    Ok(())
}
