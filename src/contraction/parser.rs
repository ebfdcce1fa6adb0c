//! Label notation for pairwise contractions.
//!
//! Parses strings like "ij,jk->ik" into a [`Contraction`].

use alloc::vec::Vec;

use super::descriptor::Contraction;
use crate::error::{ContractError, ContractResult};
use crate::symmetry::{Permutation, SlotVec};

/// Parses a pairwise contraction in label notation.
///
/// # Grammar
///
/// ```text
/// contraction ::= labels ',' labels '->' labels | labels ',' labels
/// labels      ::= label*
/// label       ::= [a-zA-Z]
/// ```
///
/// A label shared by both operands is contracted and must not appear in the
/// result. A label of a single operand is kept and appears in the result
/// exactly once. Without `->` the kept labels are sorted alphabetically.
///
/// # Examples
///
/// ```ignore
/// let contr = parse_contraction("ij,jk->ik")?;   // Matrix product
/// let contr = parse_contraction("ijab,abkl->ijkl")?;
/// let contr = parse_contraction("ij,jk")?;      // Implicit result "ik"
/// ```
pub fn parse_contraction(notation: &str) -> ContractResult<Contraction> {
    let notation = notation.trim();

    if notation.is_empty() {
        return Err(ContractError::parse("empty notation"));
    }

    let (inputs_str, output_str) = match notation.find("->") {
        Some(arrow_pos) => (&notation[..arrow_pos], Some(&notation[arrow_pos + 2..])),
        None => (notation, None),
    };

    let input_strs: Vec<&str> = inputs_str.split(',').collect();
    if input_strs.len() != 2 {
        return Err(ContractError::parse(alloc::format!(
            "expected two operands, got {}",
            input_strs.len()
        )));
    }

    let labels_a = parse_labels(input_strs[0])?;
    let labels_b = parse_labels(input_strs[1])?;

    let free_a: SlotVec<char> = labels_a.iter().copied().filter(|c| !labels_b.contains(c)).collect();
    let free_b: SlotVec<char> = labels_b.iter().copied().filter(|c| !labels_a.contains(c)).collect();

    let labels_c = match output_str {
        Some(out) => parse_labels(out)?,
        None => infer_output(&free_a, &free_b),
    };
    validate_output(&labels_a, &labels_b, &labels_c)?;

    let mut contr = Contraction::new(free_a.len(), free_b.len(), labels_a.len() - free_a.len());
    for (ia, c) in labels_a.iter().enumerate() {
        if let Some(ib) = labels_b.iter().position(|x| x == c) {
            contr.contract(ia, ib)?;
        }
    }

    // Default result order is the free labels of A followed by those of B.
    let default: SlotVec<char> = free_a.iter().chain(free_b.iter()).copied().collect();
    let map: SlotVec<usize> = labels_c
        .iter()
        .map(|c| default.iter().position(|x| x == c).unwrap_or_default())
        .collect();
    let perm = Permutation::from_map(&map)?;
    if !perm.is_identity() {
        contr.permute_c(&perm)?;
    }

    Ok(contr)
}

/// Parses the labels of one tensor. Repeated labels are rejected.
fn parse_labels(s: &str) -> ContractResult<SlotVec<char>> {
    let mut labels = SlotVec::new();

    for c in s.chars() {
        match c {
            'a'..='z' | 'A'..='Z' => {
                if labels.contains(&c) {
                    return Err(ContractError::parse(alloc::format!(
                        "label '{}' repeated within one tensor",
                        c
                    )));
                }
                labels.push(c);
            }
            ' ' | '\t' => continue,
            _ => {
                return Err(ContractError::parse(alloc::format!(
                    "invalid character '{}' in labels",
                    c
                )));
            }
        }
    }

    Ok(labels)
}

/// Infers the result labels: every kept label, sorted alphabetically.
fn infer_output(free_a: &[char], free_b: &[char]) -> SlotVec<char> {
    let mut labels: SlotVec<char> = free_a.iter().chain(free_b.iter()).copied().collect();
    labels.sort_unstable();
    labels
}

fn validate_output(labels_a: &[char], labels_b: &[char], labels_c: &[char]) -> ContractResult<()> {
    for &c in labels_c {
        let in_a = labels_a.contains(&c);
        let in_b = labels_b.contains(&c);
        if in_a && in_b {
            return Err(ContractError::parse(alloc::format!(
                "label '{}' is contracted and cannot appear in the result",
                c
            )));
        }
        if !in_a && !in_b {
            return Err(ContractError::parse(alloc::format!(
                "result label '{}' not found in either operand",
                c
            )));
        }
    }
    for &c in labels_a.iter().chain(labels_b.iter()) {
        let shared = labels_a.contains(&c) && labels_b.contains(&c);
        if !shared && !labels_c.contains(&c) {
            return Err(ContractError::parse(alloc::format!(
                "label '{}' is neither contracted nor kept",
                c
            )));
        }
    }
    Ok(())
}
