//! Result layout derivation and layout checks.

use pretty_assertions::assert_eq;
use symblock_contract::{
    BlockContract2, BlockLayout, BlockTensor, ContractError, DenseBlock, Dimensions,
    SymmetryGroup, parse_contraction,
};

use crate::common::{dense, group, swap};

#[test]
fn test_contracted_split_mismatch_fails_construction() {
    let contr = parse_contraction("ij,jk->ik").unwrap();
    let a = BlockTensor::new(BlockLayout::uniform(2, 6, &[3]).unwrap());
    let b = BlockTensor::new(BlockLayout::uniform(2, 6, &[2, 4]).unwrap());

    let err = BlockContract2::new(contr, &a, &b).unwrap_err();

    assert!(err.is_layout_mismatch());
}

#[test]
fn test_only_contracted_splits_have_to_agree() {
    // Free slots may be split arbitrarily.
    let contr = parse_contraction("ij,jk->ik").unwrap();
    let mut la = BlockLayout::new(Dimensions::new(&[6, 6]));
    la.split(&[true, false], 1).unwrap();
    la.split(&[false, true], 3).unwrap();
    let mut lb = BlockLayout::new(Dimensions::new(&[6, 4]));
    lb.split(&[true, false], 3).unwrap();
    let a = BlockTensor::new(la);
    let b = BlockTensor::new(lb);

    let op = BlockContract2::new(contr, &a, &b).unwrap();

    assert_eq!(op.layout().dims().as_slice(), &[6, 4]);
    assert_eq!(op.layout().splits_of(0), &[1]);
    assert!(op.layout().splits_of(1).is_empty());
}

#[test]
fn test_wrong_result_layout_is_rejected_before_touching_blocks() {
    let contr = parse_contraction("ij,jk->ik").unwrap();
    let layout = BlockLayout::uniform(2, 4, &[2]).unwrap();
    let a = BlockTensor::from_dense(layout.clone(), SymmetryGroup::new(2), &dense(&[4, 4], 1))
        .unwrap();
    let b = BlockTensor::from_dense(layout, SymmetryGroup::new(2), &dense(&[4, 4], 2)).unwrap();
    let op = BlockContract2::new(contr, &a, &b).unwrap();

    let mut c = BlockTensor::new(BlockLayout::uniform(2, 4, &[1]).unwrap());
    let marker = DenseBlock::from_fn(Dimensions::new(&[1, 1]), |_| 42.0);
    c.set_block(&[0, 0], marker.clone()).unwrap();

    let err = op.perform(&mut c).unwrap_err();
    assert!(matches!(err, ContractError::LayoutMismatch { .. }));
    let err = op.perform_add(&mut c, 1.0).unwrap_err();
    assert!(err.is_layout_mismatch());

    assert_eq!(c.num_stored_blocks(), 1);
    assert_eq!(c.block(&[0, 0]), Some(&marker));
}

#[test]
fn test_result_layout_with_other_type_grouping_is_accepted() {
    let contr = parse_contraction("ij,jk->ik").unwrap();
    let layout = BlockLayout::uniform(2, 4, &[2]).unwrap();
    let a = BlockTensor::new(layout.clone());
    let b = BlockTensor::new(layout);
    let op = BlockContract2::new(contr, &a, &b).unwrap();

    let mut lc = BlockLayout::new(Dimensions::new(&[4, 4]));
    lc.split(&[true, false], 2).unwrap();
    lc.split(&[false, true], 2).unwrap();
    let mut c = BlockTensor::new(lc);

    assert!(op.perform(&mut c).is_ok());
}

#[test]
fn test_derivation_is_idempotent() {
    let contr = parse_contraction("ija,akl->ijkl").unwrap();
    let la = BlockLayout::uniform(3, 6, &[2, 4]).unwrap();
    let lb = BlockLayout::uniform(3, 6, &[2, 4]).unwrap();
    let a = BlockTensor::with_symmetry(la, group(3, [swap(3, 0, 1, -1.0)])).unwrap();
    let b = BlockTensor::with_symmetry(lb, group(3, [swap(3, 1, 2, 1.0)])).unwrap();

    let first = BlockContract2::new(contr.clone(), &a, &b).unwrap();
    let second = BlockContract2::new(contr, &a, &b).unwrap();

    assert_eq!(first.layout(), second.layout());
    assert!(first.symmetry().equivalent(second.symmetry()));
    assert!(first.symmetry().equivalent(&group(
        4,
        [swap(4, 0, 1, -1.0), swap(4, 2, 3, 1.0)]
    )));
}
