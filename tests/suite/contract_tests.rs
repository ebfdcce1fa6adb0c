//! End-to-end block contractions checked against dense reference results.

use pretty_assertions::assert_eq;
use symblock_contract::{
    BlockContract2, BlockLayout, BlockTensor, BlockTensorRead, ContractConfig, ContractError,
    Contraction, DenseBlock, Dimensions, NaiveKernel, SymmetryGroup, parse_contraction,
};

use crate::common::{
    FailingKernel, antisymmetrize, assert_close, dense, group, scaled, swap, symmetrize,
};

fn reference(contr: &Contraction, a: &BlockTensor, b: &BlockTensor) -> DenseBlock {
    NaiveKernel
        .contract_new(contr, &a.to_dense(), &b.to_dense())
        .unwrap()
}

/// A(i,j,a) antisymmetric in (i,j) and an unsymmetric B(a,k).
fn antisymmetric_operands() -> (BlockTensor, BlockTensor) {
    let la = BlockLayout::uniform(3, 5, &[2]).unwrap();
    let lb = BlockLayout::uniform(2, 5, &[2]).unwrap();
    let a = BlockTensor::from_dense(
        la,
        group(3, [swap(3, 0, 1, -1.0)]),
        &antisymmetrize(&dense(&[5, 5, 5], 1), 0, 1),
    )
    .unwrap();
    let b = BlockTensor::from_dense(lb, SymmetryGroup::new(2), &dense(&[5, 5], 2)).unwrap();
    (a, b)
}

#[test]
fn test_antisymmetric_operand_matches_dense_reference() {
    let contr = parse_contraction("ija,ak->ijk").unwrap();
    let (a, b) = antisymmetric_operands();

    let op = BlockContract2::new(contr.clone(), &a, &b).unwrap();
    let mut c = BlockTensor::new(op.layout().clone());
    op.perform(&mut c).unwrap();

    assert!(c.symmetry().equivalent(&group(3, [swap(3, 0, 1, -1.0)])));
    assert_close(&c.to_dense(), &reference(&contr, &a, &b));
}

#[test]
fn test_both_operands_symmetric_with_permuted_result() {
    // C(k,i,j,l) = A(i,j,a) B(a,k,l), A symmetric in (i,j), B antisymmetric in (k,l).
    let contr = parse_contraction("ija,akl->kijl").unwrap();
    let layout = BlockLayout::uniform(3, 4, &[1, 3]).unwrap();
    let a = BlockTensor::from_dense(
        layout.clone(),
        group(3, [swap(3, 0, 1, 1.0)]),
        &symmetrize(&dense(&[4, 4, 4], 3), 0, 1),
    )
    .unwrap();
    let b = BlockTensor::from_dense(
        layout,
        group(3, [swap(3, 1, 2, -1.0)]),
        &antisymmetrize(&dense(&[4, 4, 4], 4), 1, 2),
    )
    .unwrap();

    let op = BlockContract2::new(contr.clone(), &a, &b).unwrap();
    assert!(op.symmetry().equivalent(&group(
        4,
        [swap(4, 1, 2, 1.0), swap(4, 0, 3, -1.0)]
    )));

    let mut c = BlockTensor::new(op.layout().clone());
    op.perform(&mut c).unwrap();

    assert_close(&c.to_dense(), &reference(&contr, &a, &b));
}

#[test]
fn test_symmetric_matmul() {
    let contr = parse_contraction("ij,jk->ik").unwrap();
    let layout = BlockLayout::uniform(2, 7, &[3, 5]).unwrap();
    let sym = group(2, [swap(2, 0, 1, 1.0)]);
    let a = BlockTensor::from_dense(layout.clone(), sym.clone(), &symmetrize(&dense(&[7, 7], 5), 0, 1))
        .unwrap();
    let b = BlockTensor::from_dense(layout, sym, &symmetrize(&dense(&[7, 7], 6), 0, 1)).unwrap();

    let op = BlockContract2::new(contr.clone(), &a, &b).unwrap();
    assert!(op.symmetry().is_empty());

    let mut c = BlockTensor::new(op.layout().clone());
    op.perform(&mut c).unwrap();

    assert_close(&c.to_dense(), &reference(&contr, &a, &b));
}

#[test]
fn test_perform_replaces_previous_content() {
    let contr = parse_contraction("ija,ak->ijk").unwrap();
    let (a, b) = antisymmetric_operands();
    let op = BlockContract2::new(contr.clone(), &a, &b).unwrap();

    let mut c = BlockTensor::from_dense(
        op.layout().clone(),
        SymmetryGroup::new(3),
        &dense(&[5, 5, 5], 9),
    )
    .unwrap();
    op.perform(&mut c).unwrap();

    assert_close(&c.to_dense(), &reference(&contr, &a, &b));
}

#[test]
fn test_perform_add_doubles_result() {
    let contr = parse_contraction("ija,ak->ijk").unwrap();
    let (a, b) = antisymmetric_operands();
    let op = BlockContract2::new(contr.clone(), &a, &b).unwrap();
    let expected = reference(&contr, &a, &b);

    let mut c = BlockTensor::new(op.layout().clone());
    op.perform(&mut c).unwrap();
    op.perform_add(&mut c, 1.0).unwrap();

    assert_close(&c.to_dense(), &scaled(&expected, 2.0));

    op.perform_add(&mut c, -1.5).unwrap();
    assert_close(&c.to_dense(), &scaled(&expected, 0.5));
}

#[test]
fn test_perform_add_into_less_symmetric_result() {
    let contr = parse_contraction("ija,ak->ijk").unwrap();
    let (a, b) = antisymmetric_operands();
    let op = BlockContract2::new(contr.clone(), &a, &b).unwrap();

    let mut c = BlockTensor::new(op.layout().clone());
    let stats = op.perform_add(&mut c, 1.0).unwrap();

    assert!(c.symmetry().is_empty());
    assert_eq!(stats.blocks_written, op.layout().block_dims().total());
    assert_close(&c.to_dense(), &reference(&contr, &a, &b));
}

#[test]
fn test_perform_add_rejects_foreign_symmetry() {
    let contr = parse_contraction("ija,ak->ijk").unwrap();
    let (a, b) = antisymmetric_operands();
    let op = BlockContract2::new(contr, &a, &b).unwrap();

    let mut c =
        BlockTensor::with_symmetry(op.layout().clone(), group(3, [swap(3, 0, 1, 1.0)])).unwrap();

    let err = op.perform_add(&mut c, 1.0).unwrap_err();
    assert!(matches!(err, ContractError::InvalidSymmetry { .. }));
    assert_eq!(c.num_stored_blocks(), 0);
}

#[test]
fn test_keep_result_symmetry_when_configured() {
    let contr = parse_contraction("ija,ak->ijk").unwrap();
    let (a, b) = antisymmetric_operands();
    let op = BlockContract2::new(contr.clone(), &a, &b)
        .unwrap()
        .with_config(ContractConfig::new().with_result_symmetry(false));

    let mut c = BlockTensor::new(op.layout().clone());
    op.perform(&mut c).unwrap();

    assert!(c.symmetry().is_empty());
    assert_close(&c.to_dense(), &reference(&contr, &a, &b));
}

/// A(i,j) with five row blocks and B(j,k) unsplit: five result blocks with
/// one kernel call each.
fn five_block_operands() -> (BlockTensor, BlockTensor) {
    let mut la = BlockLayout::new(Dimensions::new(&[5, 2]));
    la.split_all(&[true, false], &[1, 2, 3, 4]).unwrap();
    let lb = BlockLayout::new(Dimensions::new(&[2, 3]));
    let ones_a = DenseBlock::from_fn(Dimensions::new(&[5, 2]), |i| (i[0] + i[1] + 1) as f64);
    let ones_b = DenseBlock::from_fn(Dimensions::new(&[2, 3]), |i| (i[0] * 3 + i[1] + 1) as f64);
    let a = BlockTensor::from_dense(la, SymmetryGroup::new(2), &ones_a).unwrap();
    let b = BlockTensor::from_dense(lb, SymmetryGroup::new(2), &ones_b).unwrap();
    (a, b)
}

#[test]
fn test_kernel_failure_keeps_completed_blocks() {
    let contr = parse_contraction("ij,jk->ik").unwrap();
    let (a, b) = five_block_operands();
    let expected = reference(&contr, &a, &b);

    let op = BlockContract2::new(contr.clone(), &a, &b)
        .unwrap()
        .with_kernel(FailingKernel::new(3));
    assert_eq!(op.schedule().unwrap().len(), 5);

    let mut c = BlockTensor::new(op.layout().clone());
    let err = op.perform(&mut c).unwrap_err();

    assert!(err.is_kernel_failure());
    match &err {
        ContractError::KernelFailure { index, .. } => assert_eq!(index, &vec![2, 0]),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(op.kernel().calls.get(), 3);

    for row in 0..2 {
        let block = c.block(&[row, 0]).unwrap();
        for k in 0..3 {
            assert_eq!(block.get(&[0, k]), expected.get(&[row, k]));
        }
    }
    // The failing block was requested but never accumulated into.
    assert!(c.block(&[2, 0]).unwrap().is_zero());
    assert!(c.block(&[3, 0]).is_none());
    assert!(c.block(&[4, 0]).is_none());

    // The operation stays usable: a new schedule is built on the next call.
    let op = BlockContract2::new(contr, &a, &b).unwrap();
    op.perform(&mut c).unwrap();
    assert_close(&c.to_dense(), &expected);
}

#[test]
fn test_inconsistent_operand_symmetry_gives_zero_result() {
    let contr = parse_contraction("ija,ak->ijk").unwrap();
    let la = BlockLayout::uniform(3, 4, &[2]).unwrap();
    let lb = BlockLayout::uniform(2, 4, &[2]).unwrap();
    let a = BlockTensor::with_symmetry(
        la,
        group(3, [swap(3, 0, 1, 1.0), swap(3, 1, 2, 1.0), swap(3, 0, 2, -1.0)]),
    )
    .unwrap();
    let b = BlockTensor::from_dense(lb, SymmetryGroup::new(2), &dense(&[4, 4], 3)).unwrap();

    let op = BlockContract2::new(contr, &a, &b).unwrap();
    assert!(!op.symmetry().is_consistent());
    assert!(op.schedule().unwrap().is_empty());

    let mut c = BlockTensor::new(op.layout().clone());
    let stats = op.perform(&mut c).unwrap();
    assert_eq!(stats.kernel_calls, 0);
    assert!(c.to_dense().is_zero());
}

#[test]
fn test_operands_are_only_read() {
    let contr = parse_contraction("ija,ak->ijk").unwrap();
    let (a, b) = antisymmetric_operands();
    let before_a = a.to_dense();
    let before_b = b.to_dense();

    let op = BlockContract2::new(contr, &a, &b).unwrap();
    let mut c = BlockTensor::new(op.layout().clone());
    op.perform(&mut c).unwrap();

    assert_eq!(a.to_dense(), before_a);
    assert_eq!(b.to_dense(), before_b);
    assert!(!a.is_zero_block(&[0, 1, 0]));
}
