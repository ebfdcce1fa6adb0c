//! Schedule construction through the public contraction API.

use pretty_assertions::assert_eq;
use symblock_contract::{
    BlockContract2, BlockLayout, BlockTensor, ContractConfig, Dimensions, NaiveKernel,
    SymmetryGroup, parse_contraction,
};

use crate::common::{
    CountingKernel, antisymmetrize, assert_close, dense, group, swap, symmetrize,
};

#[test]
fn test_small_unsymmetric_schedule() {
    let contr = parse_contraction("ij,jk->ik").unwrap();
    let mut la = BlockLayout::new(Dimensions::new(&[4, 6]));
    la.split(&[true, false], 2).unwrap();
    la.split_all(&[false, true], &[2, 4]).unwrap();
    let mut lb = BlockLayout::new(Dimensions::new(&[6, 3]));
    lb.split_all(&[true, false], &[2, 4]).unwrap();
    let a = BlockTensor::new(la.clone());
    let b = BlockTensor::new(lb.clone());
    let op = BlockContract2::new(contr, &a, &b).unwrap();

    let sch = op.schedule().unwrap();

    let dims_a = la.block_dims();
    let dims_b = lb.block_dims();
    let dims_c = op.layout().block_dims();
    assert_eq!(dims_c.as_slice(), &[2, 1]);
    assert_eq!(sch.len(), 2);
    for (abs_c, list) in sch.iter() {
        let idx_c = dims_c.index(abs_c);
        assert_eq!(list.len(), 3);
        for entry in list {
            let idx_a = dims_a.index(entry.abs_index_a);
            let idx_b = dims_b.index(entry.abs_index_b);
            assert_eq!(entry.coeff, 1.0);
            assert_eq!(idx_a[0], idx_c[0]);
            assert_eq!(idx_b[1], idx_c[1]);
            assert_eq!(idx_a[1], idx_b[0]);
        }
        let mut joined: Vec<usize> =
            list.iter().map(|e| dims_a.index(e.abs_index_a)[1]).collect();
        joined.sort_unstable();
        assert_eq!(joined, vec![0, 1, 2]);
    }
}

#[test]
fn test_antisymmetric_operand_schedules_canonical_blocks_only() {
    // A(i,j,a) antisymmetric in (i,j), contracted with B(a,k) over a.
    let contr = parse_contraction("ija,ak->ijk").unwrap();
    let la = BlockLayout::uniform(3, 4, &[2]).unwrap();
    let lb = BlockLayout::uniform(2, 4, &[2]).unwrap();
    let a = BlockTensor::with_symmetry(la, group(3, [swap(3, 0, 1, -1.0)])).unwrap();
    let b = BlockTensor::new(lb);
    let op = BlockContract2::new(contr, &a, &b).unwrap();

    let sch = op.schedule().unwrap();

    let dims_c = op.layout().block_dims();
    for (abs_c, list) in sch.iter() {
        let idx_c = dims_c.index(abs_c);
        assert!(idx_c[0] <= idx_c[1], "non-canonical block {idx_c:?} scheduled");
        for (i, x) in list.iter().enumerate() {
            for y in &list[i + 1..] {
                let same_blocks =
                    x.abs_index_a == y.abs_index_a && x.abs_index_b == y.abs_index_b;
                assert!(!(same_blocks && x.is_same_perm(&y.perm_a, &y.perm_b)));
            }
        }
    }
    // Upper triangle of (i, j) blocks times both k blocks.
    assert_eq!(sch.len(), 3 * 2);

    let assignment = op.assignment_schedule().unwrap();
    assert_eq!(assignment.len(), sch.len());
}

#[test]
fn test_antisymmetric_times_symmetric_cancels() {
    // Full contraction of an antisymmetric with a symmetric tensor is zero.
    let contr = parse_contraction("ij,ij->").unwrap();
    let layout = BlockLayout::uniform(2, 4, &[2]).unwrap();
    let sym = symmetrize(&dense(&[4, 4], 3), 0, 1);
    let a = BlockTensor::from_dense(
        layout.clone(),
        group(2, [swap(2, 0, 1, -1.0)]),
        &antisymmetrize(&dense(&[4, 4], 5), 0, 1),
    )
    .unwrap();
    let b = BlockTensor::from_dense(layout, group(2, [swap(2, 0, 1, 1.0)]), &sym).unwrap();
    let op = BlockContract2::new(contr, &a, &b).unwrap();

    let mut c = BlockTensor::new(op.layout().clone());
    op.perform(&mut c).unwrap();

    let scalar = c.to_dense();
    assert!(scalar.get(&[]).abs() < 1e-12);
}

#[test]
fn test_zero_operand_blocks_never_reach_the_kernel() {
    let contr = parse_contraction("ij,jk->ik").unwrap();
    let layout = BlockLayout::uniform(2, 6, &[2, 4]).unwrap();
    let mut a = BlockTensor::from_dense(layout.clone(), SymmetryGroup::new(2), &dense(&[6, 6], 7))
        .unwrap();
    let b = BlockTensor::from_dense(layout, SymmetryGroup::new(2), &dense(&[6, 6], 8)).unwrap();
    // Zero out the whole middle block column of A.
    for i in 0..3 {
        a.remove_block(&[i, 1]).unwrap();
    }

    let kernel = CountingKernel::default();
    let op = BlockContract2::new(contr.clone(), &a, &b).unwrap().with_kernel(&kernel);
    let mut c = BlockTensor::new(op.layout().clone());
    let stats = op.perform(&mut c).unwrap();

    // 9 result blocks with 3 entries each, one per j block; j = 1 is skipped.
    assert_eq!(kernel.calls.get(), 18);
    assert_eq!(stats.kernel_calls, 18);
    assert_eq!(stats.skipped_entries, 9);

    let expected = NaiveKernel.contract_new(&contr, &a.to_dense(), &b.to_dense()).unwrap();
    assert_close(&c.to_dense(), &expected);
}

#[test]
fn test_zero_threshold_from_config() {
    let contr = parse_contraction("ij,jk->ik").unwrap();
    let layout = BlockLayout::uniform(2, 4, &[2]).unwrap();
    let a = BlockTensor::new(layout.clone());
    let b = BlockTensor::new(layout);

    let op = BlockContract2::new(contr, &a, &b)
        .unwrap()
        .with_config(ContractConfig::new().with_zero_threshold(2.0));

    assert!(op.schedule().unwrap().is_empty());
    assert_eq!(op.cost().unwrap().kernel_calls, 0);
}
