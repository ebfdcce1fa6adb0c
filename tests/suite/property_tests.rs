//! Randomised properties of block contractions.

use proptest::prelude::*;
use symblock_contract::{
    BlockContract2, BlockLayout, BlockTensor, NaiveKernel, SymmetryGroup, parse_contraction,
};

use crate::common::{antisymmetrize, dense, group, swap, symmetrize};

/// Split points of an extent-6 slot selected by a bit mask over 1..6.
fn points(mask: u8) -> Vec<usize> {
    (1..6).filter(|p| mask & (1 << (p - 1)) != 0).collect()
}

proptest! {
    #[test]
    fn prop_symmetric_contraction_matches_dense(
        mask in 0u8..32,
        seed_a in 0usize..1000,
        seed_b in 0usize..1000,
        antisymmetric in any::<bool>(),
    ) {
        let contr = parse_contraction("ija,ak->ijk").unwrap();
        let pts = points(mask);
        let la = BlockLayout::uniform(3, 6, &pts).unwrap();
        let lb = BlockLayout::uniform(2, 6, &pts).unwrap();
        let (coeff, data) = if antisymmetric {
            (-1.0, antisymmetrize(&dense(&[6, 6, 6], seed_a), 0, 1))
        } else {
            (1.0, symmetrize(&dense(&[6, 6, 6], seed_a), 0, 1))
        };
        let a = BlockTensor::from_dense(la, group(3, [swap(3, 0, 1, coeff)]), &data).unwrap();
        let b = BlockTensor::from_dense(lb, SymmetryGroup::new(2), &dense(&[6, 6], seed_b)).unwrap();

        let op = BlockContract2::new(contr.clone(), &a, &b).unwrap();
        let mut c = BlockTensor::new(op.layout().clone());
        op.perform(&mut c).unwrap();

        let expected = NaiveKernel.contract_new(&contr, &a.to_dense(), &b.to_dense()).unwrap();
        let diff = c.to_dense().max_abs_diff(&expected);
        prop_assert!(diff < 1e-10, "max abs difference {}", diff);
    }

    #[test]
    fn prop_accumulation_is_linear(
        mask in 0u8..32,
        seed in 0usize..1000,
        factor in -3.0f64..3.0,
    ) {
        let contr = parse_contraction("ij,jk->ik").unwrap();
        let layout = BlockLayout::uniform(2, 6, &points(mask)).unwrap();
        let a = BlockTensor::from_dense(layout.clone(), SymmetryGroup::new(2), &dense(&[6, 6], seed)).unwrap();
        let b = BlockTensor::from_dense(layout, SymmetryGroup::new(2), &dense(&[6, 6], seed + 1)).unwrap();
        let op = BlockContract2::new(contr, &a, &b).unwrap();

        let mut once = BlockTensor::new(op.layout().clone());
        op.perform(&mut once).unwrap();
        let mut twice = BlockTensor::new(op.layout().clone());
        op.perform(&mut twice).unwrap();
        op.perform_add(&mut twice, factor).unwrap();

        let mut expected = once.to_dense();
        expected.scale(1.0 + factor);
        let diff = twice.to_dense().max_abs_diff(&expected);
        prop_assert!(diff < 1e-10, "max abs difference {}", diff);
    }

    #[test]
    fn prop_derivation_is_idempotent(mask_a in 0u8..32, mask_b in 0u8..32) {
        let contr = parse_contraction("iak,aj->kij").unwrap();
        let la = BlockLayout::uniform(3, 6, &points(mask_a)).unwrap();
        let mut lb = BlockLayout::uniform(2, 6, &points(mask_a)).unwrap();
        lb.split_all(&[false, true], &points(mask_b)).unwrap();
        let a = BlockTensor::with_symmetry(la, group(3, [swap(3, 0, 2, -1.0)])).unwrap();
        let b = BlockTensor::new(lb);

        let first = BlockContract2::new(contr.clone(), &a, &b).unwrap();
        let second = BlockContract2::new(contr, &a, &b).unwrap();

        prop_assert_eq!(first.layout(), second.layout());
        prop_assert!(first.symmetry().equivalent(second.symmetry()));
        prop_assert_eq!(first.schedule().unwrap(), second.schedule().unwrap());
    }
}
