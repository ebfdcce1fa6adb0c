//! Strided reference kernel.
//!
//! Loops over every result element and every combination of contracted
//! indices. Slow but exact; also used to build dense reference results.

use smallvec::SmallVec;

use super::ContractKernel;
use crate::contraction::{Contraction, SlotRef};
use crate::error::{ContractError, ContractResult};
use crate::layout::Dimensions;
use crate::symmetry::SlotVec;
use crate::tensor::DenseBlock;

/// Reference implementation of [`ContractKernel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveKernel;

impl NaiveKernel {
    pub fn new() -> Self {
        Self
    }

    /// Contracts two dense tensors into a freshly allocated result.
    pub fn contract_new(
        &self,
        contr: &Contraction,
        a: &DenseBlock,
        b: &DenseBlock,
    ) -> ContractResult<DenseBlock> {
        let dims = result_dims(contr, a, b)?;
        let mut c = DenseBlock::zeros(Dimensions::new(&dims));
        self.contract(contr, a, b, &mut c, 1.0)?;
        Ok(c)
    }
}

/// Extents of the result of contracting `a` with `b`.
fn result_dims(contr: &Contraction, a: &DenseBlock, b: &DenseBlock) -> ContractResult<SlotVec<usize>> {
    if !contr.is_complete() {
        return Err(ContractError::contraction("descriptor is incomplete"));
    }
    if a.dims().order() != contr.order_a() || b.dims().order() != contr.order_b() {
        return Err(ContractError::contraction(alloc::format!(
            "operand orders ({}, {}) do not match descriptor ({}, {})",
            a.dims().order(),
            b.dims().order(),
            contr.order_a(),
            contr.order_b()
        )));
    }
    let dims = (0..contr.order_c())
        .map(|i| match contr.conn_c(i) {
            SlotRef::A(j) => a.dims().get(j),
            SlotRef::B(j) => b.dims().get(j),
            SlotRef::Result(_) => 0,
        })
        .collect();
    Ok(dims)
}

impl ContractKernel for NaiveKernel {
    fn contract(
        &self,
        contr: &Contraction,
        a: &DenseBlock,
        b: &DenseBlock,
        c: &mut DenseBlock,
        coeff: f64,
    ) -> ContractResult<()> {
        let dims_c = result_dims(contr, a, b)?;
        if c.dims().as_slice() != dims_c.as_slice() {
            return Err(ContractError::shape(&dims_c, c.dims().as_slice()));
        }

        let strides_a = a.dims().strides();
        let strides_b = b.dims().strides();

        // Per result slot: (stride in A, stride in B).
        let free: SlotVec<(usize, usize)> = (0..contr.order_c())
            .map(|i| match contr.conn_c(i) {
                SlotRef::A(j) => (strides_a[j], 0),
                SlotRef::B(j) => (0, strides_b[j]),
                SlotRef::Result(_) => (0, 0),
            })
            .collect();

        // Per contracted pair: (extent, stride in A, stride in B).
        let mut summed: SlotVec<(usize, usize, usize)> = SmallVec::new();
        for (ia, ib) in contr.contracted_pairs() {
            let extent = a.dims().get(ia);
            if b.dims().get(ib) != extent {
                return Err(ContractError::contraction(alloc::format!(
                    "contracted slot {} of A has extent {}, slot {} of B has {}",
                    ia,
                    extent,
                    ib,
                    b.dims().get(ib)
                )));
            }
            summed.push((extent, strides_a[ia], strides_b[ib]));
        }

        if c.dims().total() == 0 || summed.iter().any(|&(e, _, _)| e == 0) {
            return Ok(());
        }

        let data_a = a.data();
        let data_b = b.data();
        let dims_c = c.dims().clone();
        let out = c.data_mut();

        let mut idx_c: SlotVec<usize> = SmallVec::from_elem(0, dims_c.order());
        let mut idx_k: SlotVec<usize> = SmallVec::from_elem(0, summed.len());
        let mut pos_c = 0;
        loop {
            let (base_a, base_b) = idx_c
                .iter()
                .zip(free.iter())
                .fold((0, 0), |(oa, ob), (&i, &(sa, sb))| (oa + i * sa, ob + i * sb));

            let mut acc = 0.0;
            idx_k.iter_mut().for_each(|i| *i = 0);
            loop {
                let (off_a, off_b) = idx_k
                    .iter()
                    .zip(summed.iter())
                    .fold((base_a, base_b), |(oa, ob), (&i, &(_, sa, sb))| {
                        (oa + i * sa, ob + i * sb)
                    });
                acc += data_a[off_a] * data_b[off_b];
                if !advance(&mut idx_k, &summed) {
                    break;
                }
            }
            out[pos_c] += coeff * acc;

            pos_c += 1;
            if !dims_c.next_index(&mut idx_c) {
                break;
            }
        }
        Ok(())
    }
}

fn advance(idx: &mut [usize], summed: &[(usize, usize, usize)]) -> bool {
    for i in (0..idx.len()).rev() {
        idx[i] += 1;
        if idx[i] < summed[i].0 {
            return true;
        }
        idx[i] = 0;
    }
    false
}
