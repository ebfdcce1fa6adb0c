//! Dense contraction kernels.
//!
//! A kernel contracts one block of `A` with one block of `B` and accumulates
//! the scaled product into one block of `C`. The schedule executor only ever
//! talks to the [`ContractKernel`] trait, so other back ends plug in here.

mod naive;

pub use naive::NaiveKernel;

use crate::contraction::Contraction;
use crate::error::ContractResult;
use crate::tensor::DenseBlock;

/// Dense block contraction `c += coeff * contract(a, b)`.
///
/// Implementations are not required to leave `c` untouched when they fail.
pub trait ContractKernel {
    fn contract(
        &self,
        contr: &Contraction,
        a: &DenseBlock,
        b: &DenseBlock,
        c: &mut DenseBlock,
        coeff: f64,
    ) -> ContractResult<()>;
}

impl<K: ContractKernel + ?Sized> ContractKernel for &K {
    fn contract(
        &self,
        contr: &Contraction,
        a: &DenseBlock,
        b: &DenseBlock,
        c: &mut DenseBlock,
        coeff: f64,
    ) -> ContractResult<()> {
        (**self).contract(contr, a, b, c, coeff)
    }
}
