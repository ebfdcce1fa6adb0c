//! Cost estimate of a block contraction schedule.

use crate::contraction::Contraction;
use crate::layout::BlockLayout;

use super::plan::Schedule;

/// Work implied by a schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleCost {
    /// Number of kernel invocations.
    pub kernel_calls: u64,
    /// Number of floating-point operations.
    pub flops: u64,
    /// Memory traffic in elements.
    pub memory: u64,
}

impl ScheduleCost {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Estimates the cost of executing `schedule`, assuming no operand block
    /// is zero.
    pub fn estimate(
        schedule: &Schedule,
        contr: &Contraction,
        layout_a: &BlockLayout,
        layout_b: &BlockLayout,
        layout_c: &BlockLayout,
    ) -> Self {
        let dims_a = layout_a.block_dims();
        let dims_b = layout_b.block_dims();
        let dims_c = layout_c.block_dims();
        let pairs = contr.contracted_pairs();

        let mut cost = Self::zero();
        for (abs_c, list) in schedule.iter() {
            let size_c = layout_c.block_shape(&dims_c.index(abs_c)).total() as u64;
            for entry in list {
                let shape_a = layout_a.block_shape(&dims_a.index(entry.abs_index_a));
                let size_a = shape_a.total() as u64;
                let size_b = layout_b
                    .block_shape(&dims_b.index(entry.abs_index_b))
                    .total() as u64;
                // Extent of slot i of the permuted block is that of slot
                // perm_a.source(i) of the canonical block.
                let summed: u64 = pairs
                    .iter()
                    .map(|&(ia, _)| shape_a.get(entry.perm_a.source(ia)) as u64)
                    .product();

                cost = cost
                    + Self {
                        kernel_calls: 1,
                        flops: size_c.saturating_mul(summed).saturating_mul(2),
                        memory: size_a + size_b + size_c,
                    };
            }
        }
        cost
    }
}

impl core::ops::Add for ScheduleCost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            kernel_calls: self.kernel_calls.saturating_add(rhs.kernel_calls),
            flops: self.flops.saturating_add(rhs.flops),
            memory: self.memory.saturating_add(rhs.memory),
        }
    }
}
