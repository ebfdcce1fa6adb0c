//! Execution of block contraction schedules.

use alloc::vec::Vec;

use crate::contraction::Contraction;
use crate::error::{ContractError, ContractResult};
use crate::kernels::ContractKernel;
use crate::schedule::{BlockContraction, Schedule};
use crate::tensor::{BlockTensorRead, BlockTensorWrite};

/// Counters collected while executing a schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Result blocks that were requested for writing.
    pub blocks_written: usize,
    /// Dense kernel invocations.
    pub kernel_calls: usize,
    /// Entries skipped because an operand block is zero.
    pub skipped_entries: usize,
}

impl core::ops::AddAssign for ExecutionStats {
    fn add_assign(&mut self, rhs: Self) {
        self.blocks_written += rhs.blocks_written;
        self.kernel_calls += rhs.kernel_calls;
        self.skipped_entries += rhs.skipped_entries;
    }
}

/// Runs every entry of `schedule`, accumulating `factor * entry.coeff` times
/// the permuted block contraction into the result blocks of `c`.
///
/// Result blocks are processed in increasing absolute index. The first kernel
/// error aborts execution and is returned as a `KernelFailure` carrying the
/// result block index; blocks finished before it keep their values. The
/// block being written when the kernel fails has already been requested and
/// may hold a partial sum, depending on how far the kernel got.
pub fn execute_schedule<K: ContractKernel + ?Sized>(
    schedule: &Schedule,
    contr: &Contraction,
    a: &dyn BlockTensorRead,
    b: &dyn BlockTensorRead,
    c: &mut dyn BlockTensorWrite,
    kernel: &K,
    factor: f64,
) -> ContractResult<ExecutionStats> {
    let dims_c = c.block_dims();
    let mut stats = ExecutionStats::default();
    for (abs_c, list) in schedule.iter() {
        let idx_c: Vec<usize> = dims_c.index(abs_c).to_vec();
        contract_block(list, &idx_c, contr, a, b, c, kernel, factor, &mut stats)?;
    }
    tracing::debug!(
        blocks_written = stats.blocks_written,
        kernel_calls = stats.kernel_calls,
        skipped_entries = stats.skipped_entries,
        "schedule executed"
    );
    Ok(stats)
}

/// Accumulates all entries of one result block.
#[allow(clippy::too_many_arguments)]
fn contract_block<K: ContractKernel + ?Sized>(
    list: &[BlockContraction],
    idx_c: &[usize],
    contr: &Contraction,
    a: &dyn BlockTensorRead,
    b: &dyn BlockTensorRead,
    c: &mut dyn BlockTensorWrite,
    kernel: &K,
    factor: f64,
    stats: &mut ExecutionStats,
) -> ContractResult<()> {
    let dims_a = a.block_dims();
    let dims_b = b.block_dims();

    let block_c = c.request_block_mut(idx_c)?;
    stats.blocks_written += 1;

    for entry in list {
        let idx_a = dims_a.index(entry.abs_index_a);
        let idx_b = dims_b.index(entry.abs_index_b);
        if a.is_zero_block(&idx_a) || b.is_zero_block(&idx_b) {
            stats.skipped_entries += 1;
            continue;
        }

        let block_a = a.request_block(&idx_a)?;
        let block_b = b.request_block(&idx_b)?;

        let mut local = contr.clone();
        local.permute_ab(&entry.perm_a, &entry.perm_b)?;

        tracing::trace!(
            block_c = ?idx_c,
            block_a = ?idx_a.as_slice(),
            block_b = ?idx_b.as_slice(),
            coeff = entry.coeff * factor,
            "contracting block pair"
        );
        if let Err(err) = kernel.contract(&local, &block_a, &block_b, block_c, entry.coeff * factor) {
            tracing::warn!(block_c = ?idx_c, error = ?err, "kernel failed, aborting contraction");
            return Err(ContractError::kernel(idx_c, alloc::format!("{:?}", err)));
        }
        stats.kernel_calls += 1;
    }
    Ok(())
}
