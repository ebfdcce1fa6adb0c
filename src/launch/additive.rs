//! Operations that can write or accumulate into a block tensor.

use crate::error::ContractResult;
use crate::layout::BlockLayout;
use crate::schedule::AssignmentSchedule;
use crate::symmetry::SymmetryGroup;
use crate::tensor::BlockTensorWrite;

use super::executor::ExecutionStats;

/// A block tensor operation whose result can be added to an existing tensor.
pub trait AdditiveOperation {
    /// Block layout of the result.
    fn layout(&self) -> &BlockLayout;

    /// Symmetry of the result.
    fn symmetry(&self) -> &SymmetryGroup;

    /// Canonical result blocks the operation writes.
    fn assignment_schedule(&self) -> ContractResult<AssignmentSchedule>;

    /// Overwrites `c` with the result.
    fn perform(&self, c: &mut dyn BlockTensorWrite) -> ContractResult<ExecutionStats>;

    /// Adds `factor` times the result to `c`.
    fn perform_add(&self, c: &mut dyn BlockTensorWrite, factor: f64)
    -> ContractResult<ExecutionStats>;
}
