//! Linear combinations of additive operations.

use alloc::vec::Vec;
use core::cell::OnceCell;

use crate::error::{ContractError, ContractResult};
use crate::layout::BlockLayout;
use crate::schedule::AssignmentSchedule;
use crate::symmetry::{OrbitList, SymmetryGroup};
use crate::tensor::BlockTensorWrite;

use super::additive::AdditiveOperation;
use super::executor::ExecutionStats;

/// `C = sum_i coeff_i * op_i`.
///
/// The symmetry of the sum is the intersection of the symmetries of its
/// terms. The assignment schedule is memoised: it is computed on first access
/// and discarded whenever a term is added or [`ContractionSum::invalidate`]
/// is called.
pub struct ContractionSum<'a> {
    layout: BlockLayout,
    symmetry: SymmetryGroup,
    ops: Vec<(&'a dyn AdditiveOperation, f64)>,
    schedule: OnceCell<AssignmentSchedule>,
}

impl<'a> ContractionSum<'a> {
    /// Starts a sum with a single term.
    pub fn new(op: &'a dyn AdditiveOperation, coeff: f64) -> Self {
        let mut sum = Self {
            layout: op.layout().clone(),
            symmetry: op.symmetry().clone(),
            ops: Vec::new(),
            schedule: OnceCell::new(),
        };
        if coeff != 0.0 {
            sum.ops.push((op, coeff));
        }
        sum
    }

    /// Adds a term.
    ///
    /// The layout of `op` must have the same block structure as the sum.
    /// Terms with a zero coefficient are ignored.
    pub fn add_op(&mut self, op: &'a dyn AdditiveOperation, coeff: f64) -> ContractResult<()> {
        if !self.layout.matches(op.layout()) {
            return Err(ContractError::layout(
                "operation added to a sum has a different block structure",
            ));
        }
        if coeff == 0.0 {
            return Ok(());
        }

        self.symmetry = if self.ops.is_empty() {
            op.symmetry().clone()
        } else {
            SymmetryGroup::intersection(&self.symmetry, op.symmetry())?
        };
        self.ops.push((op, coeff));
        self.invalidate();
        Ok(())
    }

    /// Drops the memoised assignment schedule.
    ///
    /// Call this after the symmetry of an operand of any term has changed.
    pub fn invalidate(&mut self) {
        self.schedule.take();
    }

    /// Returns true if the assignment schedule is currently memoised.
    pub fn is_schedule_cached(&self) -> bool {
        self.schedule.get().is_some()
    }

    #[inline]
    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    #[inline]
    pub fn symmetry(&self) -> &SymmetryGroup {
        &self.symmetry
    }

    /// Number of terms with a non-zero coefficient.
    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Canonical blocks of the sum that receive a contribution from at least
    /// one term, computed on first access after invalidation.
    pub fn schedule(&self) -> ContractResult<&AssignmentSchedule> {
        if let Some(schedule) = self.schedule.get() {
            return Ok(schedule);
        }
        let schedule = self.make_schedule()?;
        Ok(self.schedule.get_or_init(|| schedule))
    }

    fn make_schedule(&self) -> ContractResult<AssignmentSchedule> {
        let dims = self.layout.block_dims();
        let orbits = OrbitList::new(&self.symmetry, &dims);

        let mut terms = Vec::with_capacity(self.ops.len());
        for (op, _) in &self.ops {
            terms.push((OrbitList::new(op.symmetry(), &dims), op.assignment_schedule()?));
        }

        let mut schedule = AssignmentSchedule::new(dims);
        for abs in orbits.iter() {
            let nonzero = terms.iter().any(|(op_orbits, op_schedule)| {
                if op_orbits.contains(abs) {
                    return op_schedule.contains(abs);
                }
                let orbit = op_orbits.orbit(abs);
                orbit.is_allowed() && op_schedule.contains(orbit.abs_canonical_index())
            });
            if nonzero {
                schedule.insert(abs);
            }
        }
        tracing::debug!(
            terms = self.ops.len(),
            blocks = schedule.len(),
            "assignment schedule of sum rebuilt"
        );
        Ok(schedule)
    }

    /// Overwrites `c` with the sum.
    ///
    /// `c` receives the symmetry of the sum; every term is then accumulated
    /// into it.
    #[tracing::instrument(level = "debug", skip_all, fields(terms = self.ops.len()))]
    pub fn perform(&self, c: &mut dyn BlockTensorWrite) -> ContractResult<ExecutionStats> {
        self.check_layout(c)?;
        c.install_symmetry(self.symmetry.clone())?;
        let mut stats = ExecutionStats::default();
        for (op, coeff) in &self.ops {
            stats += op.perform_add(c, *coeff)?;
        }
        Ok(stats)
    }

    /// Adds `factor` times the sum to `c`.
    #[tracing::instrument(level = "debug", skip_all, fields(terms = self.ops.len(), factor = factor))]
    pub fn perform_add(
        &self,
        c: &mut dyn BlockTensorWrite,
        factor: f64,
    ) -> ContractResult<ExecutionStats> {
        self.check_layout(c)?;
        let mut stats = ExecutionStats::default();
        for (op, coeff) in &self.ops {
            stats += op.perform_add(c, factor * coeff)?;
        }
        Ok(stats)
    }

    fn check_layout(&self, c: &dyn BlockTensorWrite) -> ContractResult<()> {
        if !c.layout().matches(&self.layout) {
            return Err(ContractError::layout(
                "result tensor does not have the block structure of the sum",
            ));
        }
        Ok(())
    }
}

impl AdditiveOperation for ContractionSum<'_> {
    fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    fn symmetry(&self) -> &SymmetryGroup {
        &self.symmetry
    }

    fn assignment_schedule(&self) -> ContractResult<AssignmentSchedule> {
        self.schedule().cloned()
    }

    fn perform(&self, c: &mut dyn BlockTensorWrite) -> ContractResult<ExecutionStats> {
        ContractionSum::perform(self, c)
    }

    fn perform_add(
        &self,
        c: &mut dyn BlockTensorWrite,
        factor: f64,
    ) -> ContractResult<ExecutionStats> {
        ContractionSum::perform_add(self, c, factor)
    }
}
