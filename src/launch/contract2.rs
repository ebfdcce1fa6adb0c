//! Contraction of two block tensors.

use core::fmt;

use crate::contraction::{Contraction, validate_contraction};
use crate::derivation::{build_result_layout, propagate_symmetry};
use crate::error::{ContractError, ContractResult};
use crate::kernels::{ContractKernel, NaiveKernel};
use crate::layout::BlockLayout;
use crate::schedule::{AssignmentSchedule, Schedule, ScheduleCost, build_schedule};
use crate::symmetry::SymmetryGroup;
use crate::tensor::{BlockTensorRead, BlockTensorWrite};

use super::additive::AdditiveOperation;
use super::config::ContractConfig;
use super::executor::{ExecutionStats, execute_schedule};

/// Contraction `C = A * B` of two block tensors with symmetry.
///
/// The result layout and symmetry are derived once at construction. Every
/// `perform` builds a fresh schedule against the current operand symmetries,
/// executes it and drops it before returning, on success and on error alike.
///
/// # Example
///
/// ```ignore
/// let op = BlockContract2::new(parse_contraction("ij,jk->ik")?, &a, &b)?;
/// let mut c = BlockTensor::new(op.layout().clone());
/// op.perform(&mut c)?;
/// op.perform_add(&mut c, 0.5)?;
/// ```
pub struct BlockContract2<'a, K: ContractKernel = NaiveKernel> {
    contr: Contraction,
    a: &'a dyn BlockTensorRead,
    b: &'a dyn BlockTensorRead,
    layout: BlockLayout,
    symmetry: SymmetryGroup,
    kernel: K,
    config: ContractConfig,
}

impl<'a> BlockContract2<'a, NaiveKernel> {
    /// Derives the result layout and symmetry of contracting `a` with `b`.
    ///
    /// Fails with `LayoutMismatch` if the contracted slots are split
    /// differently in the two operands.
    #[tracing::instrument(level = "debug", skip_all, fields(order_a = contr.order_a(), order_b = contr.order_b()))]
    pub fn new(
        contr: Contraction,
        a: &'a dyn BlockTensorRead,
        b: &'a dyn BlockTensorRead,
    ) -> ContractResult<Self> {
        validate_contraction(&contr)?;
        let layout = build_result_layout(&contr, a.layout(), b.layout())?;
        let symmetry = propagate_symmetry(&contr, &layout, a.symmetry(), b.symmetry())?;
        tracing::debug!(
            order_c = layout.order(),
            result_blocks = layout.block_dims().total(),
            symmetry_elements = symmetry.len(),
            "derived result layout and symmetry"
        );
        Ok(Self {
            contr,
            a,
            b,
            layout,
            symmetry,
            kernel: NaiveKernel,
            config: ContractConfig::default(),
        })
    }
}

impl<'a, K: ContractKernel> BlockContract2<'a, K> {
    /// Replaces the dense kernel.
    pub fn with_kernel<K2: ContractKernel>(self, kernel: K2) -> BlockContract2<'a, K2> {
        BlockContract2 {
            contr: self.contr,
            a: self.a,
            b: self.b,
            layout: self.layout,
            symmetry: self.symmetry,
            kernel,
            config: self.config,
        }
    }

    pub fn with_config(mut self, config: ContractConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn contraction(&self) -> &Contraction {
        &self.contr
    }

    #[inline]
    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    #[inline]
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Derived block layout of the result.
    #[inline]
    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    /// Derived symmetry of the result.
    #[inline]
    pub fn symmetry(&self) -> &SymmetryGroup {
        &self.symmetry
    }

    /// Builds the schedule against the derived result symmetry.
    pub fn schedule(&self) -> ContractResult<Schedule> {
        self.schedule_for(&self.symmetry)
    }

    /// Estimated work of the schedule against the derived result symmetry.
    pub fn cost(&self) -> ContractResult<ScheduleCost> {
        let schedule = self.schedule()?;
        Ok(ScheduleCost::estimate(
            &schedule,
            &self.contr,
            self.a.layout(),
            self.b.layout(),
            &self.layout,
        ))
    }

    /// Canonical result blocks with at least one contribution.
    pub fn assignment_schedule(&self) -> ContractResult<AssignmentSchedule> {
        let schedule = self.schedule()?;
        Ok(AssignmentSchedule::from_schedule(self.layout.block_dims(), &schedule))
    }

    /// Overwrites `c` with `A * B`.
    ///
    /// All blocks of `c` are dropped first. Unless disabled in the config,
    /// `c` receives the derived symmetry.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn perform(&self, c: &mut dyn BlockTensorWrite) -> ContractResult<ExecutionStats> {
        self.check_layout(c)?;
        let symmetry = if self.config.install_result_symmetry {
            self.symmetry.clone()
        } else {
            self.check_symmetry(c)?;
            c.symmetry().clone()
        };
        c.install_symmetry(symmetry)?;
        self.run(c, 1.0)
    }

    /// Adds `factor * A * B` to `c`.
    ///
    /// Only the canonical blocks of `c` under its current symmetry are
    /// written, so that symmetry must be a subgroup of the derived one.
    #[tracing::instrument(level = "debug", skip_all, fields(factor = factor))]
    pub fn perform_add(
        &self,
        c: &mut dyn BlockTensorWrite,
        factor: f64,
    ) -> ContractResult<ExecutionStats> {
        self.check_layout(c)?;
        self.check_symmetry(c)?;
        self.run(c, factor)
    }

    fn run(&self, c: &mut dyn BlockTensorWrite, factor: f64) -> ContractResult<ExecutionStats> {
        let schedule = self.schedule_for(c.symmetry())?;
        let cost = ScheduleCost::estimate(
            &schedule,
            &self.contr,
            self.a.layout(),
            self.b.layout(),
            &self.layout,
        );
        tracing::debug!(
            result_blocks = schedule.len(),
            kernel_calls = cost.kernel_calls,
            flops = cost.flops,
            "executing schedule"
        );
        execute_schedule(&schedule, &self.contr, self.a, self.b, c, &self.kernel, factor)
    }

    fn schedule_for(&self, sym_c: &SymmetryGroup) -> ContractResult<Schedule> {
        build_schedule(
            &self.contr,
            self.a,
            self.b,
            &self.layout,
            sym_c,
            self.config.zero_threshold,
        )
    }

    fn check_layout(&self, c: &dyn BlockTensorWrite) -> ContractResult<()> {
        if !c.layout().matches(&self.layout) {
            return Err(ContractError::layout(alloc::format!(
                "result tensor has dims {:?}, expected {:?} with the derived block structure",
                c.layout().dims().as_slice(),
                self.layout.dims().as_slice()
            )));
        }
        Ok(())
    }

    fn check_symmetry(&self, c: &dyn BlockTensorWrite) -> ContractResult<()> {
        if !c.symmetry().is_subgroup_of(&self.symmetry) {
            return Err(ContractError::symmetry(
                "result tensor symmetry is not contained in the symmetry of the contraction",
            ));
        }
        Ok(())
    }
}

impl<K: ContractKernel> fmt::Debug for BlockContract2<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockContract2")
            .field("contr", &self.contr)
            .field("layout", &self.layout)
            .field("symmetry", &self.symmetry)
            .field("config", &self.config)
            .finish()
    }
}

impl<K: ContractKernel> AdditiveOperation for BlockContract2<'_, K> {
    fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    fn symmetry(&self) -> &SymmetryGroup {
        &self.symmetry
    }

    fn assignment_schedule(&self) -> ContractResult<AssignmentSchedule> {
        BlockContract2::assignment_schedule(self)
    }

    fn perform(&self, c: &mut dyn BlockTensorWrite) -> ContractResult<ExecutionStats> {
        BlockContract2::perform(self, c)
    }

    fn perform_add(
        &self,
        c: &mut dyn BlockTensorWrite,
        factor: f64,
    ) -> ContractResult<ExecutionStats> {
        BlockContract2::perform_add(self, c, factor)
    }
}
