//! Result layout and result symmetry of a pairwise contraction.
//!
//! Both are pure functions of the descriptor and the operand layouts and
//! symmetries, so deriving them twice gives identical results.

mod layout;
mod symmetry;

pub use layout::build_result_layout;
pub use symmetry::propagate_symmetry;
