//! Block contraction schedules.
//!
//! A schedule lists, for every canonical result block, the canonical operand
//! block pairs that contribute to it together with the permutations and the
//! coefficient to apply. Pairs related by symmetry are merged before any
//! kernel runs.

mod entry;
mod plan;
mod builder;
mod cost;

pub use entry::BlockContraction;
pub use plan::{AssignmentSchedule, Schedule};
pub use builder::{build_schedule, schedule_orbit_pair};
pub use cost::ScheduleCost;
