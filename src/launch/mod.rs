//! Execution of block contractions.
//!
//! Provides the high-level API: [`BlockContract2`] for a single pairwise
//! contraction and [`ContractionSum`] for linear combinations.

mod config;
mod executor;
mod additive;
mod contract2;
mod sum;

pub use config::ContractConfig;
pub use executor::{ExecutionStats, execute_schedule};
pub use additive::AdditiveOperation;
pub use contract2::BlockContract2;
pub use sum::ContractionSum;
