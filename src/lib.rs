//! # Symblock Contract
//!
//! Contraction of block-sparse tensors that carry permutational symmetry.
//!
//! ## Features
//!
//! - Result block layout derived from the operand layouts and the index connectivity
//! - Result symmetry propagated from the operand symmetries
//! - Deduplicated block schedule over canonical orbits only
//! - Executor that skips zero blocks and releases the schedule on every exit path
//! - Linear combinations of contractions with a memoised assignment schedule
//!
//! ## Example
//!
//! ```ignore
//! use symblock_contract::{BlockContract2, BlockTensor, parse_contraction};
//!
//! let contr = parse_contraction("ij,jk->ik")?;
//! let op = BlockContract2::new(contr, &a, &b)?;
//!
//! let mut c = BlockTensor::new(op.layout().clone());
//! op.perform(&mut c)?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;
pub mod contraction;
pub mod symmetry;
pub mod layout;
pub mod derivation;
pub mod schedule;
pub mod tensor;
pub mod kernels;
pub mod launch;

pub use error::{ContractError, ContractResult};
pub use contraction::{Contraction, SlotRef, parse_contraction};
pub use symmetry::{Orbit, OrbitList, Permutation, SymmetryElement, SymmetryGroup, Transform};
pub use layout::{BlockLayout, Dimensions};
pub use schedule::{AssignmentSchedule, BlockContraction, Schedule};
pub use tensor::{BlockTensor, BlockTensorRead, BlockTensorWrite, DenseBlock};
pub use kernels::{ContractKernel, NaiveKernel};
pub use launch::{AdditiveOperation, BlockContract2, ContractConfig, ContractionSum, ExecutionStats};
