//! Error types for block contractions.

use alloc::string::String;
use alloc::vec::Vec;

/// Errors that can occur while deriving, scheduling or executing a contraction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum ContractError {
    /// Block layouts are incompatible with the contraction, or the result
    /// layout supplied by the caller differs from the derived one.
    #[cfg_attr(feature = "std", error("layout mismatch: {message}"))]
    LayoutMismatch { message: String },

    /// The dense kernel failed while accumulating into a result block.
    #[cfg_attr(feature = "std", error("kernel failure at result block {index:?}: {message}"))]
    KernelFailure { index: Vec<usize>, message: String },

    /// The connectivity descriptor is incomplete or inconsistent.
    #[cfg_attr(feature = "std", error("invalid contraction: {message}"))]
    InvalidContraction { message: String },

    /// A permutation is not a bijection or has the wrong length.
    #[cfg_attr(feature = "std", error("invalid permutation: {message}"))]
    InvalidPermutation { message: String },

    /// A symmetry element does not fit the tensor it is applied to.
    #[cfg_attr(feature = "std", error("invalid symmetry: {message}"))]
    InvalidSymmetry { message: String },

    /// Dense block shapes disagree.
    #[cfg_attr(feature = "std", error("shape mismatch: expected {expected:?}, got {got:?}"))]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },

    /// A block or element index lies outside its dimensions.
    #[cfg_attr(feature = "std", error("index {index:?} out of bounds for dimensions {dims:?}"))]
    IndexOutOfBounds { index: Vec<usize>, dims: Vec<usize> },

    /// Invalid contraction label string.
    #[cfg_attr(feature = "std", error("parse error: {message}"))]
    ParseError { message: String },
}

impl ContractError {
    pub fn layout(message: impl Into<String>) -> Self {
        Self::LayoutMismatch {
            message: message.into(),
        }
    }

    pub fn kernel(index: &[usize], message: impl Into<String>) -> Self {
        Self::KernelFailure {
            index: index.to_vec(),
            message: message.into(),
        }
    }

    pub fn contraction(message: impl Into<String>) -> Self {
        Self::InvalidContraction {
            message: message.into(),
        }
    }

    pub fn permutation(message: impl Into<String>) -> Self {
        Self::InvalidPermutation {
            message: message.into(),
        }
    }

    pub fn symmetry(message: impl Into<String>) -> Self {
        Self::InvalidSymmetry {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    pub fn shape(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    pub fn out_of_bounds(index: &[usize], dims: &[usize]) -> Self {
        Self::IndexOutOfBounds {
            index: index.to_vec(),
            dims: dims.to_vec(),
        }
    }

    /// Returns true for errors raised because of incompatible layouts.
    pub fn is_layout_mismatch(&self) -> bool {
        matches!(self, Self::LayoutMismatch { .. })
    }

    /// Returns true for errors raised by the dense kernel.
    pub fn is_kernel_failure(&self) -> bool {
        matches!(self, Self::KernelFailure { .. })
    }
}

/// Result type for contraction operations.
pub type ContractResult<T> = core::result::Result<T, ContractError>;
