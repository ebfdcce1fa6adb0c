//! Index connectivity descriptors.
//!
//! Describes which slots of two operands are summed over and where the
//! remaining slots land in the result:
//! - Built pair by pair: `Contraction::new(n, m, k)` + `contract(ia, ib)`
//! - Parsed from labels: `ij,jk->ik`

mod descriptor;
mod parser;
pub mod validation;

pub use descriptor::{Contraction, SlotRef};
pub use parser::parse_contraction;
pub use validation::validate_contraction;
