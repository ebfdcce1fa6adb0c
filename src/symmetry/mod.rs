//! Block-level symmetry: permutations, transforms, groups and orbits.

mod permutation;
mod transform;
mod group;
mod orbit;

pub use permutation::{Permutation, SlotVec};
pub use transform::{SymmetryElement, Transform};
pub use group::SymmetryGroup;
pub use orbit::{Orbit, OrbitList};
