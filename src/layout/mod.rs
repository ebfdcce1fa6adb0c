//! Block index spaces of block tensors.

mod dimensions;
mod block_layout;

pub use dimensions::Dimensions;
pub use block_layout::BlockLayout;
