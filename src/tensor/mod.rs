//! Dense blocks and block tensors.

mod dense;
mod ctrl;
mod block_tensor;

pub use dense::DenseBlock;
pub use ctrl::{BlockTensorRead, BlockTensorWrite};
pub use block_tensor::BlockTensor;
