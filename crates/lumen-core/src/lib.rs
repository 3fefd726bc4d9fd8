pub mod broadcast;
pub mod color;
pub mod consts;
pub mod error;
pub mod geometry;
pub mod grad;
pub mod op;
pub mod param;
pub mod pipeline;
pub mod tensor;

pub use error::{LumenError, Result};
pub use op::ImageOp;
pub use param::Param;
pub use tensor::Tensor;
