use std::fmt;

use crate::error::Result;
use crate::tensor::Tensor;

/// An operation with its parameters bound, callable on any number of images.
///
/// `Display` renders the configuration descriptor, e.g.
/// `Normalize(mean=[0.5], std=[0.1])`.
pub trait ImageOp: fmt::Display + Send + Sync {
    /// Short operation name used in logs.
    fn name(&self) -> &'static str;

    /// Run the forward transform. The input is never modified.
    fn apply(&self, image: &Tensor) -> Result<Tensor>;

    /// Vector-Jacobian product: gradient of the loss with respect to `image`,
    /// given the gradient with respect to `apply(image)`.
    fn backward(&self, image: &Tensor, grad_output: &Tensor) -> Result<Tensor>;
}

impl<T: ImageOp + ?Sized> ImageOp for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn apply(&self, image: &Tensor) -> Result<Tensor> {
        (**self).apply(image)
    }

    fn backward(&self, image: &Tensor, grad_output: &Tensor) -> Result<Tensor> {
        (**self).backward(image, grad_output)
    }
}
