use std::fmt;

use crate::broadcast::{align_param, Anchor};
use crate::error::{LumenError, Result};
use crate::op::ImageOp;
use crate::param::Param;
use crate::tensor::{channel_axis, check_grad_shape, zip_map, zip_map3, Tensor};

fn reject_zero_std(std: &Param) -> Result<()> {
    let zero_at = match std {
        Param::Scalar(v) => (*v == 0.0).then_some(0),
        Param::Vector(vs) => vs.iter().position(|&v| v == 0.0),
        Param::Matrix(rows) => rows.iter().flatten().position(|&v| v == 0.0),
    };
    if let Some(index) = zero_at {
        return Err(LumenError::Domain(format!(
            "std contains zero at position {index}; normalize would divide by zero"
        )));
    }
    Ok(())
}

fn aligned_mean_std(
    op: &'static str,
    image: &Tensor,
    mean: &Param,
    std: &Param,
) -> Result<(Tensor, Tensor)> {
    channel_axis(op, image)?;
    let means = align_param(mean, image.shape(), Anchor::Channel, "mean")?;
    let stds = align_param(std, image.shape(), Anchor::Channel, "std")?;
    Ok((means, stds))
}

/// Normalize a (*, C, H, W) image channel-wise: `(image - mean) / std`.
///
/// `mean` and `std` are scalars, length-C sequences, or (B, C) matrices. A
/// zero anywhere in `std` is rejected with a domain error before any work is
/// done.
pub fn normalize(image: &Tensor, mean: &Param, std: &Param) -> Result<Tensor> {
    reject_zero_std(std)?;
    let (means, stds) = aligned_mean_std("normalize", image, mean, std)?;
    Ok(zip_map3(image, &means, &stds, |x, m, s| (x - m) / s))
}

/// Vector-Jacobian product of [`normalize`]: `grad_output / std`.
pub fn normalize_backward(
    image: &Tensor,
    mean: &Param,
    std: &Param,
    grad_output: &Tensor,
) -> Result<Tensor> {
    reject_zero_std(std)?;
    check_grad_shape(image.shape(), grad_output)?;
    let (_, stds) = aligned_mean_std("normalize", image, mean, std)?;
    Ok(zip_map(grad_output, &stds, |g, s| g / s))
}

/// Inverse of [`normalize`]: `image * std + mean`.
pub fn denormalize(image: &Tensor, mean: &Param, std: &Param) -> Result<Tensor> {
    let (means, stds) = aligned_mean_std("denormalize", image, mean, std)?;
    Ok(zip_map3(image, &means, &stds, |x, m, s| x * s + m))
}

/// Vector-Jacobian product of [`denormalize`]: `grad_output * std`.
pub fn denormalize_backward(
    image: &Tensor,
    mean: &Param,
    std: &Param,
    grad_output: &Tensor,
) -> Result<Tensor> {
    check_grad_shape(image.shape(), grad_output)?;
    let (_, stds) = aligned_mean_std("denormalize", image, mean, std)?;
    Ok(zip_map(grad_output, &stds, |g, s| g * s))
}

/// Channel-wise normalization with bound mean and std. See [`normalize`].
#[derive(Clone, Debug, PartialEq)]
pub struct Normalize {
    mean: Param,
    std: Param,
}

impl Normalize {
    pub fn new(mean: impl Into<Param>, std: impl Into<Param>) -> Self {
        Self {
            mean: mean.into(),
            std: std.into(),
        }
    }

    pub fn mean(&self) -> &Param {
        &self.mean
    }

    pub fn std(&self) -> &Param {
        &self.std
    }

    /// The matching [`Denormalize`] that undoes this normalization.
    pub fn inverse(&self) -> Denormalize {
        Denormalize::new(self.mean.clone(), self.std.clone())
    }
}

impl ImageOp for Normalize {
    fn name(&self) -> &'static str {
        "Normalize"
    }

    fn apply(&self, image: &Tensor) -> Result<Tensor> {
        normalize(image, &self.mean, &self.std)
    }

    fn backward(&self, image: &Tensor, grad_output: &Tensor) -> Result<Tensor> {
        normalize_backward(image, &self.mean, &self.std, grad_output)
    }
}

impl fmt::Display for Normalize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Normalize(mean={}, std={})", self.mean, self.std)
    }
}

/// Inverse of [`Normalize`]. See [`denormalize`].
#[derive(Clone, Debug, PartialEq)]
pub struct Denormalize {
    mean: Param,
    std: Param,
}

impl Denormalize {
    pub fn new(mean: impl Into<Param>, std: impl Into<Param>) -> Self {
        Self {
            mean: mean.into(),
            std: std.into(),
        }
    }

    pub fn mean(&self) -> &Param {
        &self.mean
    }

    pub fn std(&self) -> &Param {
        &self.std
    }
}

impl ImageOp for Denormalize {
    fn name(&self) -> &'static str {
        "Denormalize"
    }

    fn apply(&self, image: &Tensor) -> Result<Tensor> {
        denormalize(image, &self.mean, &self.std)
    }

    fn backward(&self, image: &Tensor, grad_output: &Tensor) -> Result<Tensor> {
        denormalize_backward(image, &self.mean, &self.std, grad_output)
    }
}

impl fmt::Display for Denormalize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Denormalize(mean={}, std={})", self.mean, self.std)
    }
}
