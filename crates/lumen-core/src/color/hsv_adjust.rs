//! Saturation and hue adjustment through the HSV representation.

use std::fmt;

use ndarray::{ArrayView1, ArrayViewMut1, Axis, Zip};

use crate::broadcast::{align_param, aligned_shape, Anchor};
use crate::consts::PARALLEL_ELEMENT_THRESHOLD;
use crate::error::{LumenError, Result};
use crate::op::ImageOp;
use crate::param::Param;
use crate::tensor::{check_grad_shape, rgb_channel_axis, Tensor};

use super::hsv::{adjust_pixel, adjust_pixel_value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HsvTarget {
    Saturation,
    Hue,
}

impl HsvTarget {
    fn op_name(self) -> &'static str {
        match self {
            Self::Saturation => "adjust_saturation",
            Self::Hue => "adjust_hue",
        }
    }

    /// Per-pixel (saturation factor, hue shift in turns).
    #[inline]
    fn pixel_args(self, factor: f32) -> (f32, f32) {
        match self {
            Self::Saturation => (factor, 0.0),
            Self::Hue => (1.0, factor),
        }
    }
}

/// Expand `factor` to the image shape, one value per pixel: the factor must
/// be constant along the channel axis.
fn pixel_factors(image: &Tensor, factor: &Param, channel_axis: usize) -> Result<Tensor> {
    let values = factor.to_tensor("factor")?;
    let padded = aligned_shape(values.shape(), image.shape(), Anchor::Leading, "factor")?;
    if padded[channel_axis] != 1 {
        return Err(LumenError::ShapeMismatch {
            arg: "factor",
            axis: channel_axis,
            expected: 1,
            actual: padded[channel_axis],
        });
    }
    align_param(factor, image.shape(), Anchor::Leading, "factor")
}

fn adjust_forward(image: &Tensor, factor: &Param, target: HsvTarget) -> Result<Tensor> {
    let axis = rgb_channel_axis(target.op_name(), image)?;
    let factors = pixel_factors(image, factor, axis)?;

    let mut out = Tensor::zeros(image.raw_dim());
    let zip = Zip::from(out.lanes_mut(Axis(axis)))
        .and(image.lanes(Axis(axis)))
        .and(factors.lanes(Axis(axis)));
    let kernel = |mut o: ArrayViewMut1<f32>, px: ArrayView1<f32>, f: ArrayView1<f32>| {
        let (sat, hue) = target.pixel_args(f[0]);
        let rgb = adjust_pixel_value([px[0], px[1], px[2]], sat, hue);
        o[0] = rgb[0];
        o[1] = rgb[1];
        o[2] = rgb[2];
    };
    if image.len() >= PARALLEL_ELEMENT_THRESHOLD {
        zip.par_for_each(kernel);
    } else {
        zip.for_each(kernel);
    }
    Ok(out)
}

fn adjust_backward(
    image: &Tensor,
    factor: &Param,
    grad_output: &Tensor,
    target: HsvTarget,
) -> Result<Tensor> {
    let axis = rgb_channel_axis(target.op_name(), image)?;
    check_grad_shape(image.shape(), grad_output)?;
    let factors = pixel_factors(image, factor, axis)?;

    let mut grad_input = Tensor::zeros(image.raw_dim());
    let zip = Zip::from(grad_input.lanes_mut(Axis(axis)))
        .and(image.lanes(Axis(axis)))
        .and(factors.lanes(Axis(axis)))
        .and(grad_output.lanes(Axis(axis)));
    let kernel = |mut gi: ArrayViewMut1<f32>,
                  px: ArrayView1<f32>,
                  f: ArrayView1<f32>,
                  go: ArrayView1<f32>| {
        let (sat, hue) = target.pixel_args(f[0]);
        let (_, jac) = adjust_pixel([px[0], px[1], px[2]], sat, hue);
        for i in 0..3 {
            gi[i] = (0..3).map(|c| go[c] * jac[c][i]).sum();
        }
    };
    if image.len() >= PARALLEL_ELEMENT_THRESHOLD {
        zip.par_for_each(kernel);
    } else {
        zip.for_each(kernel);
    }
    Ok(grad_input)
}

/// Scale the saturation of a (*, 3, H, W) RGB image.
///
/// Saturation is multiplied by `factor` and clamped to [0, 1]; hue and value
/// are untouched. `factor` is a scalar or one value per leading batch element;
/// a factor that varies along the channel axis is rejected.
pub fn adjust_saturation(image: &Tensor, factor: &Param) -> Result<Tensor> {
    adjust_forward(image, factor, HsvTarget::Saturation)
}

/// Vector-Jacobian product of [`adjust_saturation`] with respect to `image`.
pub fn adjust_saturation_backward(
    image: &Tensor,
    factor: &Param,
    grad_output: &Tensor,
) -> Result<Tensor> {
    adjust_backward(image, factor, grad_output, HsvTarget::Saturation)
}

/// Rotate the hue of a (*, 3, H, W) RGB image by `factor` full turns.
///
/// A factor of 0 or any integer leaves the image unchanged.
pub fn adjust_hue(image: &Tensor, factor: &Param) -> Result<Tensor> {
    adjust_forward(image, factor, HsvTarget::Hue)
}

/// Vector-Jacobian product of [`adjust_hue`] with respect to `image`.
pub fn adjust_hue_backward(image: &Tensor, factor: &Param, grad_output: &Tensor) -> Result<Tensor> {
    adjust_backward(image, factor, grad_output, HsvTarget::Hue)
}

/// Saturation scaling with a bound factor. See [`adjust_saturation`].
#[derive(Clone, Debug, PartialEq)]
pub struct AdjustSaturation {
    factor: Param,
}

impl AdjustSaturation {
    pub fn new(factor: impl Into<Param>) -> Self {
        Self {
            factor: factor.into(),
        }
    }

    pub fn factor(&self) -> &Param {
        &self.factor
    }
}

impl ImageOp for AdjustSaturation {
    fn name(&self) -> &'static str {
        "AdjustSaturation"
    }

    fn apply(&self, image: &Tensor) -> Result<Tensor> {
        adjust_saturation(image, &self.factor)
    }

    fn backward(&self, image: &Tensor, grad_output: &Tensor) -> Result<Tensor> {
        adjust_saturation_backward(image, &self.factor, grad_output)
    }
}

impl fmt::Display for AdjustSaturation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdjustSaturation(factor={})", self.factor)
    }
}

/// Hue rotation with a bound factor in full turns. See [`adjust_hue`].
#[derive(Clone, Debug, PartialEq)]
pub struct AdjustHue {
    factor: Param,
}

impl AdjustHue {
    pub fn new(factor: impl Into<Param>) -> Self {
        Self {
            factor: factor.into(),
        }
    }

    pub fn factor(&self) -> &Param {
        &self.factor
    }
}

impl ImageOp for AdjustHue {
    fn name(&self) -> &'static str {
        "AdjustHue"
    }

    fn apply(&self, image: &Tensor) -> Result<Tensor> {
        adjust_hue(image, &self.factor)
    }

    fn backward(&self, image: &Tensor, grad_output: &Tensor) -> Result<Tensor> {
        adjust_hue_backward(image, &self.factor, grad_output)
    }
}

impl fmt::Display for AdjustHue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdjustHue(factor={})", self.factor)
    }
}
