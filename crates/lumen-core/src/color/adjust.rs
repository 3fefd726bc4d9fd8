//! Brightness, contrast and gamma: elementwise gain adjustments clamped to [0, 1].

use std::fmt;

use crate::broadcast::{align_param, Anchor};
use crate::error::Result;
use crate::op::ImageOp;
use crate::param::Param;
use crate::tensor::{check_grad_shape, zip_map, zip_map3, zip_map4, Tensor};

/// Clamp-gradient mask: the gradient passes where the unclamped value lies
/// inside [0, 1], bounds included.
#[inline]
fn passes(y: f32) -> bool {
    (0.0..=1.0).contains(&y)
}

fn scale_clamped(image: &Tensor, factor: &Param) -> Result<Tensor> {
    let factors = align_param(factor, image.shape(), Anchor::Leading, "factor")?;
    Ok(zip_map(image, &factors, |x, f| (f * x).clamp(0.0, 1.0)))
}

fn scale_clamped_backward(image: &Tensor, factor: &Param, grad_output: &Tensor) -> Result<Tensor> {
    check_grad_shape(image.shape(), grad_output)?;
    let factors = align_param(factor, image.shape(), Anchor::Leading, "factor")?;
    Ok(zip_map3(image, &factors, grad_output, |x, f, g| {
        if passes(f * x) {
            g * f
        } else {
            0.0
        }
    }))
}

/// Multiply every sample by `factor` and clamp to [0, 1].
///
/// `factor` is a scalar or a sequence matched against the leading image
/// dimensions, e.g. one factor per batch element of a (B, C, H, W) image.
pub fn adjust_brightness(image: &Tensor, factor: &Param) -> Result<Tensor> {
    scale_clamped(image, factor)
}

/// Vector-Jacobian product of [`adjust_brightness`]; zero where the output clamped.
pub fn adjust_brightness_backward(
    image: &Tensor,
    factor: &Param,
    grad_output: &Tensor,
) -> Result<Tensor> {
    scale_clamped_backward(image, factor, grad_output)
}

/// Multiply every sample by `factor` and clamp to [0, 1].
///
/// This is a pure linear gain, numerically identical to
/// [`adjust_brightness`]. It does not pivot around mid-grey or the image mean
/// the way conventional contrast curves do.
pub fn adjust_contrast(image: &Tensor, factor: &Param) -> Result<Tensor> {
    scale_clamped(image, factor)
}

/// Vector-Jacobian product of [`adjust_contrast`]; zero where the output clamped.
pub fn adjust_contrast_backward(
    image: &Tensor,
    factor: &Param,
    grad_output: &Tensor,
) -> Result<Tensor> {
    scale_clamped_backward(image, factor, grad_output)
}

/// Gamma correction: `clamp(gain * image^gamma, 0, 1)`.
///
/// `gamma` and `gain` broadcast like the brightness factor. A gamma of 0
/// maps every sample to `gain` (0^0 is taken as 1).
pub fn adjust_gamma(image: &Tensor, gamma: &Param, gain: &Param) -> Result<Tensor> {
    let gammas = align_param(gamma, image.shape(), Anchor::Leading, "gamma")?;
    let gains = align_param(gain, image.shape(), Anchor::Leading, "gain")?;
    Ok(zip_map3(image, &gammas, &gains, |x, g, k| {
        (k * x.powf(g)).clamp(0.0, 1.0)
    }))
}

/// Vector-Jacobian product of [`adjust_gamma`].
///
/// Zero where the output clamped, where `gamma` is 0, and where the upstream
/// gradient is 0. At `image == 0` with `gamma < 1` the slope is unbounded and
/// the gradient is taken as 0.
pub fn adjust_gamma_backward(
    image: &Tensor,
    gamma: &Param,
    gain: &Param,
    grad_output: &Tensor,
) -> Result<Tensor> {
    check_grad_shape(image.shape(), grad_output)?;
    let gammas = align_param(gamma, image.shape(), Anchor::Leading, "gamma")?;
    let gains = align_param(gain, image.shape(), Anchor::Leading, "gain")?;
    Ok(zip_map4(image, &gammas, &gains, grad_output, |x, g, k, go| {
        if go == 0.0 || g == 0.0 || (x == 0.0 && g < 1.0) || !passes(k * x.powf(g)) {
            return 0.0;
        }
        go * k * g * x.powf(g - 1.0)
    }))
}

/// Brightness gain with a bound factor. See [`adjust_brightness`].
#[derive(Clone, Debug, PartialEq)]
pub struct AdjustBrightness {
    factor: Param,
}

impl AdjustBrightness {
    pub fn new(factor: impl Into<Param>) -> Self {
        Self {
            factor: factor.into(),
        }
    }

    pub fn factor(&self) -> &Param {
        &self.factor
    }
}

impl ImageOp for AdjustBrightness {
    fn name(&self) -> &'static str {
        "AdjustBrightness"
    }

    fn apply(&self, image: &Tensor) -> Result<Tensor> {
        adjust_brightness(image, &self.factor)
    }

    fn backward(&self, image: &Tensor, grad_output: &Tensor) -> Result<Tensor> {
        adjust_brightness_backward(image, &self.factor, grad_output)
    }
}

impl fmt::Display for AdjustBrightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdjustBrightness(factor={})", self.factor)
    }
}

/// Linear-gain contrast. See [`adjust_contrast`].
#[derive(Clone, Debug, PartialEq)]
pub struct AdjustContrast {
    factor: Param,
}

impl AdjustContrast {
    pub fn new(factor: impl Into<Param>) -> Self {
        Self {
            factor: factor.into(),
        }
    }

    pub fn factor(&self) -> &Param {
        &self.factor
    }
}

impl ImageOp for AdjustContrast {
    fn name(&self) -> &'static str {
        "AdjustContrast"
    }

    fn apply(&self, image: &Tensor) -> Result<Tensor> {
        adjust_contrast(image, &self.factor)
    }

    fn backward(&self, image: &Tensor, grad_output: &Tensor) -> Result<Tensor> {
        adjust_contrast_backward(image, &self.factor, grad_output)
    }
}

impl fmt::Display for AdjustContrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdjustContrast(factor={})", self.factor)
    }
}

/// Gamma correction with bound gamma and gain. See [`adjust_gamma`].
#[derive(Clone, Debug, PartialEq)]
pub struct AdjustGamma {
    gamma: Param,
    gain: Param,
}

impl AdjustGamma {
    /// Gamma correction with unit gain.
    pub fn new(gamma: impl Into<Param>) -> Self {
        Self {
            gamma: gamma.into(),
            gain: Param::Scalar(1.0),
        }
    }

    pub fn with_gain(mut self, gain: impl Into<Param>) -> Self {
        self.gain = gain.into();
        self
    }

    pub fn gamma(&self) -> &Param {
        &self.gamma
    }

    pub fn gain(&self) -> &Param {
        &self.gain
    }
}

impl ImageOp for AdjustGamma {
    fn name(&self) -> &'static str {
        "AdjustGamma"
    }

    fn apply(&self, image: &Tensor) -> Result<Tensor> {
        adjust_gamma(image, &self.gamma, &self.gain)
    }

    fn backward(&self, image: &Tensor, grad_output: &Tensor) -> Result<Tensor> {
        adjust_gamma_backward(image, &self.gamma, &self.gain, grad_output)
    }
}

impl fmt::Display for AdjustGamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdjustGamma(gamma={}, gain={})", self.gamma, self.gain)
    }
}
