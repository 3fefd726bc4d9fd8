//! Finite-difference gradient checking for [`ImageOp`] implementations.
//!
//! The scalar loss is `sum(op(x) * weights)`, so its gradient with respect to
//! `x` is exactly `op.backward(x, weights)`.

use ndarray::Dimension;
use tracing::debug;

use crate::consts::{DEFAULT_GRADCHECK_ATOL, DEFAULT_GRADCHECK_EPS, DEFAULT_GRADCHECK_RTOL};
use crate::error::Result;
use crate::op::ImageOp;
use crate::tensor::{check_grad_shape, Tensor};

/// Tolerances for [`gradcheck`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradCheckConfig {
    /// Central-difference step.
    pub eps: f32,
    pub atol: f32,
    pub rtol: f32,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        Self {
            eps: DEFAULT_GRADCHECK_EPS,
            atol: DEFAULT_GRADCHECK_ATOL,
            rtol: DEFAULT_GRADCHECK_RTOL,
        }
    }
}

/// Deterministic, non-uniform loss weights with the same shape as `like`.
///
/// Uniform weights would hide channel mix-ups in a backward pass.
pub fn probe_weights(like: &Tensor) -> Tensor {
    let mut weights = like.clone();
    for (i, w) in weights.iter_mut().enumerate() {
        *w = 0.5 + (i % 7) as f32 * 0.25;
    }
    weights
}

fn weighted_sum(output: &Tensor, weights: &Tensor) -> f64 {
    output
        .iter()
        .zip(weights.iter())
        .map(|(&y, &w)| y as f64 * w as f64)
        .sum()
}

/// Central-difference estimate of d/dx sum(op(x) * weights).
pub fn numerical_gradient(
    op: &dyn ImageOp,
    input: &Tensor,
    weights: &Tensor,
    eps: f32,
) -> Result<Tensor> {
    let mut grad = Tensor::zeros(input.raw_dim());
    let mut probe = input.to_owned();

    for (idx, &original) in input.indexed_iter() {
        let at = idx.slice();

        probe[at] = original + eps;
        let plus = op.apply(&probe)?;
        check_grad_shape(plus.shape(), weights)?;
        let plus = weighted_sum(&plus, weights);

        probe[at] = original - eps;
        let minus = weighted_sum(&op.apply(&probe)?, weights);

        probe[at] = original;
        grad[at] = ((plus - minus) / (2.0 * eps as f64)) as f32;
    }

    Ok(grad)
}

/// Analytic gradient of sum(op(x) * weights), via the op's backward pass.
pub fn analytical_gradient(op: &dyn ImageOp, input: &Tensor, weights: &Tensor) -> Result<Tensor> {
    op.backward(input, weights)
}

/// Compare analytic and numerical gradients elementwise:
/// `|a - n| <= atol + rtol * |n|`.
pub fn gradients_match(analytical: &Tensor, numerical: &Tensor, atol: f32, rtol: f32) -> bool {
    if analytical.shape() != numerical.shape() {
        return false;
    }
    analytical
        .iter()
        .zip(numerical.iter())
        .all(|(&a, &n)| (a - n).abs() <= atol + rtol * n.abs())
}

/// Check `op.backward` against finite differences at `input`.
///
/// Returns `Ok(false)` on a mismatch; errors from the op itself propagate.
pub fn gradcheck(op: &dyn ImageOp, input: &Tensor, config: &GradCheckConfig) -> Result<bool> {
    let output = op.apply(input)?;
    let weights = probe_weights(&output);

    let analytical = analytical_gradient(op, input, &weights)?;
    let numerical = numerical_gradient(op, input, &weights, config.eps)?;
    let ok = gradients_match(&analytical, &numerical, config.atol, config.rtol);

    if !ok {
        let worst = analytical
            .iter()
            .zip(numerical.iter())
            .map(|(a, n)| (a - n).abs())
            .fold(0.0f32, f32::max);
        debug!(op = %op, max_abs_diff = worst, "Gradient check failed");
    }
    Ok(ok)
}
