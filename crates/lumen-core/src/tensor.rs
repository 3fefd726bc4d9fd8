use ndarray::{ArrayD, Zip};

use crate::consts::{COLOR_CHANNEL_COUNT, IMAGE_TRAILING_DIMS, PARALLEL_ELEMENT_THRESHOLD};
use crate::error::{LumenError, Result};

/// Dense image tensor, row-major, shape = (*, C, H, W).
/// Sample values are f32, conventionally in [0.0, 1.0].
pub type Tensor = ArrayD<f32>;

/// Fail with `InvalidRank` unless `image` has at least `required` dimensions.
pub(crate) fn require_rank(op: &'static str, image: &Tensor, required: usize) -> Result<()> {
    if image.ndim() < required {
        return Err(LumenError::InvalidRank {
            op,
            required,
            actual: image.ndim(),
        });
    }
    Ok(())
}

/// Index of the channel axis of a (*, C, H, W) image.
pub(crate) fn channel_axis(op: &'static str, image: &Tensor) -> Result<usize> {
    require_rank(op, image, IMAGE_TRAILING_DIMS)?;
    Ok(image.ndim() - IMAGE_TRAILING_DIMS)
}

/// Channel axis of a (*, 3, H, W) image, rejecting any other channel count.
pub(crate) fn rgb_channel_axis(op: &'static str, image: &Tensor) -> Result<usize> {
    let axis = channel_axis(op, image)?;
    let channels = image.shape()[axis];
    if channels != COLOR_CHANNEL_COUNT {
        return Err(LumenError::InvalidChannels {
            op,
            expected: COLOR_CHANNEL_COUNT,
            actual: channels,
        });
    }
    Ok(axis)
}

/// Check that an upstream gradient has the same shape as the forward output.
pub(crate) fn check_grad_shape(output_shape: &[usize], grad_output: &Tensor) -> Result<()> {
    if grad_output.shape() != output_shape {
        return Err(LumenError::GradientShape {
            expected: output_shape.to_vec(),
            actual: grad_output.shape().to_vec(),
        });
    }
    Ok(())
}

/// Elementwise map over two same-shaped tensors, parallel above the threshold.
pub(crate) fn zip_map<F>(a: &Tensor, b: &Tensor, f: F) -> Tensor
where
    F: Fn(f32, f32) -> f32 + Send + Sync,
{
    let zip = Zip::from(a).and(b);
    if a.len() >= PARALLEL_ELEMENT_THRESHOLD {
        zip.par_map_collect(|&x, &y| f(x, y))
    } else {
        zip.map_collect(|&x, &y| f(x, y))
    }
}

/// Elementwise map over three same-shaped tensors, parallel above the threshold.
pub(crate) fn zip_map3<F>(a: &Tensor, b: &Tensor, c: &Tensor, f: F) -> Tensor
where
    F: Fn(f32, f32, f32) -> f32 + Send + Sync,
{
    let zip = Zip::from(a).and(b).and(c);
    if a.len() >= PARALLEL_ELEMENT_THRESHOLD {
        zip.par_map_collect(|&x, &y, &z| f(x, y, z))
    } else {
        zip.map_collect(|&x, &y, &z| f(x, y, z))
    }
}

/// Elementwise map over four same-shaped tensors, parallel above the threshold.
pub(crate) fn zip_map4<F>(a: &Tensor, b: &Tensor, c: &Tensor, d: &Tensor, f: F) -> Tensor
where
    F: Fn(f32, f32, f32, f32) -> f32 + Send + Sync,
{
    let zip = Zip::from(a).and(b).and(c).and(d);
    if a.len() >= PARALLEL_ELEMENT_THRESHOLD {
        zip.par_map_collect(|&w, &x, &y, &z| f(w, x, y, z))
    } else {
        zip.map_collect(|&w, &x, &y, &z| f(w, x, y, z))
    }
}
