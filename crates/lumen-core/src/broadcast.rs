//! Alignment of scalar-or-sequence parameters against image tensors.
//!
//! Every operation that takes a [`Param`] goes through [`align_param`], which
//! inserts singleton dimensions so the parameter lines up with the right image
//! axes and then expands it with ordinary broadcasting.

use ndarray::IxDyn;

use crate::error::{LumenError, Result};
use crate::param::Param;
use crate::tensor::Tensor;

/// Which image axes a parameter's dimensions are matched against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// Dimension `i` of the parameter meets image axis `i`; the parameter is
    /// right-padded with singleton dims. A length-B vector becomes (B, 1, 1, 1)
    /// for a (B, C, H, W) image.
    Leading,
    /// The parameter's last dimension meets the channel axis (third from the
    /// end); remaining dims are right-aligned. A length-C vector becomes
    /// (C, 1, 1) and a (B, C) matrix becomes (B, C, 1, 1).
    Channel,
}

/// Shape the parameter takes after singleton padding, before broadcasting.
pub fn aligned_shape(
    param_shape: &[usize],
    image_shape: &[usize],
    anchor: Anchor,
    arg: &'static str,
) -> Result<Vec<usize>> {
    let n = image_shape.len();
    let r = param_shape.len();
    if r == 0 {
        return Ok(vec![1; n]);
    }

    let (offset, padded) = match anchor {
        Anchor::Leading => {
            if r > n {
                return Err(rank_error(arg, r, n));
            }
            let mut padded = param_shape.to_vec();
            padded.resize(n, 1);
            (0, padded)
        }
        Anchor::Channel => {
            if r + 2 > n {
                return Err(rank_error(arg, r, n));
            }
            let offset = n - r - 2;
            let mut padded = vec![1; offset];
            padded.extend_from_slice(param_shape);
            padded.extend_from_slice(&[1, 1]);
            (offset, padded)
        }
    };

    for (i, &len) in param_shape.iter().enumerate() {
        let axis = offset + i;
        if len != 1 && len != image_shape[axis] {
            return Err(LumenError::ShapeMismatch {
                arg,
                axis,
                expected: image_shape[axis],
                actual: len,
            });
        }
    }

    Ok(padded)
}

/// Expand `param` to the full `image_shape`.
///
/// The returned tensor has exactly `image_shape`, so callers can zip it with
/// the image elementwise.
pub fn align_param(
    param: &Param,
    image_shape: &[usize],
    anchor: Anchor,
    arg: &'static str,
) -> Result<Tensor> {
    let values = param.to_tensor(arg)?;
    let padded = aligned_shape(values.shape(), image_shape, anchor, arg)?;
    let reshaped = values
        .into_shape_with_order(IxDyn(&padded))
        .map_err(|e| LumenError::InvalidParam {
            arg,
            reason: e.to_string(),
        })?;
    let expanded = reshaped
        .broadcast(IxDyn(image_shape))
        .ok_or_else(|| LumenError::InvalidParam {
            arg,
            reason: format!("cannot broadcast {padded:?} to {image_shape:?}"),
        })?;
    Ok(expanded.to_owned())
}

fn rank_error(arg: &'static str, param_rank: usize, image_rank: usize) -> LumenError {
    LumenError::InvalidParam {
        arg,
        reason: format!("{param_rank}-D parameter cannot align with a {image_rank}-D image"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_batch_vector() {
        let shape = aligned_shape(&[2], &[2, 3, 4, 5], Anchor::Leading, "factor").unwrap();
        assert_eq!(shape, vec![2, 1, 1, 1]);
    }

    #[test]
    fn test_leading_scalar() {
        let shape = aligned_shape(&[], &[3, 4, 5], Anchor::Leading, "factor").unwrap();
        assert_eq!(shape, vec![1, 1, 1]);
    }

    #[test]
    fn test_leading_mismatch_reports_axis() {
        let err = aligned_shape(&[3], &[2, 3, 4, 5], Anchor::Leading, "factor").unwrap_err();
        assert_eq!(
            err,
            LumenError::ShapeMismatch {
                arg: "factor",
                axis: 0,
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_channel_vector() {
        let shape = aligned_shape(&[3], &[2, 3, 4, 5], Anchor::Channel, "mean").unwrap();
        assert_eq!(shape, vec![1, 3, 1, 1]);
    }

    #[test]
    fn test_channel_matrix() {
        let shape = aligned_shape(&[2, 3], &[2, 3, 4, 5], Anchor::Channel, "mean").unwrap();
        assert_eq!(shape, vec![2, 3, 1, 1]);
    }

    #[test]
    fn test_channel_length_one_broadcasts() {
        let shape = aligned_shape(&[1], &[2, 3, 1, 1], Anchor::Channel, "std").unwrap();
        assert_eq!(shape, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_channel_too_many_dims() {
        let err = aligned_shape(&[2, 3], &[3, 4, 5], Anchor::Channel, "mean").unwrap_err();
        assert!(matches!(err, LumenError::InvalidParam { arg: "mean", .. }));
    }

    #[test]
    fn test_align_param_expands_to_image_shape() {
        let full = align_param(&Param::from(vec![1.0, 2.0]), &[2, 3, 1, 1], Anchor::Leading, "factor")
            .unwrap();
        assert_eq!(full.shape(), &[2, 3, 1, 1]);
        assert_eq!(full[[0, 2, 0, 0]], 1.0);
        assert_eq!(full[[1, 0, 0, 0]], 2.0);
    }
}
