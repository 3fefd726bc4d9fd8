//! Spatial flips and 180-degree rotation.
//!
//! These are pure element reorderings, so each backward pass is the same
//! reordering applied to the incoming gradient.

use std::fmt;

use ndarray::Axis;

use crate::error::Result;
use crate::op::ImageOp;
use crate::tensor::{check_grad_shape, require_rank, Tensor};

/// Minimum rank for any spatial flip: (H, W).
const SPATIAL_DIMS: usize = 2;

fn flip_axes(op: &'static str, image: &Tensor, flip_h: bool, flip_w: bool) -> Result<Tensor> {
    require_rank(op, image, SPATIAL_DIMS)?;
    let n = image.ndim();
    let mut view = image.view();
    if flip_h {
        view.invert_axis(Axis(n - 2));
    }
    if flip_w {
        view.invert_axis(Axis(n - 1));
    }
    Ok(view.as_standard_layout().into_owned())
}

/// Reverse the height axis (second to last).
pub fn vflip(image: &Tensor) -> Result<Tensor> {
    flip_axes("vflip", image, true, false)
}

/// Reverse the width axis (last).
pub fn hflip(image: &Tensor) -> Result<Tensor> {
    flip_axes("hflip", image, false, true)
}

/// Rotate by 180 degrees: reverse height and width together.
pub fn rot180(image: &Tensor) -> Result<Tensor> {
    flip_axes("rot180", image, true, true)
}

macro_rules! flip_op {
    ($name:ident, $func:ident, $label:literal) => {
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl $name {
            pub fn new() -> Self {
                Self
            }
        }

        impl ImageOp for $name {
            fn name(&self) -> &'static str {
                $label
            }

            fn apply(&self, image: &Tensor) -> Result<Tensor> {
                $func(image)
            }

            fn backward(&self, image: &Tensor, grad_output: &Tensor) -> Result<Tensor> {
                require_rank($label, image, SPATIAL_DIMS)?;
                check_grad_shape(image.shape(), grad_output)?;
                $func(grad_output)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, $label)
            }
        }
    };
}

flip_op!(Vflip, vflip, "Vflip");
flip_op!(Hflip, hflip, "Hflip");
flip_op!(Rot180, rot180, "Rot180");
