mod common;

use common::{assert_close, random_tensor, tensor};
use lumen_core::geometry::{hflip, rot180, vflip, Hflip, Rot180, Vflip};
use lumen_core::grad::{gradcheck, GradCheckConfig};
use lumen_core::{ImageOp, LumenError};

fn corner_image() -> lumen_core::Tensor {
    tensor(
        &[1, 1, 3, 3],
        &[
            0., 0., 0., //
            0., 0., 0., //
            0., 1., 1.,
        ],
    )
}

// ---------------------------------------------------------------------------
// Concrete layouts
// ---------------------------------------------------------------------------

#[test]
fn test_vflip_moves_bottom_row_to_top() {
    let expected = tensor(&[1, 1, 3, 3], &[0., 1., 1., 0., 0., 0., 0., 0., 0.]);
    assert_eq!(vflip(&corner_image()).unwrap(), expected);
}

#[test]
fn test_hflip_mirrors_columns() {
    let expected = tensor(&[1, 1, 3, 3], &[0., 0., 0., 0., 0., 0., 1., 1., 0.]);
    assert_eq!(hflip(&corner_image()).unwrap(), expected);
}

#[test]
fn test_rot180_moves_corner() {
    let expected = tensor(&[1, 1, 3, 3], &[1., 1., 0., 0., 0., 0., 0., 0., 0.]);
    assert_eq!(rot180(&corner_image()).unwrap(), expected);
}

#[test]
fn test_flip_preserves_shape_for_batched_input() {
    let image = random_tensor(&[2, 4, 3, 5, 6], 3);
    assert_eq!(vflip(&image).unwrap().shape(), image.shape());
    assert_eq!(hflip(&image).unwrap().shape(), image.shape());
    assert_eq!(rot180(&image).unwrap().shape(), image.shape());
}

#[test]
fn test_hflip_on_plain_2d() {
    let image = tensor(&[2, 3], &[1., 2., 3., 4., 5., 6.]);
    let expected = tensor(&[2, 3], &[3., 2., 1., 6., 5., 4.]);
    assert_eq!(hflip(&image).unwrap(), expected);
}

// ---------------------------------------------------------------------------
// Algebraic properties
// ---------------------------------------------------------------------------

#[test]
fn test_flips_are_involutions() {
    let image = random_tensor(&[2, 3, 4, 5], 11);
    assert_eq!(hflip(&hflip(&image).unwrap()).unwrap(), image);
    assert_eq!(vflip(&vflip(&image).unwrap()).unwrap(), image);
    assert_eq!(rot180(&rot180(&image).unwrap()).unwrap(), image);
}

#[test]
fn test_rot180_is_composition_of_flips() {
    let image = random_tensor(&[3, 4, 7], 5);
    let rotated = rot180(&image).unwrap();
    assert_eq!(rotated, vflip(&hflip(&image).unwrap()).unwrap());
    assert_eq!(rotated, hflip(&vflip(&image).unwrap()).unwrap());
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn test_flip_rejects_1d_input() {
    let image = tensor(&[4], &[1., 2., 3., 4.]);
    let err = vflip(&image).unwrap_err();
    assert_eq!(
        err,
        LumenError::InvalidRank {
            op: "vflip",
            required: 2,
            actual: 1
        }
    );
    assert!(hflip(&image).is_err());
    assert!(rot180(&image).is_err());
}

#[test]
fn test_flip_backward_rejects_wrong_grad_shape() {
    let image = random_tensor(&[3, 4, 4], 1);
    let grad = random_tensor(&[3, 4, 5], 2);
    let err = Hflip.backward(&image, &grad).unwrap_err();
    assert!(matches!(err, LumenError::GradientShape { .. }));
}

// ---------------------------------------------------------------------------
// Wrappers
// ---------------------------------------------------------------------------

#[test]
fn test_wrapper_descriptors() {
    assert_eq!(Vflip::new().to_string(), "Vflip");
    assert_eq!(Hflip::new().to_string(), "Hflip");
    assert_eq!(Rot180::new().to_string(), "Rot180");
}

#[test]
fn test_wrapper_matches_function() {
    let image = random_tensor(&[2, 3, 4, 4], 8);
    assert_eq!(Rot180.apply(&image).unwrap(), rot180(&image).unwrap());
}

#[test]
fn test_flip_gradients() {
    let image = random_tensor(&[2, 3, 3, 4], 21);
    let config = GradCheckConfig::default();
    assert!(gradcheck(&Vflip, &image, &config).unwrap());
    assert!(gradcheck(&Hflip, &image, &config).unwrap());
    assert!(gradcheck(&Rot180, &image, &config).unwrap());
}

#[test]
fn test_flip_backward_is_flip_of_gradient() {
    let image = random_tensor(&[3, 2, 2], 4);
    let grad = random_tensor(&[3, 2, 2], 6);
    assert_close(
        &Rot180.backward(&image, &grad).unwrap(),
        &rot180(&grad).unwrap(),
        0.0,
    );
}
