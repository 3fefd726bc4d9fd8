#![allow(dead_code)]

use ndarray::IxDyn;

use lumen_core::Tensor;

/// Build a tensor from a shape and row-major values.
pub fn tensor(shape: &[usize], values: &[f32]) -> Tensor {
    Tensor::from_shape_vec(IxDyn(shape), values.to_vec()).expect("shape matches values")
}

/// A (C, H, W) image where every pixel of channel `c` equals `channel_values[c]`.
pub fn per_channel(channel_values: &[f32], h: usize, w: usize) -> Tensor {
    Tensor::from_shape_fn(IxDyn(&[channel_values.len(), h, w]), |i| channel_values[i[0]])
}

/// Stack (C, H, W) images into a (B, C, H, W) batch.
pub fn batch(images: &[Tensor]) -> Tensor {
    let views: Vec<_> = images.iter().map(|t| t.view()).collect();
    ndarray::stack(ndarray::Axis(0), &views).expect("images share a shape")
}

/// Deterministic pseudo-random tensor with values in [0, 1).
pub fn random_tensor(shape: &[usize], seed: u64) -> Tensor {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    Tensor::from_shape_simple_fn(IxDyn(shape), || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 40) as f32 / (1u64 << 24) as f32
    })
}

/// RGB pixels with distinct channels, away from hue-sector boundaries.
pub const SAFE_PIXELS: [[f32; 3]; 4] = [
    [0.8, 0.4, 0.2],
    [0.35, 0.7, 0.1],
    [0.2, 0.35, 0.9],
    [0.6, 0.1, 0.45],
];

/// A (3, 2, 2) image laid out from `SAFE_PIXELS`.
pub fn safe_rgb_image() -> Tensor {
    Tensor::from_shape_fn(IxDyn(&[3, 2, 2]), |i| SAFE_PIXELS[i[1] * 2 + i[2]][i[0]])
}

/// Assert two tensors have the same shape and agree elementwise within `tol`.
pub fn assert_close(actual: &Tensor, expected: &Tensor, tol: f32) {
    assert_eq!(actual.shape(), expected.shape(), "shape mismatch");
    for (idx, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            approx::abs_diff_eq!(*a, *e, epsilon = tol),
            "element {idx}: got {a}, expected {e}"
        );
    }
}

/// Assert every element of `actual` equals `value` within `tol`.
pub fn assert_all(actual: &Tensor, value: f32, tol: f32) {
    for v in actual.iter() {
        assert!((*v - value).abs() < tol, "expected {value}, got {v}");
    }
}
