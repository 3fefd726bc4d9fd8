//! RGB <-> HSV conversion.
//!
//! Hue is expressed in radians in [0, 2π), saturation and value in [0, 1].
//! Internally hue is handled in sector units (six sectors per turn) which
//! keeps the piecewise formulas exact.

use ndarray::{Axis, Zip};

use crate::consts::{HUE_RANGE, HUE_SECTORS, PARALLEL_ELEMENT_THRESHOLD};
use crate::error::Result;
use crate::tensor::{rgb_channel_axis, Tensor};

/// Per-pixel HSV decomposition with the bookkeeping needed for gradients.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PixelHsv {
    /// Hue in sector units, [0, 6).
    pub sector: f32,
    pub saturation: f32,
    pub value: f32,
    pub chroma: f32,
    pub max_idx: usize,
    pub min_idx: usize,
}

/// Wrap a sector-unit hue into [0, 6).
#[inline]
pub(crate) fn wrap_sector(t: f32) -> f32 {
    let w = t.rem_euclid(HUE_SECTORS);
    // rem_euclid can round up to exactly 6.0 for tiny negative inputs
    if w >= HUE_SECTORS {
        0.0
    } else {
        w
    }
}

#[inline]
fn argmax3(p: [f32; 3]) -> usize {
    if p[0] >= p[1] && p[0] >= p[2] {
        0
    } else if p[1] >= p[2] {
        1
    } else {
        2
    }
}

#[inline]
fn argmin3(p: [f32; 3]) -> usize {
    if p[0] <= p[1] && p[0] <= p[2] {
        0
    } else if p[1] <= p[2] {
        1
    } else {
        2
    }
}

/// The (minuend, subtrahend, offset) triple of the hue-sector formula for
/// the channel holding the maximum.
#[inline]
fn sector_terms(max_idx: usize) -> (usize, usize, f32) {
    match max_idx {
        0 => (1, 2, 0.0),
        1 => (2, 0, 2.0),
        _ => (0, 1, 4.0),
    }
}

pub(crate) fn analyze(rgb: [f32; 3]) -> PixelHsv {
    let max_idx = argmax3(rgb);
    let min_idx = argmin3(rgb);
    let value = rgb[max_idx];
    let chroma = value - rgb[min_idx];

    let saturation = if value > 0.0 { chroma / value } else { 0.0 };
    let sector = if chroma > 0.0 {
        let (p, q, offset) = sector_terms(max_idx);
        wrap_sector(offset + (rgb[p] - rgb[q]) / chroma)
    } else {
        0.0
    };

    PixelHsv {
        sector,
        saturation,
        value,
        chroma,
        max_idx,
        min_idx,
    }
}

#[inline]
pub(crate) fn rgb_to_hsv_pixel(rgb: [f32; 3]) -> [f32; 3] {
    let hsv = analyze(rgb);
    [
        hsv.sector * HUE_RANGE / HUE_SECTORS,
        hsv.saturation,
        hsv.value,
    ]
}

#[inline]
pub(crate) fn hsv_to_rgb_pixel(hsv: [f32; 3]) -> [f32; 3] {
    let [h, s, v] = hsv;
    let sector = wrap_sector(h * HUE_SECTORS / HUE_RANGE);
    let i = (sector.floor() as usize).min(5);
    let f = sector - i as f32;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match i {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Offsets of each output channel in the closed form
/// `c = v - v * s * weight(n_c + sector)`.
const CHANNEL_OFFSETS: [f32; 3] = [5.0, 3.0, 1.0];

/// Closed-form channel weight and its derivative with respect to the sector.
#[inline]
fn channel_weight(channel: usize, sector: f32) -> (f32, f32) {
    let k = (CHANNEL_OFFSETS[channel] + sector).rem_euclid(HUE_SECTORS);
    let raw = k.min(4.0 - k);
    let weight = raw.clamp(0.0, 1.0);
    let slope = if k > 0.0 && k < 1.0 {
        1.0
    } else if k > 3.0 && k < 4.0 {
        -1.0
    } else {
        0.0
    };
    (weight, slope)
}

/// Adjust a single RGB pixel in HSV space: scale saturation by
/// `saturation_factor` (clamped to [0, 1]) and rotate hue by `hue_shift`
/// full turns.
#[inline]
pub(crate) fn adjust_pixel_value(rgb: [f32; 3], saturation_factor: f32, hue_shift: f32) -> [f32; 3] {
    let [h, s, v] = rgb_to_hsv_pixel(rgb);
    let s = (s * saturation_factor).clamp(0.0, 1.0);
    let h = (h + hue_shift * HUE_RANGE).rem_euclid(HUE_RANGE);
    hsv_to_rgb_pixel([h, s, v])
}

/// Same adjustment as [`adjust_pixel_value`], also returning the 3x3 Jacobian
/// `jac[out_channel][in_channel]`.
///
/// Uses the closed form `c = v - v * s * weight(n_c + sector)`.
pub(crate) fn adjust_pixel(
    rgb: [f32; 3],
    saturation_factor: f32,
    hue_shift: f32,
) -> ([f32; 3], [[f32; 3]; 3]) {
    let px = analyze(rgb);

    let scaled = px.saturation * saturation_factor;
    let saturation = scaled.clamp(0.0, 1.0);
    let saturation_pass = if (0.0..=1.0).contains(&scaled) {
        saturation_factor
    } else {
        0.0
    };
    let sector = wrap_sector(px.sector + hue_shift * HUE_SECTORS);

    let out = hsv_to_rgb_pixel([sector * HUE_RANGE / HUE_SECTORS, saturation, px.value]);

    // Partial derivatives of v, chroma, s and sector with respect to r, g, b.
    let mut d_value = [0.0f32; 3];
    d_value[px.max_idx] = 1.0;
    let mut d_chroma = [0.0f32; 3];
    d_chroma[px.max_idx] += 1.0;
    d_chroma[px.min_idx] -= 1.0;

    let mut d_saturation = [0.0f32; 3];
    let mut d_sector = [0.0f32; 3];
    if px.value > 0.0 {
        for i in 0..3 {
            d_saturation[i] = (d_chroma[i] - px.saturation * d_value[i]) / px.value;
        }
    }
    if px.chroma > 0.0 {
        let (p, q, _) = sector_terms(px.max_idx);
        let diff = (rgb[p] - rgb[q]) / (px.chroma * px.chroma);
        for (i, ds) in d_sector.iter_mut().enumerate() {
            *ds = -diff * d_chroma[i];
        }
        d_sector[p] += 1.0 / px.chroma;
        d_sector[q] -= 1.0 / px.chroma;
    }

    let mut jac = [[0.0f32; 3]; 3];
    for (channel, row) in jac.iter_mut().enumerate() {
        let (weight, slope) = channel_weight(channel, sector);
        for i in 0..3 {
            let d_sat = saturation_pass * d_saturation[i];
            row[i] = d_value[i]
                - d_value[i] * saturation * weight
                - px.value * d_sat * weight
                - px.value * saturation * slope * d_sector[i];
        }
    }

    (out, jac)
}

fn convert(op: &'static str, image: &Tensor, f: fn([f32; 3]) -> [f32; 3]) -> Result<Tensor> {
    let axis = rgb_channel_axis(op, image)?;
    let mut out = Tensor::zeros(image.raw_dim());
    let zip = Zip::from(out.lanes_mut(Axis(axis))).and(image.lanes(Axis(axis)));
    let kernel = |mut o: ndarray::ArrayViewMut1<f32>, i: ndarray::ArrayView1<f32>| {
        let converted = f([i[0], i[1], i[2]]);
        o[0] = converted[0];
        o[1] = converted[1];
        o[2] = converted[2];
    };
    if image.len() >= PARALLEL_ELEMENT_THRESHOLD {
        zip.par_for_each(kernel);
    } else {
        zip.for_each(kernel);
    }
    Ok(out)
}

/// Convert a (*, 3, H, W) RGB image to HSV with hue in radians.
pub fn rgb_to_hsv(image: &Tensor) -> Result<Tensor> {
    convert("rgb_to_hsv", image, rgb_to_hsv_pixel)
}

/// Convert a (*, 3, H, W) HSV image (hue in radians) back to RGB.
pub fn hsv_to_rgb(image: &Tensor) -> Result<Tensor> {
    convert("hsv_to_rgb", image, hsv_to_rgb_pixel)
}
