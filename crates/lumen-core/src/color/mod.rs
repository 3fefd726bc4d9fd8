pub mod adjust;
pub mod hsv;
pub mod hsv_adjust;
pub mod normalize;

pub use adjust::{
    adjust_brightness, adjust_contrast, adjust_gamma, AdjustBrightness, AdjustContrast,
    AdjustGamma,
};
pub use hsv::{hsv_to_rgb, rgb_to_hsv};
pub use hsv_adjust::{adjust_hue, adjust_saturation, AdjustHue, AdjustSaturation};
pub use normalize::{denormalize, normalize, Denormalize, Normalize};
