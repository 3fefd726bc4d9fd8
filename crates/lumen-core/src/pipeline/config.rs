use serde::{Deserialize, Serialize};

use crate::color::{
    AdjustBrightness, AdjustContrast, AdjustGamma, AdjustHue, AdjustSaturation, Denormalize,
    Normalize,
};
use crate::error::{LumenError, Result};
use crate::geometry::{Hflip, Rot180, Vflip};
use crate::op::ImageOp;
use crate::param::Param;

/// One configured operation in a pipeline.
///
/// Serialized with an `op` tag, e.g. in TOML:
///
/// ```toml
/// [[steps]]
/// op = "gamma"
/// gamma = 2.2
///
/// [[steps]]
/// op = "normalize"
/// mean = [0.485, 0.456, 0.406]
/// std = [0.229, 0.224, 0.225]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AdjustStep {
    Vflip,
    Hflip,
    Rot180,
    Brightness {
        factor: Param,
    },
    /// Linear gain, identical to `Brightness`.
    Contrast {
        factor: Param,
    },
    Gamma {
        gamma: Param,
        #[serde(default)]
        gain: Param,
    },
    Saturation {
        factor: Param,
    },
    Hue {
        factor: Param,
    },
    Normalize {
        mean: Param,
        std: Param,
    },
    Denormalize {
        mean: Param,
        std: Param,
    },
}

impl AdjustStep {
    /// Bind the step's parameters into a callable operation.
    pub fn build(&self) -> Box<dyn ImageOp> {
        match self {
            Self::Vflip => Box::new(Vflip),
            Self::Hflip => Box::new(Hflip),
            Self::Rot180 => Box::new(Rot180),
            Self::Brightness { factor } => Box::new(AdjustBrightness::new(factor.clone())),
            Self::Contrast { factor } => Box::new(AdjustContrast::new(factor.clone())),
            Self::Gamma { gamma, gain } => {
                Box::new(AdjustGamma::new(gamma.clone()).with_gain(gain.clone()))
            }
            Self::Saturation { factor } => Box::new(AdjustSaturation::new(factor.clone())),
            Self::Hue { factor } => Box::new(AdjustHue::new(factor.clone())),
            Self::Normalize { mean, std } => Box::new(Normalize::new(mean.clone(), std.clone())),
            Self::Denormalize { mean, std } => {
                Box::new(Denormalize::new(mean.clone(), std.clone()))
            }
        }
    }
}

impl std::fmt::Display for AdjustStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vflip => write!(f, "Vertical Flip"),
            Self::Hflip => write!(f, "Horizontal Flip"),
            Self::Rot180 => write!(f, "Rotate 180"),
            Self::Brightness { factor } => write!(f, "Brightness (factor={factor})"),
            Self::Contrast { factor } => write!(f, "Contrast (factor={factor})"),
            Self::Gamma { gamma, gain } => write!(f, "Gamma (gamma={gamma}, gain={gain})"),
            Self::Saturation { factor } => write!(f, "Saturation (factor={factor})"),
            Self::Hue { factor } => write!(f, "Hue (factor={factor})"),
            Self::Normalize { mean, std } => write!(f, "Normalize (mean={mean}, std={std})"),
            Self::Denormalize { mean, std } => write!(f, "Denormalize (mean={mean}, std={std})"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub steps: Vec<AdjustStep>,
}

impl PipelineConfig {
    pub fn new(steps: Vec<AdjustStep>) -> Self {
        Self { steps }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| LumenError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LumenError::Config(e.to_string()))
    }

    pub fn has_contrast_step(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s, AdjustStep::Contrast { .. }))
    }
}
