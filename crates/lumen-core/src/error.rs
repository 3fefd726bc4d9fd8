use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LumenError {
    #[error("Shape mismatch for `{arg}` on axis {axis}: expected {expected}, got {actual}")]
    ShapeMismatch {
        arg: &'static str,
        axis: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid parameter `{arg}`: {reason}")]
    InvalidParam { arg: &'static str, reason: String },

    #[error("{op} requires at least {required} dimensions, got {actual}")]
    InvalidRank {
        op: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("{op} requires {expected} channels, got {actual}")]
    InvalidChannels {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Gradient shape {actual:?} does not match output shape {expected:?}")]
    GradientShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LumenError>;
