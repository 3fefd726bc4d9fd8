use std::fmt;

use ndarray::{Array1, Array2, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::{LumenError, Result};
use crate::tensor::Tensor;

/// A scalar-or-sequence operation parameter.
///
/// `Scalar` applies uniformly. `Vector` holds one value per batch element
/// (adjustments) or per channel (normalize). `Matrix` holds one value per
/// (batch, channel) pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Scalar(f32),
    Vector(Vec<f32>),
    Matrix(Vec<Vec<f32>>),
}

impl Param {
    /// Number of dimensions of the parameter once turned into a tensor.
    pub fn ndim(&self) -> usize {
        match self {
            Self::Scalar(_) => 0,
            Self::Vector(_) => 1,
            Self::Matrix(_) => 2,
        }
    }

    /// Returns the value if this is a scalar.
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to a dynamic-rank tensor, validating the layout.
    ///
    /// `arg` names the parameter in error messages.
    pub fn to_tensor(&self, arg: &'static str) -> Result<Tensor> {
        match self {
            Self::Scalar(v) => Ok(Tensor::from_elem(IxDyn(&[]), *v)),
            Self::Vector(vs) => {
                if vs.is_empty() {
                    return Err(LumenError::InvalidParam {
                        arg,
                        reason: "empty sequence".into(),
                    });
                }
                Ok(Array1::from(vs.clone()).into_dyn())
            }
            Self::Matrix(rows) => {
                let cols = rows.first().map(Vec::len).unwrap_or(0);
                if rows.is_empty() || cols == 0 {
                    return Err(LumenError::InvalidParam {
                        arg,
                        reason: "empty sequence".into(),
                    });
                }
                if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
                    return Err(LumenError::ShapeMismatch {
                        arg,
                        axis: 1,
                        expected: cols,
                        actual: bad.len(),
                    });
                }
                let flat: Vec<f32> = rows.iter().flatten().copied().collect();
                let matrix = Array2::from_shape_vec((rows.len(), cols), flat).map_err(|e| {
                    LumenError::InvalidParam {
                        arg,
                        reason: e.to_string(),
                    }
                })?;
                Ok(matrix.into_dyn())
            }
        }
    }
}

impl Default for Param {
    fn default() -> Self {
        Self::Scalar(1.0)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v:?}"),
            Self::Vector(vs) => write!(f, "{vs:?}"),
            Self::Matrix(rows) => write!(f, "{rows:?}"),
        }
    }
}

impl From<f32> for Param {
    fn from(v: f32) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec<f32>> for Param {
    fn from(vs: Vec<f32>) -> Self {
        Self::Vector(vs)
    }
}

impl From<&[f32]> for Param {
    fn from(vs: &[f32]) -> Self {
        Self::Vector(vs.to_vec())
    }
}

impl<const N: usize> From<[f32; N]> for Param {
    fn from(vs: [f32; N]) -> Self {
        Self::Vector(vs.to_vec())
    }
}

impl From<Vec<Vec<f32>>> for Param {
    fn from(rows: Vec<Vec<f32>>) -> Self {
        Self::Matrix(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_vector() {
        assert_eq!(Param::from(vec![0.5]).to_string(), "[0.5]");
    }

    #[test]
    fn test_display_scalar_keeps_decimal() {
        assert_eq!(Param::from(2.0).to_string(), "2.0");
    }

    #[test]
    fn test_matrix_ragged_rows_rejected() {
        let p = Param::from(vec![vec![1.0, 2.0], vec![3.0]]);
        let err = p.to_tensor("mean").unwrap_err();
        assert!(matches!(err, LumenError::ShapeMismatch { arg: "mean", expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_empty_vector_rejected() {
        let err = Param::Vector(vec![]).to_tensor("factor").unwrap_err();
        assert!(matches!(err, LumenError::InvalidParam { arg: "factor", .. }));
    }

    #[test]
    fn test_matrix_to_tensor_shape() {
        let p = Param::from(vec![vec![0.5, 1.0, 2.0], vec![0.5, 1.0, 2.0]]);
        assert_eq!(p.to_tensor("mean").unwrap().shape(), &[2, 3]);
    }
}
