use std::fmt;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::op::ImageOp;
use crate::tensor::{check_grad_shape, Tensor};

use super::config::PipelineConfig;

/// An ordered chain of operations applied one after another.
///
/// The chain is itself an [`ImageOp`]; its backward pass replays the forward
/// to recover each step's input and then runs the steps' backward passes in
/// reverse.
#[derive(Default)]
pub struct Pipeline {
    ops: Vec<Box<dyn ImageOp>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        if config.has_contrast_step() {
            warn!("Contrast steps apply a linear gain, not a mid-grey pivot");
        }
        let ops: Vec<Box<dyn ImageOp>> = config.steps.iter().map(|s| s.build()).collect();
        info!(steps = ops.len(), "Built pipeline from config");
        Self { ops }
    }

    /// Append an operation (builder style).
    pub fn then(mut self, op: impl ImageOp + 'static) -> Self {
        self.ops.push(Box::new(op));
        self
    }

    pub fn push(&mut self, op: Box<dyn ImageOp>) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Run the forward pass, returning the input of every step followed by
    /// the final output.
    pub fn forward_trace(&self, image: &Tensor) -> Result<Vec<Tensor>> {
        let mut trace = Vec::with_capacity(self.ops.len() + 1);
        trace.push(image.clone());
        for (index, op) in self.ops.iter().enumerate() {
            debug!(index, step = %op, "Applying step");
            let next = op.apply(&trace[index])?;
            trace.push(next);
        }
        Ok(trace)
    }
}

impl ImageOp for Pipeline {
    fn name(&self) -> &'static str {
        "Pipeline"
    }

    fn apply(&self, image: &Tensor) -> Result<Tensor> {
        let mut current = image.clone();
        for (index, op) in self.ops.iter().enumerate() {
            debug!(index, step = %op, "Applying step");
            current = op.apply(&current)?;
        }
        Ok(current)
    }

    fn backward(&self, image: &Tensor, grad_output: &Tensor) -> Result<Tensor> {
        let trace = self.forward_trace(image)?;
        if let Some(output) = trace.last() {
            check_grad_shape(output.shape(), grad_output)?;
        }
        let mut grad = grad_output.clone();
        for (index, op) in self.ops.iter().enumerate().rev() {
            grad = op.backward(&trace[index], &grad)?;
        }
        Ok(grad)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pipeline(")?;
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{op}")?;
        }
        write!(f, ")")
    }
}
