pub mod config;
mod sequential;

pub use config::{AdjustStep, PipelineConfig};
pub use sequential::Pipeline;
