pub mod onnx;
pub mod stub;

pub use onnx::OnnxScorer;
pub use stub::StubScorer;

use thiserror::Error;

use crate::domain::FEATURE_COUNT;

/// Errors raised by the scoring capability.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to load model: {0}")]
    Load(#[from] ort::Error),

    #[error("model inference failed: {0}")]
    Inference(String),

    #[error("model returned {got} probabilities for {expected} rows")]
    OutputArity { expected: usize, got: usize },

    #[error("probability {0} outside [0, 1]")]
    OutOfRange(f64),

    #[error("startup probe failed: {0}")]
    Probe(String),
}

/// Capability interface over the fitted probability model.
///
/// Implementations are opaque to the pipeline: one batch of engineered rows
/// in, one probability per row out, same order. Implementations must be
/// safe to share across request handlers.
pub trait Scorer: Send + Sync {
    /// Score a batch of engineered rows. Returns one probability in [0, 1]
    /// per row, in row order.
    fn score_batch(&self, rows: &[[f32; FEATURE_COUNT]]) -> Result<Vec<f64>, ModelError>;

    /// Short identifier for logs and `/ready`.
    fn name(&self) -> &str;
}
