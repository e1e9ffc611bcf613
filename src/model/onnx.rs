use std::path::Path;

use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::{ModelError, Scorer};
use crate::domain::{FEATURE_COUNT, SCHEMA_VERSION};

/// ONNX-backed scorer.
///
/// The session is loaded once at startup and shared behind a mutex;
/// `Session::run` needs exclusive access. Both plain tensor outputs and the
/// seq(map) probability format emitted by sklearn-style exporters are
/// handled.
pub struct OnnxScorer {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    model_path: String,
}

impl OnnxScorer {
    /// Load the model and probe it with one synthetic row.
    ///
    /// The probe turns a schema mismatch (wrong column count, wrong input
    /// type) into a startup failure instead of a silent accuracy problem
    /// at serving time.
    pub fn load(path: &Path, intra_threads: usize) -> Result<Self, ModelError> {
        ort::init().commit()?;

        info!(
            path = %path.display(),
            threads = intra_threads,
            schema = SCHEMA_VERSION,
            "loading ONNX model"
        );

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(path)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        let scorer = OnnxScorer {
            session: Mutex::new(session),
            input_name,
            output_name,
            model_path: path.display().to_string(),
        };

        scorer.probe()?;

        info!(
            input = %scorer.input_name,
            output = %scorer.output_name,
            "model loaded and probe-validated"
        );

        Ok(scorer)
    }

    fn probe(&self) -> Result<(), ModelError> {
        let row = [0.0_f32; FEATURE_COUNT];
        let probs = self
            .score_batch(&[row])
            .map_err(|e| ModelError::Probe(e.to_string()))?;

        match probs.as_slice() {
            [p] if (0.0..=1.0).contains(p) => Ok(()),
            [p] => Err(ModelError::Probe(format!(
                "probe probability {} outside [0, 1]",
                p
            ))),
            other => Err(ModelError::Probe(format!(
                "probe returned {} probabilities for 1 row",
                other.len()
            ))),
        }
    }

    /// Pull per-row fraud probabilities out of a seq(map(int64, float))
    /// output, one map per batch row.
    fn extract_from_sequence(
        output: &ort::value::DynValue,
        n_rows: usize,
    ) -> Result<Vec<f64>, ModelError> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| ModelError::Inference(format!("sequence downcast failed: {}", e)))?;

        let maps = sequence
            .try_extract_sequence::<DynMapValueType>(&allocator)
            .map_err(|e| ModelError::Inference(format!("sequence extraction failed: {}", e)))?;

        if maps.len() != n_rows {
            return Err(ModelError::OutputArity {
                expected: n_rows,
                got: maps.len(),
            });
        }

        let mut probs = Vec::with_capacity(n_rows);
        for map_value in &maps {
            let kv_pairs = map_value
                .try_extract_key_values::<i64, f32>()
                .map_err(|e| ModelError::Inference(format!("map extraction failed: {}", e)))?;

            let positive = kv_pairs
                .iter()
                .find(|(class_id, _)| *class_id == 1)
                .map(|(_, p)| *p as f64)
                .or_else(|| {
                    kv_pairs
                        .iter()
                        .find(|(class_id, _)| *class_id == 0)
                        .map(|(_, p)| 1.0 - *p as f64)
                })
                .ok_or_else(|| {
                    ModelError::Inference("no class probability in map output".to_string())
                })?;

            probs.push(positive);
        }

        Ok(probs)
    }

    /// Pull per-row fraud probabilities out of a plain tensor output.
    ///
    /// Accepts [n, 2] class-probability matrices, [n, 1] columns, and flat
    /// [n] vectors.
    fn extract_from_tensor(
        shape: &ort::tensor::Shape,
        data: &[f32],
        n_rows: usize,
    ) -> Result<Vec<f64>, ModelError> {
        let dims: Vec<i64> = shape.iter().copied().collect();

        let probs: Vec<f64> = match dims.as_slice() {
            [rows, cols] if *rows as usize == n_rows && *cols >= 2 => {
                let cols = *cols as usize;
                (0..n_rows).map(|i| data[i * cols + 1] as f64).collect()
            }
            [rows, 1] if *rows as usize == n_rows => {
                data.iter().map(|&p| p as f64).collect()
            }
            [rows] if *rows as usize == n_rows => {
                data.iter().map(|&p| p as f64).collect()
            }
            _ => {
                return Err(ModelError::Inference(format!(
                    "unexpected output shape {:?} for {} rows",
                    dims, n_rows
                )))
            }
        };

        Ok(probs)
    }
}

impl Scorer for OnnxScorer {
    fn score_batch(&self, rows: &[[f32; FEATURE_COUNT]]) -> Result<Vec<f64>, ModelError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let n_rows = rows.len();
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        let shape = vec![n_rows as i64, FEATURE_COUNT as i64];
        let input = Tensor::from_array((shape, flat))
            .map_err(|e| ModelError::Inference(format!("input tensor build failed: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            ModelError::Inference(format!("output {} missing from model", self.output_name))
        })?;

        let probs = if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            debug!(rows = n_rows, "extracted probabilities from tensor output");
            Self::extract_from_tensor(&shape, data, n_rows)?
        } else if DynSequenceValueType::can_downcast(&output.dtype()) {
            debug!(rows = n_rows, "extracted probabilities from seq(map) output");
            Self::extract_from_sequence(output, n_rows)?
        } else {
            return Err(ModelError::Inference(format!(
                "output {} is neither a float tensor nor a sequence",
                self.output_name
            )));
        };

        for &p in &probs {
            if !(0.0..=1.0).contains(&p) || !p.is_finite() {
                return Err(ModelError::OutOfRange(p));
            }
        }

        Ok(probs)
    }

    fn name(&self) -> &str {
        &self.model_path
    }
}
