use std::sync::Arc;

use tracing::info;

use crate::domain::{FeatureVector, Prediction, Transaction};
use crate::model::{ModelError, Scorer};
use crate::rules::RuleEngine;

/// Serving-time scoring: features, one model call per batch, then the
/// guard-rail override.
///
/// Elements are independent; output order equals input order. The override
/// reads the `critical_low_balance` feature column itself, so the value the
/// model saw and the value the override acted on are the same by
/// construction.
pub struct ScoringPipeline {
    scorer: Arc<dyn Scorer>,
    engine: RuleEngine,
}

impl ScoringPipeline {
    pub fn new(scorer: Arc<dyn Scorer>, engine: RuleEngine) -> Self {
        ScoringPipeline { scorer, engine }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// Score a batch of transactions.
    ///
    /// Returns one prediction per transaction in input order, or the model
    /// error for the whole batch; partial results are never produced.
    pub fn score_batch(&self, transactions: &[Transaction]) -> Result<Vec<Prediction>, ModelError> {
        let features: Vec<FeatureVector> = transactions
            .iter()
            .map(|tx| FeatureVector::derive(tx, self.engine.policy()))
            .collect();

        let rows: Vec<_> = features.iter().map(FeatureVector::to_row).collect();
        let probabilities = self.scorer.score_batch(&rows)?;

        if probabilities.len() != features.len() {
            return Err(ModelError::OutputArity {
                expected: features.len(),
                got: probabilities.len(),
            });
        }

        let predictions = features
            .into_iter()
            .zip(probabilities)
            .map(|(fv, probability)| {
                if fv.critical_low_balance {
                    info!(
                        user_id = fv.user_id,
                        amount = fv.amount,
                        balance = fv.balance,
                        model_probability = probability,
                        "guard-rail override: critical_low_balance"
                    );
                    Prediction::overridden(fv)
                } else {
                    Prediction::from_model(fv, probability)
                }
            })
            .collect();

        Ok(predictions)
    }

    /// Count of overrides a batch of predictions carries, for metrics.
    pub fn override_count(predictions: &[Prediction]) -> u64 {
        predictions
            .iter()
            .filter(|p| p.features.critical_low_balance)
            .count() as u64
    }
}
