use serde::{Deserialize, Serialize};

use super::features::FeatureVector;

/// Model probability above which a transaction is flagged.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Probability reported when the guard-rail override fires.
pub const OVERRIDE_PROBABILITY: f64 = 0.99;

/// Scoring outcome for a single transaction.
///
/// The engineered features are echoed back so callers can audit exactly
/// what the model saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Engineered features the model scored
    #[serde(flatten)]
    pub features: FeatureVector,

    /// Fraud probability in [0, 1]
    pub fraud_probability: f64,

    /// Final verdict after the override policy
    pub is_fraud: bool,
}

impl Prediction {
    /// Outcome driven purely by the model probability.
    pub fn from_model(features: FeatureVector, probability: f64) -> Self {
        Prediction {
            features,
            is_fraud: probability > DECISION_THRESHOLD,
            fraud_probability: probability,
        }
    }

    /// Outcome forced positive by the guard-rail override.
    pub fn overridden(features: FeatureVector) -> Self {
        Prediction {
            features,
            fraud_probability: OVERRIDE_PROBABILITY,
            is_fraud: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::RulePolicy;
    use crate::domain::transaction::Transaction;

    fn features() -> FeatureVector {
        let tx = Transaction::new(100.0, 14, 1, 5_000.0, 200.0);
        FeatureVector::derive(&tx, &RulePolicy::default())
    }

    #[test]
    fn test_threshold_is_strict() {
        let at = Prediction::from_model(features(), 0.5);
        let above = Prediction::from_model(features(), 0.500001);

        assert!(!at.is_fraud);
        assert!(above.is_fraud);
    }

    #[test]
    fn test_override_forces_positive() {
        let p = Prediction::overridden(features());

        assert!(p.is_fraud);
        assert_eq!(p.fraud_probability, OVERRIDE_PROBABILITY);
    }

    #[test]
    fn test_features_flatten_into_json() {
        let p = Prediction::from_model(features(), 0.25);
        let json = serde_json::to_value(&p).unwrap();

        assert_eq!(json["amount"], 100.0);
        assert_eq!(json["userId"], 1);
        assert_eq!(json["fraud_probability"], 0.25);
        assert_eq!(json["is_fraud"], false);
    }
}
