use super::{ModelError, Scorer};
use crate::domain::FEATURE_COUNT;

/// Deterministic in-memory scorer backing tests and benches.
///
/// Returns a fixed probability for every row, or a per-row sequence when
/// constructed with `with_sequence`.
pub struct StubScorer {
    fixed: f64,
    sequence: Option<Vec<f64>>,
}

impl StubScorer {
    /// Score every row with the same probability.
    pub fn fixed(probability: f64) -> Self {
        StubScorer {
            fixed: probability,
            sequence: None,
        }
    }

    /// Score row i with `probabilities[i % len]`.
    pub fn with_sequence(probabilities: Vec<f64>) -> Self {
        StubScorer {
            fixed: 0.0,
            sequence: Some(probabilities),
        }
    }
}

impl Scorer for StubScorer {
    fn score_batch(&self, rows: &[[f32; FEATURE_COUNT]]) -> Result<Vec<f64>, ModelError> {
        match &self.sequence {
            Some(seq) => Ok((0..rows.len()).map(|i| seq[i % seq.len()]).collect()),
            None => Ok(vec![self.fixed; rows.len()]),
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_scorer() {
        let scorer = StubScorer::fixed(0.7);
        let rows = [[0.0; FEATURE_COUNT]; 3];

        assert_eq!(scorer.score_batch(&rows).unwrap(), vec![0.7, 0.7, 0.7]);
    }

    #[test]
    fn test_sequence_scorer_cycles() {
        let scorer = StubScorer::with_sequence(vec![0.1, 0.9]);
        let rows = [[0.0; FEATURE_COUNT]; 3];

        assert_eq!(scorer.score_batch(&rows).unwrap(), vec![0.1, 0.9, 0.1]);
    }

    #[test]
    fn test_empty_batch() {
        let scorer = StubScorer::fixed(0.5);

        assert!(scorer.score_batch(&[]).unwrap().is_empty());
    }
}
