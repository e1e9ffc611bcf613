pub mod dataset;
pub mod population;

pub use dataset::{DatasetError, DatasetManifest, DatasetWriter};
pub use population::{generate, PopulationParams};

use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{FeatureVector, Transaction};
use crate::rules::RuleEngine;

/// One training row: the engineered features and the synthesized label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    #[serde(flatten)]
    pub features: FeatureVector,
    pub label: bool,
}

/// Counts from one synthesis run, recorded in the dataset manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisReport {
    pub population: usize,
    pub positives_before_floor: usize,
    pub positives_after_floor: usize,
    pub flips_applied: usize,
}

/// Manufactures ground-truth labels from the rule engine.
///
/// Labeling runs in two phases over the whole population: first every row
/// gets its synthesis-mode verdict independently, then a single corrective
/// pass flips uniformly chosen negatives until the positive rate reaches
/// the policy floor. Flipped rows are not re-evaluated; the flips are label
/// noise by construction.
pub struct LabelSynthesizer {
    engine: RuleEngine,
}

impl LabelSynthesizer {
    pub fn new(engine: RuleEngine) -> Self {
        LabelSynthesizer { engine }
    }

    /// Label a population.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        population: &[Transaction],
        rng: &mut R,
    ) -> (Vec<LabeledExample>, SynthesisReport) {
        let policy = self.engine.policy();

        let mut examples: Vec<LabeledExample> = population
            .iter()
            .map(|tx| {
                let (_, label) = self.engine.synthesis_label(tx, rng);
                LabeledExample {
                    features: FeatureVector::derive(tx, policy),
                    label,
                }
            })
            .collect();

        let positives_before_floor = examples.iter().filter(|e| e.label).count();
        let flips_applied = self.apply_prevalence_floor(&mut examples, positives_before_floor, rng);
        let positives_after_floor = positives_before_floor + flips_applied;

        let report = SynthesisReport {
            population: population.len(),
            positives_before_floor,
            positives_after_floor,
            flips_applied,
        };

        info!(
            population = report.population,
            positives_before = report.positives_before_floor,
            positives_after = report.positives_after_floor,
            flips = report.flips_applied,
            "label synthesis complete"
        );

        (examples, report)
    }

    /// Flip negatives until the positive rate reaches `min_fraud_rate`.
    ///
    /// The target count rounds up so the post-condition holds exactly at
    /// populations where rate * size is not integral.
    fn apply_prevalence_floor<R: Rng + ?Sized>(
        &self,
        examples: &mut [LabeledExample],
        positives: usize,
        rng: &mut R,
    ) -> usize {
        let target = (self.engine.policy().min_fraud_rate * examples.len() as f64).ceil() as usize;
        if positives >= target {
            return 0;
        }

        let negative_indices: Vec<usize> = examples
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.label)
            .map(|(i, _)| i)
            .collect();

        let flips = (target - positives).min(negative_indices.len());
        for pick in sample(rng, negative_indices.len(), flips) {
            examples[negative_indices[pick]].label = true;
        }

        flips
    }
}
