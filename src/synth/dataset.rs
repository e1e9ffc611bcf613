use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{LabeledExample, SynthesisReport};
use crate::domain::SCHEMA_VERSION;

/// Errors raised while writing a dataset to disk.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to write dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize dataset row: {0}")]
    Json(#[from] serde_json::Error),
}

/// Provenance record written next to the dataset.
///
/// The external fitting step reads this to verify it is training against
/// the feature schema and policy the serving side will run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub dataset_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub schema_version: String,
    pub policy_version: String,
    pub population: usize,
    pub users: usize,
    pub seed: u64,
    pub positives_before_floor: usize,
    pub positives_after_floor: usize,
    pub flips_applied: usize,
}

impl DatasetManifest {
    pub fn new(report: &SynthesisReport, policy_version: &str, users: usize, seed: u64) -> Self {
        DatasetManifest {
            dataset_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            schema_version: SCHEMA_VERSION.to_string(),
            policy_version: policy_version.to_string(),
            population: report.population,
            users,
            seed,
            positives_before_floor: report.positives_before_floor,
            positives_after_floor: report.positives_after_floor,
            flips_applied: report.flips_applied,
        }
    }
}

/// Writes labeled examples as JSON lines plus a manifest.
pub struct DatasetWriter {
    output: PathBuf,
}

impl DatasetWriter {
    pub fn new(output: PathBuf) -> Self {
        DatasetWriter { output }
    }

    /// Path of the manifest written beside the dataset.
    pub fn manifest_path(&self) -> PathBuf {
        self.output.with_extension("manifest.json")
    }

    /// Write the dataset file, one flattened example per line.
    pub fn write_examples(&self, examples: &[LabeledExample]) -> Result<(), DatasetError> {
        let file = File::create(&self.output)?;
        let mut writer = BufWriter::new(file);

        for example in examples {
            serde_json::to_writer(&mut writer, example)?;
            writer.write_all(b"\n")?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write the manifest beside the dataset.
    pub fn write_manifest(&self, manifest: &DatasetManifest) -> Result<(), DatasetError> {
        let file = File::create(self.manifest_path())?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, manifest)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureVector, RulePolicy, Transaction};
    use std::io::BufRead;

    fn example(label: bool) -> LabeledExample {
        let tx = Transaction::new(100.0, 14, 1, 5_000.0, 200.0);
        LabeledExample {
            features: FeatureVector::derive(&tx, &RulePolicy::default()),
            label,
        }
    }

    #[test]
    fn test_jsonl_rows_flatten_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.jsonl");
        let writer = DatasetWriter::new(path.clone());

        writer
            .write_examples(&[example(false), example(true)])
            .unwrap();

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        let row: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(row["amount"], 100.0);
        assert_eq!(row["userId"], 1);
        assert_eq!(row["label"], false);
        let row: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(row["label"], true);
    }

    #[test]
    fn test_manifest_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DatasetWriter::new(dir.path().join("dataset.jsonl"));

        let report = SynthesisReport {
            population: 1_000,
            positives_before_floor: 30,
            positives_after_floor: 50,
            flips_applied: 20,
        };
        let manifest = DatasetManifest::new(&report, "builtin-v1", 100, 42);
        writer.write_manifest(&manifest).unwrap();

        let contents = std::fs::read_to_string(writer.manifest_path()).unwrap();
        let parsed: DatasetManifest = serde_json::from_str(&contents).unwrap();

        assert_eq!(parsed.dataset_id, manifest.dataset_id);
        assert_eq!(parsed.schema_version, SCHEMA_VERSION);
        assert_eq!(parsed.policy_version, "builtin-v1");
        assert_eq!(parsed.population, 1_000);
        assert_eq!(parsed.flips_applied, 20);
        assert_eq!(parsed.seed, 42);
    }
}
