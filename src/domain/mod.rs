pub mod features;
pub mod policy;
pub mod prediction;
pub mod transaction;

pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES, SCHEMA_VERSION};
pub use policy::{PolicyError, RulePolicy};
pub use prediction::{Prediction, DECISION_THRESHOLD, OVERRIDE_PROBABILITY};
pub use transaction::Transaction;
