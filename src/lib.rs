pub mod api;
pub mod config;
pub mod domain;
pub mod model;
pub mod observability;
pub mod rules;
pub mod scoring;
pub mod synth;

pub use config::{Cli, Command, ServeConfig, SynthConfig};
pub use domain::{FeatureVector, Prediction, RulePolicy, Transaction};
pub use model::{ModelError, Scorer};
pub use rules::{RuleEngine, VerdictSet};
pub use scoring::ScoringPipeline;
