use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a rule policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse policy YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("policy validation failed: {0}")]
    Validation(String),
}

/// Thresholds for every guard-rail rule, as one named, versioned document.
///
/// The defaults reproduce the constants the scoring model was trained
/// against. Overriding a threshold in YAML without refitting the model
/// shifts the label distribution away from what the model learned, so
/// deployments pin `policy_version` alongside the model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePolicy {
    /// Policy version identifier
    #[serde(rename = "policy_version")]
    pub version: String,

    /// Absolute amount above which a transaction is considered large
    #[serde(default = "default_amount_threshold")]
    pub amount_threshold: f64,

    /// Balance-to-amount fraction below which balance is critically low
    #[serde(default = "default_critical_balance_mult")]
    pub critical_balance_mult: f64,

    /// Balance multiplier defining a high amount relative to balance
    #[serde(default = "default_high_amount_mult")]
    pub high_amount_mult: f64,

    /// Balance at or above which a user is exempt from soft rules
    #[serde(default = "default_balance_exemption")]
    pub balance_exemption: f64,

    /// Historical average at or above which a user is exempt from soft rules
    #[serde(default = "default_avg_amount_exemption")]
    pub avg_amount_exemption: f64,

    /// Balance multiplier for the foreign/high-risk night rule
    #[serde(default = "default_relative_to_balance_mult")]
    pub relative_to_balance_mult: f64,

    /// Average multiplier for the amount-vs-average rule
    #[serde(default = "default_relative_to_avg_mult")]
    pub relative_to_avg_mult: f64,

    /// Average multiplier for the foreign large-amount rule
    #[serde(default = "default_foreign_avg_mult")]
    pub foreign_avg_mult: f64,

    /// Balance multiplier for the low-balance overdraw rule
    #[serde(default = "default_low_balance_mult")]
    pub low_balance_mult: f64,

    /// Balance below which the overdraw rule applies
    #[serde(default = "default_low_balance_floor")]
    pub low_balance_floor: f64,

    /// Per-transaction probability of the random label floor (synthesis only)
    #[serde(default = "default_random_fraud_rate")]
    pub random_fraud_rate: f64,

    /// Minimum positive-label prevalence enforced after synthesis
    #[serde(default = "default_min_fraud_rate")]
    pub min_fraud_rate: f64,
}

fn default_amount_threshold() -> f64 {
    50_000.0
}

fn default_critical_balance_mult() -> f64 {
    0.5
}

fn default_high_amount_mult() -> f64 {
    1.5
}

fn default_balance_exemption() -> f64 {
    60_000.0
}

fn default_avg_amount_exemption() -> f64 {
    50_000.0
}

fn default_relative_to_balance_mult() -> f64 {
    1.2
}

fn default_relative_to_avg_mult() -> f64 {
    3.0
}

fn default_foreign_avg_mult() -> f64 {
    2.0
}

fn default_low_balance_mult() -> f64 {
    1.3
}

fn default_low_balance_floor() -> f64 {
    500.0
}

fn default_random_fraud_rate() -> f64 {
    0.01
}

fn default_min_fraud_rate() -> f64 {
    0.05
}

impl Default for RulePolicy {
    fn default() -> Self {
        RulePolicy {
            version: "builtin-v1".to_string(),
            amount_threshold: default_amount_threshold(),
            critical_balance_mult: default_critical_balance_mult(),
            high_amount_mult: default_high_amount_mult(),
            balance_exemption: default_balance_exemption(),
            avg_amount_exemption: default_avg_amount_exemption(),
            relative_to_balance_mult: default_relative_to_balance_mult(),
            relative_to_avg_mult: default_relative_to_avg_mult(),
            foreign_avg_mult: default_foreign_avg_mult(),
            low_balance_mult: default_low_balance_mult(),
            low_balance_floor: default_low_balance_floor(),
            random_fraud_rate: default_random_fraud_rate(),
            min_fraud_rate: default_min_fraud_rate(),
        }
    }
}

impl RulePolicy {
    /// Load and validate a policy from a YAML file.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let contents = std::fs::read_to_string(path)?;
        let policy: RulePolicy = serde_yaml::from_str(&contents)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Validate threshold sanity.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.version.trim().is_empty() {
            return Err(PolicyError::Validation(
                "policy_version must not be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("amount_threshold", self.amount_threshold),
            ("critical_balance_mult", self.critical_balance_mult),
            ("high_amount_mult", self.high_amount_mult),
            ("balance_exemption", self.balance_exemption),
            ("avg_amount_exemption", self.avg_amount_exemption),
            ("relative_to_balance_mult", self.relative_to_balance_mult),
            ("relative_to_avg_mult", self.relative_to_avg_mult),
            ("foreign_avg_mult", self.foreign_avg_mult),
            ("low_balance_mult", self.low_balance_mult),
            ("low_balance_floor", self.low_balance_floor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PolicyError::Validation(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }

        for (name, rate) in [
            ("random_fraud_rate", self.random_fraud_rate),
            ("min_fraud_rate", self.min_fraud_rate),
        ] {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(PolicyError::Validation(format!(
                    "{} must be within [0, 1], got {}",
                    name, rate
                )));
            }
        }

        Ok(())
    }

    /// Large amount against a balance too small to cover it.
    ///
    /// The single predicate behind the model feature column, the synthesis
    /// rule, and the serving-time override.
    pub fn critical_low_balance(&self, amount: f64, balance: f64) -> bool {
        amount > self.amount_threshold && balance < self.critical_balance_mult * amount
    }

    /// Amount large relative to the account balance.
    pub fn high_amount(&self, amount: f64, balance: f64) -> bool {
        amount > balance * self.high_amount_mult
    }

    /// Wealthy-user carve-out for the soft rules.
    pub fn exempt(&self, balance: f64, avg_amount: f64) -> bool {
        balance >= self.balance_exemption || avg_amount >= self.avg_amount_exemption
    }
}
