use serde::{Deserialize, Serialize};

use super::policy::RulePolicy;
use super::transaction::Transaction;

/// Number of model input columns.
pub const FEATURE_COUNT: usize = 15;

/// Feature schema version, recorded in dataset manifests and `/ready`.
pub const SCHEMA_VERSION: &str = "v1";

/// Model input columns in wire and tensor order.
///
/// This order is part of the contract with the fitted model. Reordering,
/// inserting, or removing a column requires refitting and a new
/// `SCHEMA_VERSION`.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "amount",
    "hour",
    "is_foreign",
    "is_high_risk",
    "userId",
    "balance",
    "avg_amount",
    "high_amount",
    "night_transaction",
    "amount_hour_ratio",
    "foreign_high",
    "risk_high",
    "amount_to_avg_ratio",
    "balance_to_avg_ratio",
    "critical_low_balance",
];

/// The full engineered row fed to the model.
///
/// Derivation is a pure function of the transaction and the rule policy.
/// Same inputs produce the same vector on every host, at training time and
/// at serving time. Vectors are computed fresh per request and never
/// persisted in the serving path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub amount: f64,
    pub hour: u8,
    pub is_foreign: bool,
    pub is_high_risk: bool,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub balance: f64,
    pub avg_amount: f64,

    /// amount > balance * high_amount_mult
    pub high_amount: bool,

    /// hour < 6 or hour > 22
    pub night_transaction: bool,

    /// amount / (hour + 1)
    pub amount_hour_ratio: f64,

    /// is_foreign and high_amount
    pub foreign_high: bool,

    /// is_high_risk and high_amount
    pub risk_high: bool,

    /// amount / (avg_amount + 1)
    pub amount_to_avg_ratio: f64,

    /// balance / (avg_amount + 1)
    pub balance_to_avg_ratio: f64,

    /// amount > amount_threshold and balance < critical_balance_mult * amount
    pub critical_low_balance: bool,
}

impl FeatureVector {
    /// Derive the engineered row for one transaction.
    pub fn derive(tx: &Transaction, policy: &RulePolicy) -> Self {
        let high_amount = policy.high_amount(tx.amount, tx.balance);
        let night_transaction = tx.hour < 6 || tx.hour > 22;

        // The +1 offsets in the ratio denominators are part of the trained
        // contract; hour 0 and zero averages divide by 1, not by 0.
        FeatureVector {
            amount: tx.amount,
            hour: tx.hour,
            is_foreign: tx.is_foreign,
            is_high_risk: tx.is_high_risk,
            user_id: tx.user_id,
            balance: tx.balance,
            avg_amount: tx.avg_amount,
            high_amount,
            night_transaction,
            amount_hour_ratio: tx.amount / (tx.hour as f64 + 1.0),
            foreign_high: tx.is_foreign && high_amount,
            risk_high: tx.is_high_risk && high_amount,
            amount_to_avg_ratio: tx.amount / (tx.avg_amount + 1.0),
            balance_to_avg_ratio: tx.balance / (tx.avg_amount + 1.0),
            critical_low_balance: policy.critical_low_balance(tx.amount, tx.balance),
        }
    }

    /// Flatten to the model input row, columns in `FEATURE_NAMES` order.
    pub fn to_row(&self) -> [f32; FEATURE_COUNT] {
        [
            self.amount as f32,
            self.hour as f32,
            self.is_foreign as u8 as f32,
            self.is_high_risk as u8 as f32,
            self.user_id as f32,
            self.balance as f32,
            self.avg_amount as f32,
            self.high_amount as u8 as f32,
            self.night_transaction as u8 as f32,
            self.amount_hour_ratio as f32,
            self.foreign_high as u8 as f32,
            self.risk_high as u8 as f32,
            self.amount_to_avg_ratio as f32,
            self.balance_to_avg_ratio as f32,
            self.critical_low_balance as u8 as f32,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RulePolicy {
        RulePolicy::default()
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let tx = Transaction::new(1_234.56, 3, 42, 9_876.54, 400.0);

        let a = FeatureVector::derive(&tx, &policy());
        let b = FeatureVector::derive(&tx, &policy());

        assert_eq!(a, b);
        assert_eq!(a.to_row(), b.to_row());
    }

    #[test]
    fn test_derived_columns() {
        let mut tx = Transaction::new(60_000.0, 0, 7, 20_000.0, 1_000.0);
        tx.is_foreign = true;

        let fv = FeatureVector::derive(&tx, &policy());

        // 60_000 > 20_000 * 1.5
        assert!(fv.high_amount);
        assert!(fv.night_transaction);
        assert!(fv.foreign_high);
        assert!(!fv.risk_high);
        // 60_000 > 50_000 and 20_000 < 30_000
        assert!(fv.critical_low_balance);
        assert_eq!(fv.amount_hour_ratio, 60_000.0);
        assert_eq!(fv.amount_to_avg_ratio, 60_000.0 / 1_001.0);
        assert_eq!(fv.balance_to_avg_ratio, 20_000.0 / 1_001.0);
    }

    #[test]
    fn test_high_amount_boundary_not_inclusive() {
        // amount exactly equal to balance * 1.5 is not high.
        let tx = Transaction::new(1_500.0, 12, 1, 1_000.0, 100.0);
        let fv = FeatureVector::derive(&tx, &policy());
        assert!(!fv.high_amount);
    }

    #[test]
    fn test_night_boundaries() {
        for (hour, night) in [(0, true), (5, true), (6, false), (22, false), (23, true)] {
            let tx = Transaction::new(10.0, hour, 1, 100.0, 10.0);
            let fv = FeatureVector::derive(&tx, &policy());
            assert_eq!(fv.night_transaction, night, "hour {}", hour);
        }
    }

    #[test]
    fn test_zero_hour_and_zero_avg_do_not_divide_by_zero() {
        let tx = Transaction::new(100.0, 0, 1, 50.0, 0.0);
        let fv = FeatureVector::derive(&tx, &policy());

        assert_eq!(fv.amount_hour_ratio, 100.0);
        assert_eq!(fv.amount_to_avg_ratio, 100.0);
        assert_eq!(fv.balance_to_avg_ratio, 50.0);
    }

    #[test]
    fn test_row_matches_schema_order() {
        let tx = Transaction::new(100.0, 14, 9, 5_000.0, 200.0);
        let fv = FeatureVector::derive(&tx, &policy());
        let row = fv.to_row();

        assert_eq!(row.len(), FEATURE_COUNT);
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
        assert_eq!(row[0], 100.0);
        assert_eq!(row[1], 14.0);
        assert_eq!(row[4], 9.0);
        assert_eq!(row[5], 5_000.0);
        assert_eq!(FEATURE_NAMES[14], "critical_low_balance");
        assert_eq!(row[14], 0.0);
    }
}
