use serde::{Deserialize, Serialize};

use crate::domain::Transaction;

/// Request for a batch score.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreRequest {
    /// Transactions to score, results come back in the same order
    pub transactions: Vec<TxRecord>,
}

/// One transaction in the request body.
///
/// `is_foreign` and `is_high_risk` default to false; every other field is
/// required and rejected at deserialization when missing.
#[derive(Debug, Serialize, Deserialize)]
pub struct TxRecord {
    pub amount: f64,
    pub hour: u8,
    #[serde(default)]
    pub is_foreign: bool,
    #[serde(default)]
    pub is_high_risk: bool,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub balance: f64,
    pub avg_amount: f64,
}

impl TxRecord {
    /// Field-range check beyond what serde typing enforces.
    fn validate(&self, index: usize) -> Result<(), String> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(format!(
                "transactions[{}]: amount must be non-negative and finite",
                index
            ));
        }
        if self.hour > 23 {
            return Err(format!("transactions[{}]: hour must be within 0..=23", index));
        }
        if !self.balance.is_finite() || self.balance < 0.0 {
            return Err(format!(
                "transactions[{}]: balance must be non-negative and finite",
                index
            ));
        }
        if !self.avg_amount.is_finite() || self.avg_amount < 0.0 {
            return Err(format!(
                "transactions[{}]: avg_amount must be non-negative and finite",
                index
            ));
        }
        Ok(())
    }

    fn to_transaction(&self) -> Transaction {
        Transaction {
            amount: self.amount,
            hour: self.hour,
            is_foreign: self.is_foreign,
            is_high_risk: self.is_high_risk,
            user_id: self.user_id,
            balance: self.balance,
            avg_amount: self.avg_amount,
        }
    }
}

impl ScoreRequest {
    /// Validate the whole batch and convert to domain transactions.
    ///
    /// Any malformed element rejects the entire batch; nothing is scored
    /// partially.
    pub fn into_transactions(self) -> Result<Vec<Transaction>, String> {
        for (index, record) in self.transactions.iter().enumerate() {
            record.validate(index)?;
        }

        Ok(self
            .transactions
            .iter()
            .map(TxRecord::to_transaction)
            .collect())
    }
}
