use serde::{Deserialize, Serialize};

/// A financial transaction as received from the caller.
///
/// Immutable once constructed. `user_id` carries no uniqueness
/// constraint within a batch; it is an opaque identifier fed to the
/// model alongside the numeric fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction amount, >= 0
    pub amount: f64,

    /// Hour of day the transaction occurred, 0..=23
    pub hour: u8,

    /// Whether the transaction crosses a border
    #[serde(default)]
    pub is_foreign: bool,

    /// Whether the counterparty is flagged high risk
    #[serde(default)]
    pub is_high_risk: bool,

    /// User identifier
    #[serde(rename = "userId")]
    pub user_id: i64,

    /// Current account balance, >= 0
    pub balance: f64,

    /// User's historical average transaction amount, >= 0
    pub avg_amount: f64,
}

impl Transaction {
    /// Create a transaction with both risk flags cleared.
    pub fn new(amount: f64, hour: u8, user_id: i64, balance: f64, avg_amount: f64) -> Self {
        Transaction {
            amount,
            hour,
            is_foreign: false,
            is_high_risk: false,
            user_id,
            balance,
            avg_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_default_false() {
        let json = r#"{
            "amount": 100.0,
            "hour": 14,
            "userId": 2,
            "balance": 5000.0,
            "avg_amount": 200.0
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();

        assert!(!tx.is_foreign);
        assert!(!tx.is_high_risk);
        assert_eq!(tx.user_id, 2);
    }

    #[test]
    fn test_missing_required_field_rejected() {
        // No balance
        let json = r#"{
            "amount": 100.0,
            "hour": 14,
            "userId": 2,
            "avg_amount": 200.0
        }"#;

        let result: Result<Transaction, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_wire_name_user_id() {
        let tx = Transaction::new(50.0, 9, 7, 1000.0, 40.0);
        let json = serde_json::to_string(&tx).unwrap();

        assert!(json.contains("\"userId\":7"));
        assert!(!json.contains("user_id"));
    }
}
