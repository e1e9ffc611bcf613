use serde::{Deserialize, Serialize};

/// Rule identifiers, used in logs and override evidence.
pub const RULE_CRITICAL_LOW_BALANCE: &str = "critical_low_balance";
pub const RULE_FOREIGN_HIGHRISK_NIGHT: &str = "foreign_highrisk_night";
pub const RULE_AMOUNT_VS_AVG: &str = "amount_vs_avg";
pub const RULE_AMOUNT_GT_BALANCE_LOW_BAL: &str = "amount_gt_balance_low_bal";
pub const RULE_FOREIGN_LARGE_VS_AVG: &str = "foreign_large_vs_avg";
pub const RULE_RANDOM_FLOOR: &str = "random_floor";

/// Outcome of every named rule against one transaction.
///
/// Computed fresh per transaction; nothing here carries state between
/// evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerdictSet {
    /// Large amount against a balance too small to cover it
    pub critical_low_balance: bool,

    /// Foreign, high-risk counterparty, overdrawing, at night
    pub foreign_highrisk_night: bool,

    /// Large amount far above the user's historical average
    pub amount_vs_avg: bool,

    /// Overdrawing a near-empty account
    pub amount_gt_balance_low_bal: bool,

    /// Foreign large amount well above the historical average
    pub foreign_large_vs_avg: bool,

    /// Random positive floor, synthesis mode only
    pub random_floor: bool,

    /// Wealthy-user carve-out suppressing the soft rules
    pub exempt: bool,
}

impl VerdictSet {
    /// Names of the rules that fired, for logging.
    pub fn fired(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.critical_low_balance {
            names.push(RULE_CRITICAL_LOW_BALANCE);
        }
        if self.foreign_highrisk_night {
            names.push(RULE_FOREIGN_HIGHRISK_NIGHT);
        }
        if self.amount_vs_avg {
            names.push(RULE_AMOUNT_VS_AVG);
        }
        if self.amount_gt_balance_low_bal {
            names.push(RULE_AMOUNT_GT_BALANCE_LOW_BAL);
        }
        if self.foreign_large_vs_avg {
            names.push(RULE_FOREIGN_LARGE_VS_AVG);
        }
        if self.random_floor {
            names.push(RULE_RANDOM_FLOOR);
        }
        names
    }
}
