pub mod verdict;

pub use verdict::VerdictSet;

use rand::Rng;

use crate::domain::{RulePolicy, Transaction};

/// Evaluates the named guard-rail rules against transactions.
///
/// The engine has two call paths with deliberately different shapes. Label
/// synthesis evaluates the full rule table and needs an RNG for the random
/// floor. The serving-time override evaluates only the critical rule and is
/// pure. Keeping the override path free of any RNG parameter means the
/// random floor cannot leak into serving by construction.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    policy: RulePolicy,
}

impl RuleEngine {
    pub fn new(policy: RulePolicy) -> Self {
        RuleEngine { policy }
    }

    pub fn policy(&self) -> &RulePolicy {
        &self.policy
    }

    /// Evaluate every deterministic rule plus the exemption.
    ///
    /// `random_floor` is left unset; only `synthesis_label` samples it.
    pub fn verdicts(&self, tx: &Transaction) -> VerdictSet {
        let p = &self.policy;

        VerdictSet {
            critical_low_balance: p.critical_low_balance(tx.amount, tx.balance),
            foreign_highrisk_night: tx.is_foreign
                && tx.is_high_risk
                && tx.amount > tx.balance * p.relative_to_balance_mult
                && (tx.hour < 6 || tx.hour > 22),
            amount_vs_avg: tx.amount > p.amount_threshold
                && tx.amount > p.relative_to_avg_mult * tx.avg_amount,
            amount_gt_balance_low_bal: tx.amount > tx.balance * p.low_balance_mult
                && tx.balance < p.low_balance_floor,
            foreign_large_vs_avg: tx.is_foreign
                && tx.amount > p.amount_threshold
                && tx.amount > p.foreign_avg_mult * tx.avg_amount,
            random_floor: false,
            exempt: p.exempt(tx.balance, tx.avg_amount),
        }
    }

    /// Synthesis-mode label: full rule table, exemption gating, random floor.
    ///
    /// Returns the verdicts alongside the aggregate label so callers can
    /// report per-rule firing counts.
    pub fn synthesis_label<R: Rng + ?Sized>(
        &self,
        tx: &Transaction,
        rng: &mut R,
    ) -> (VerdictSet, bool) {
        let mut v = self.verdicts(tx);
        v.random_floor = rng.gen::<f64>() < self.policy.random_fraud_rate;

        // foreign_highrisk_night only counts when the amount is also high
        // relative to balance at the stricter multiplier.
        let night_gated =
            v.foreign_highrisk_night && self.policy.high_amount(tx.amount, tx.balance);
        let soft = (v.amount_vs_avg || v.foreign_large_vs_avg || v.amount_gt_balance_low_bal)
            && !v.exempt;

        let label = v.critical_low_balance || night_gated || soft || v.random_floor;
        (v, label)
    }

    /// Serving-mode override: the critical rule alone, never exempted,
    /// no randomness.
    pub fn override_verdict(&self, tx: &Transaction) -> bool {
        self.policy.critical_low_balance(tx.amount, tx.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine() -> RuleEngine {
        RuleEngine::new(RulePolicy::default())
    }

    fn no_floor_policy() -> RulePolicy {
        RulePolicy {
            random_fraud_rate: 0.0,
            ..RulePolicy::default()
        }
    }

    #[test]
    fn test_critical_never_exempted() {
        // Wealthy user, balance over the exemption line, still critical.
        let tx = Transaction::new(200_000.0, 12, 1, 90_000.0, 100.0);
        let engine = RuleEngine::new(no_floor_policy());
        let mut rng = StdRng::seed_from_u64(1);

        let (v, label) = engine.synthesis_label(&tx, &mut rng);

        assert!(v.critical_low_balance);
        assert!(v.exempt);
        assert!(label);
        assert!(engine.override_verdict(&tx));
    }

    #[test]
    fn test_exemption_suppresses_soft_rules() {
        // amount_vs_avg fires on its own terms, but balance >= 60_000
        // exempts it; balance is also high enough that nothing else fires.
        let tx = Transaction::new(55_000.0, 12, 1, 120_000.0, 10_000.0);
        let engine = RuleEngine::new(no_floor_policy());
        let mut rng = StdRng::seed_from_u64(1);

        let (v, label) = engine.synthesis_label(&tx, &mut rng);

        assert!(v.amount_vs_avg);
        assert!(v.exempt);
        assert!(!v.critical_low_balance);
        assert!(!label);
    }

    #[test]
    fn test_night_rule_gated_by_high_amount() {
        // Fires at the 1.2x multiplier but stays under 1.5x, so the
        // aggregate drops it.
        let mut tx = Transaction::new(1_300.0, 2, 1, 1_000.0, 10_000.0);
        tx.is_foreign = true;
        tx.is_high_risk = true;
        let engine = RuleEngine::new(no_floor_policy());
        let mut rng = StdRng::seed_from_u64(1);

        let (v, label) = engine.synthesis_label(&tx, &mut rng);

        assert!(v.foreign_highrisk_night);
        assert!(!label);

        // Past 1.5x the same rule carries the label.
        tx.amount = 1_600.0;
        let (v, label) = engine.synthesis_label(&tx, &mut rng);
        assert!(v.foreign_highrisk_night);
        assert!(label);
    }

    #[test]
    fn test_low_balance_overdraw() {
        let tx = Transaction::new(700.0, 12, 1, 400.0, 650.0);
        let engine = RuleEngine::new(no_floor_policy());
        let mut rng = StdRng::seed_from_u64(1);

        let (v, label) = engine.synthesis_label(&tx, &mut rng);

        assert!(v.amount_gt_balance_low_bal);
        assert!(label);
    }

    #[test]
    fn test_foreign_large_vs_avg() {
        let mut tx = Transaction::new(60_000.0, 12, 1, 200_000.0, 25_000.0);
        tx.is_foreign = true;
        let engine = RuleEngine::new(no_floor_policy());
        let mut rng = StdRng::seed_from_u64(1);

        let (v, label) = engine.synthesis_label(&tx, &mut rng);

        // 60_000 > 2 * 25_000 but the 200_000 balance exempts it.
        assert!(v.foreign_large_vs_avg);
        assert!(v.exempt);
        assert!(!label);

        tx.balance = 50_000.0;
        let (v, label) = engine.synthesis_label(&tx, &mut rng);
        assert!(v.foreign_large_vs_avg);
        assert!(!v.exempt);
        assert!(label);
    }

    #[test]
    fn test_override_ignores_soft_rules() {
        // Soft rule fires, critical does not; the override stays quiet.
        let tx = Transaction::new(700.0, 12, 1, 400.0, 650.0);

        assert!(!engine().override_verdict(&tx));
    }

    #[test]
    fn test_verdicts_never_set_random_floor() {
        let tx = Transaction::new(100.0, 12, 1, 5_000.0, 200.0);

        assert!(!engine().verdicts(&tx).random_floor);
    }

    #[test]
    fn test_random_floor_rate_one_always_fires() {
        let policy = RulePolicy {
            random_fraud_rate: 1.0,
            ..RulePolicy::default()
        };
        let engine = RuleEngine::new(policy);
        let tx = Transaction::new(10.0, 12, 1, 5_000.0, 200.0);
        let mut rng = StdRng::seed_from_u64(7);

        let (v, label) = engine.synthesis_label(&tx, &mut rng);

        assert!(v.random_floor);
        assert!(label);
    }

    #[test]
    fn test_scenario_large_amount_thin_balance() {
        // amount 80_000, balance 10_000: critical fires, label positive.
        let tx = Transaction::new(80_000.0, 12, 1, 10_000.0, 5_000.0);
        let engine = RuleEngine::new(no_floor_policy());
        let mut rng = StdRng::seed_from_u64(1);

        let (v, label) = engine.synthesis_label(&tx, &mut rng);

        assert!(v.critical_low_balance);
        assert!(label);
    }

    #[test]
    fn test_scenario_routine_transaction() {
        // Small daytime domestic transaction on a healthy account: nothing
        // fires.
        let tx = Transaction::new(120.0, 14, 1, 8_000.0, 150.0);
        let engine = RuleEngine::new(no_floor_policy());
        let mut rng = StdRng::seed_from_u64(1);

        let (v, label) = engine.synthesis_label(&tx, &mut rng);

        assert!(v.fired().is_empty());
        assert!(!label);
    }
}
