use rand::seq::index::sample;
use rand::Rng;
use rand_distr::{Distribution, Exp, Normal};

use crate::domain::Transaction;

/// Population shape parameters.
///
/// The distribution constants reproduce the statistical model the scoring
/// model was fitted against; changing them without refitting shifts the
/// training distribution.
#[derive(Debug, Clone, Copy)]
pub struct PopulationParams {
    /// Number of transactions to generate
    pub size: usize,

    /// Number of distinct user profiles
    pub users: usize,
}

const USER_AVG_AMOUNT_SCALE: f64 = 25_000.0;
const USER_BALANCE_SCALE: f64 = 80_000.0;
const AMOUNT_SCALE: f64 = 20_000.0;
const BALANCE_STDDEV: f64 = 30_000.0;
const BALANCE_MIN: f64 = 50.0;
const HEAVY_TAIL_FRACTION: f64 = 0.02;
const HEAVY_TAIL_MIN: f64 = 50_000.0;
const HEAVY_TAIL_MAX: f64 = 250_000.0;
const FOREIGN_RATE: f64 = 0.05;
const HIGH_RISK_RATE: f64 = 0.02;

struct UserProfile {
    avg_amount: f64,
    mean_balance: f64,
}

/// Generate a synthetic transaction population.
///
/// Deterministic for a given RNG state: the same seed yields the same
/// population element for element.
pub fn generate<R: Rng + ?Sized>(params: PopulationParams, rng: &mut R) -> Vec<Transaction> {
    let avg_amount_dist = Exp::new(1.0 / USER_AVG_AMOUNT_SCALE).expect("positive rate");
    let user_balance_dist = Exp::new(1.0 / USER_BALANCE_SCALE).expect("positive rate");
    let amount_dist = Exp::new(1.0 / AMOUNT_SCALE).expect("positive rate");

    let users: Vec<UserProfile> = (0..params.users)
        .map(|_| UserProfile {
            avg_amount: avg_amount_dist.sample(rng),
            mean_balance: user_balance_dist.sample(rng),
        })
        .collect();

    let mut transactions: Vec<Transaction> = (0..params.size)
        .map(|_| {
            let user_id = rng.gen_range(0..params.users) as i64;
            let profile = &users[user_id as usize];

            let balance_dist =
                Normal::new(profile.mean_balance, BALANCE_STDDEV).expect("finite stddev");
            let balance = balance_dist.sample(rng).max(BALANCE_MIN);

            Transaction {
                amount: amount_dist.sample(rng),
                hour: rng.gen_range(0..24),
                is_foreign: rng.gen_bool(FOREIGN_RATE),
                is_high_risk: rng.gen_bool(HIGH_RISK_RATE),
                user_id,
                balance,
                avg_amount: profile.avg_amount,
            }
        })
        .collect();

    // Heavy tail: a fixed 2% subsample, drawn without replacement, gets a
    // large uniform bump so the population contains genuinely big amounts.
    let tail_count = (params.size as f64 * HEAVY_TAIL_FRACTION) as usize;
    if tail_count > 0 {
        for idx in sample(rng, params.size, tail_count) {
            transactions[idx].amount += rng.gen_range(HEAVY_TAIL_MIN..HEAVY_TAIL_MAX);
        }
    }

    transactions
}
