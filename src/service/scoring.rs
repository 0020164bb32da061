use chrono::{Datelike, NaiveDate};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Baseline workload for a calendar day, before existing leave is added.
/// Days scoring below 1 are recommended.
pub trait WorkloadScorer: Send + Sync {
    fn workload(&self, day: NaiveDate) -> f64;
}

/// Uniform in `[0, 1)`, fresh on every call.
pub struct RandomWorkload;

impl WorkloadScorer for RandomWorkload {
    fn workload(&self, _day: NaiveDate) -> f64 {
        rand::thread_rng().r#gen()
    }
}

/// Uniform in `[0, 1)`, fixed per (seed, day).
pub struct SeededWorkload {
    pub seed: u64,
}

impl WorkloadScorer for SeededWorkload {
    fn workload(&self, day: NaiveDate) -> f64 {
        let mut rng = StdRng::seed_from_u64(self.seed ^ day.num_days_from_ce() as u64);
        rng.r#gen()
    }
}

pub struct FlatWorkload(pub f64);

impl WorkloadScorer for FlatWorkload {
    fn workload(&self, _day: NaiveDate) -> f64 {
        self.0
    }
}
