//! Synthetic harvester dataset, used for demos and as the CSV template.
//!
//! Every draw comes from a locally owned, explicitly seeded generator, so two
//! calls with the same count and seed yield identical tables and concurrent
//! callers never share random state. Rows are sampled one at a time, field by
//! field in file order; a table of `n` rows is therefore a prefix of the
//! table of `n + 1` rows under the same seed.

use std::ops::Range;

use chrono::{Days, NaiveDate};
use rand::distributions::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::{MetricsError, Result};
use crate::metrics::round_half_even;
use crate::record::{CertificationLevel, Compensation, Measurements, WorkerRecord, WorkerTable};

/// Estates the synthetic workers are spread across.
pub const ESTATES: [&str; 4] = [
    "Estate A - Riau",
    "Estate B - Jambi",
    "Estate C - Sumut",
    "Estate D - Kalbar",
];

pub const DEFAULT_WORKER_COUNT: usize = 50;
pub const DEFAULT_SEED: u64 = 42;

const BASE_WAGES: [u32; 3] = [85_000, 90_000, 95_000];
const PREMIUMS_PER_KG: [u32; 3] = [150, 175, 200];
const LEVEL_WEIGHTS: [f64; 3] = [0.5, 0.35, 0.15];

const CERTIFICATION_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2024, 1, 15) {
    Some(date) => date,
    None => panic!("invalid certification epoch"),
};

/// Parameters of one synthetic generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub count: usize,
    pub seed: u64,
    /// Certification date of the first worker.
    pub start_date: NaiveDate,
    /// Days between consecutive certification dates.
    pub step_days: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_WORKER_COUNT,
            seed: DEFAULT_SEED,
            start_date: CERTIFICATION_EPOCH,
            step_days: 5,
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the table described by this configuration.
    pub fn generate(&self) -> Result<WorkerTable> {
        if self.count == 0 {
            return Err(MetricsError::Validation(
                "Synthetic worker count must be positive".into(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let sampler = RowSampler::new()?;

        let records = (0..self.count)
            .map(|i| {
                let offset = self.step_days.saturating_mul(i as u64);
                let date = self
                    .start_date
                    .checked_add_days(Days::new(offset))
                    .ok_or_else(|| {
                        MetricsError::General(format!(
                            "Certification date overflows for row {i}"
                        ))
                    })?;
                Ok::<_, MetricsError>(sampler.sample(&mut rng, i + 1, date))
            })
            .collect::<Result<WorkerTable>>()?;

        tracing::info!(
            count = self.count,
            seed = self.seed,
            "generated synthetic worker table"
        );
        Ok(records)
    }
}

/// Generate `count` synthetic workers from `seed` with the default
/// certification calendar.
pub fn generate_synthetic(count: usize, seed: u64) -> Result<WorkerTable> {
    GeneratorConfig::default()
        .with_count(count)
        .with_seed(seed)
        .generate()
}

// ── Distributions ───────────────────────────────────────────────────────────

struct PeriodSampler {
    tonnage: Normal<f64>,
    trees: Range<u32>,
    loose_loss: Normal<f64>,
    unripe: Normal<f64>,
    rotten: Normal<f64>,
    long_stalk: Normal<f64>,
    days: Range<u32>,
}

impl PeriodSampler {
    fn sample(&self, rng: &mut StdRng) -> Measurements {
        Measurements {
            tonnage_kg: round_half_even(self.tonnage.sample(rng), 1),
            trees: rng.gen_range(self.trees.clone()),
            loose_loss_pct: round_half_even(self.loose_loss.sample(rng), 2),
            unripe_pct: round_half_even(self.unripe.sample(rng), 2),
            rotten_pct: round_half_even(self.rotten.sample(rng), 2),
            long_stalk_pct: round_half_even(self.long_stalk.sample(rng), 2),
            days_worked: rng.gen_range(self.days.clone()),
        }
    }
}

struct RowSampler {
    before: PeriodSampler,
    after: PeriodSampler,
    levels: WeightedIndex<f64>,
}

impl RowSampler {
    fn new() -> Result<Self> {
        let before = PeriodSampler {
            tonnage: normal(850.0, 120.0)?,
            trees: 45..70,
            loose_loss: normal(8.5, 2.1)?,
            unripe: normal(6.8, 1.8)?,
            rotten: normal(4.2, 1.2)?,
            long_stalk: normal(12.5, 3.2)?,
            days: 22..26,
        };
        let after = PeriodSampler {
            tonnage: normal(1050.0, 110.0)?,
            trees: 60..85,
            loose_loss: normal(4.2, 1.5)?,
            unripe: normal(2.8, 1.1)?,
            rotten: normal(1.5, 0.8)?,
            long_stalk: normal(5.2, 1.8)?,
            days: 24..27,
        };
        let levels = WeightedIndex::new(LEVEL_WEIGHTS)
            .map_err(|e| MetricsError::General(format!("Invalid level weights: {e}")))?;
        Ok(Self {
            before,
            after,
            levels,
        })
    }

    fn sample(&self, rng: &mut StdRng, index: usize, date: NaiveDate) -> WorkerRecord {
        let estate = ESTATES[rng.gen_range(0..ESTATES.len())].to_string();
        let before = self.before.sample(rng);
        let after = self.after.sample(rng);
        let compensation = Compensation {
            base_wage: BASE_WAGES[rng.gen_range(0..BASE_WAGES.len())],
            premium_per_kg: PREMIUMS_PER_KG[rng.gen_range(0..PREMIUMS_PER_KG.len())],
        };
        let years_of_service = rng.gen_range(1..15);
        let age = rng.gen_range(22..55);
        let certification_level = CertificationLevel::ALL[self.levels.sample(rng)];

        WorkerRecord {
            worker_id: format!("HRV{index:04}"),
            name: format!("Pekerja {index}"),
            estate,
            certification_date: date,
            certification_level,
            before,
            after,
            compensation,
            years_of_service,
            age,
        }
    }
}

fn normal(mean: f64, sd: f64) -> Result<Normal<f64>> {
    Normal::new(mean, sd).map_err(|e| {
        MetricsError::General(format!("Invalid normal distribution ({mean}, {sd}): {e}"))
    })
}
