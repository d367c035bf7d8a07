use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::MetricsError;
use crate::schema::certification;

/// Ordered competency tier of a certified harvester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CertificationLevel {
    Basic,
    Intermediate,
    Advanced,
}

impl CertificationLevel {
    pub const ALL: [CertificationLevel; 3] = [Self::Basic, Self::Intermediate, Self::Advanced];

    /// Label used in CSV files and on the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => certification::BASIC,
            Self::Intermediate => certification::INTERMEDIATE,
            Self::Advanced => certification::ADVANCED,
        }
    }
}

impl fmt::Display for CertificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CertificationLevel {
    type Err = MetricsError;

    /// Accepts the file labels (`Dasar`, `Madya`, `Mahir`) and the English
    /// tier names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dasar" | "basic" => Ok(Self::Basic),
            "madya" | "intermediate" => Ok(Self::Intermediate),
            "mahir" | "advanced" => Ok(Self::Advanced),
            other => Err(MetricsError::Validation(format!(
                "Unknown certification level: '{other}'. Expected one of Dasar, Madya, Mahir"
            ))),
        }
    }
}

/// One observation period (before or after certification).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    /// Daily harvested FFB weight in kg.
    pub tonnage_kg: f64,
    /// Trees harvested per day.
    pub trees: u32,
    pub loose_loss_pct: f64,
    pub unripe_pct: f64,
    pub rotten_pct: f64,
    pub long_stalk_pct: f64,
    pub days_worked: u32,
}

impl Measurements {
    /// Total FFB harvested over the period, in kg.
    pub fn production_kg(&self) -> f64 {
        self.tonnage_kg * f64::from(self.days_worked)
    }

    pub fn defect_rates(&self) -> [f64; 4] {
        [
            self.loose_loss_pct,
            self.unripe_pct,
            self.rotten_pct,
            self.long_stalk_pct,
        ]
    }

    /// True when any defect percentage lies outside [0, 100].
    pub fn has_out_of_range_defect(&self) -> bool {
        self.defect_rates()
            .iter()
            .any(|pct| !(0.0..=100.0).contains(pct))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compensation {
    /// Base wage per working day.
    pub base_wage: u32,
    /// Premium paid per harvested kg.
    pub premium_per_kg: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerRecord {
    pub worker_id: String,
    pub name: String,
    pub estate: String,
    pub certification_date: NaiveDate,
    pub certification_level: CertificationLevel,
    pub before: Measurements,
    pub after: Measurements,
    pub compensation: Compensation,
    pub years_of_service: u32,
    pub age: u32,
}

impl WorkerRecord {
    /// Check the row-level invariants that typing alone cannot express.
    ///
    /// Defect percentages may fall outside [0, 100] and are accepted.
    pub fn validate(&self) -> Result<(), MetricsError> {
        for (period, m) in [("before", &self.before), ("after", &self.after)] {
            if !m.tonnage_kg.is_finite() || m.tonnage_kg < 0.0 {
                return Err(MetricsError::Validation(format!(
                    "Worker {}: tonnage {period} must be a non-negative number, got {}",
                    self.worker_id, m.tonnage_kg
                )));
            }
            if !(1..=31).contains(&m.days_worked) {
                return Err(MetricsError::Validation(format!(
                    "Worker {}: days worked {period} must be within 1..=31, got {}",
                    self.worker_id, m.days_worked
                )));
            }
            if m.defect_rates().iter().any(|pct| !pct.is_finite()) {
                return Err(MetricsError::Validation(format!(
                    "Worker {}: defect percentages {period} must be finite",
                    self.worker_id
                )));
            }
        }
        Ok(())
    }
}

/// Bulk container for worker rows, preserving input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerTable {
    records: Vec<WorkerRecord>,
}

impl WorkerTable {
    pub fn new(records: Vec<WorkerRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[WorkerRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WorkerRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a WorkerTable {
    type Item = &'a WorkerRecord;
    type IntoIter = std::slice::Iter<'a, WorkerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<WorkerRecord> for WorkerTable {
    fn from_iter<I: IntoIterator<Item = WorkerRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A fully populated record used as a base by tests across the crate.
    pub(crate) fn sample_record(id: &str, estate: &str) -> WorkerRecord {
        WorkerRecord {
            worker_id: id.to_string(),
            name: format!("Pekerja {id}"),
            estate: estate.to_string(),
            certification_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            certification_level: CertificationLevel::Basic,
            before: Measurements {
                tonnage_kg: 1000.0,
                trees: 50,
                loose_loss_pct: 8.5,
                unripe_pct: 6.8,
                rotten_pct: 4.2,
                long_stalk_pct: 12.5,
                days_worked: 25,
            },
            after: Measurements {
                tonnage_kg: 1050.0,
                trees: 65,
                loose_loss_pct: 4.2,
                unripe_pct: 2.8,
                rotten_pct: 1.5,
                long_stalk_pct: 5.2,
                days_worked: 25,
            },
            compensation: Compensation {
                base_wage: 90000,
                premium_per_kg: 175,
            },
            years_of_service: 5,
            age: 30,
        }
    }

    #[test]
    fn parses_file_labels_and_english_names() {
        assert_eq!(
            "Madya".parse::<CertificationLevel>().unwrap(),
            CertificationLevel::Intermediate
        );
        assert_eq!(
            " advanced ".parse::<CertificationLevel>().unwrap(),
            CertificationLevel::Advanced
        );
        assert!("Expert".parse::<CertificationLevel>().is_err());
    }

    #[test]
    fn levels_are_ordered() {
        assert!(CertificationLevel::Basic < CertificationLevel::Intermediate);
        assert!(CertificationLevel::Intermediate < CertificationLevel::Advanced);
        assert_eq!(CertificationLevel::Advanced.to_string(), "Mahir");
    }

    #[test]
    fn production_multiplies_tonnage_by_days() {
        let record = sample_record("HRV0001", "X");
        assert_eq!(record.before.production_kg(), 25_000.0);
    }

    #[test]
    fn validate_rejects_days_outside_month() {
        let mut record = sample_record("HRV0001", "X");
        record.after.days_worked = 32;
        assert!(matches!(
            record.validate(),
            Err(MetricsError::Validation(_))
        ));
    }

    #[test]
    fn validate_accepts_zero_tonnage_and_out_of_range_defects() {
        let mut record = sample_record("HRV0001", "X");
        record.before.tonnage_kg = 0.0;
        record.before.long_stalk_pct = 140.0;
        assert!(record.validate().is_ok());
        assert!(record.before.has_out_of_range_defect());
    }
}
