//! CSV exports offered by the dashboard: the synthetic template and the
//! currently filtered worker table.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::error::Result;
use crate::frame::{enriched_to_frame, write_csv};
use crate::metrics::EnrichedWorker;

pub const TEMPLATE_FILE_NAME: &str = "template_data_pemanen.csv";
const FILTERED_FILE_PREFIX: &str = "data_pemanen_tersertifikasi_";

/// `data_pemanen_tersertifikasi_<YYYYMMDD>.csv`
pub fn filtered_file_name(date: NaiveDate) -> String {
    format!("{FILTERED_FILE_PREFIX}{}.csv", date.format("%Y%m%d"))
}

/// Current local calendar date, used to stamp filtered exports.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Write the template file (raw plus derived columns) into `dir`.
pub fn export_template(workers: &[EnrichedWorker], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(TEMPLATE_FILE_NAME);
    write_csv(&mut enriched_to_frame(workers)?, &path)?;
    Ok(path)
}

/// Write the filtered enriched table into `dir`, named after `date`.
pub fn export_filtered(workers: &[EnrichedWorker], dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let path = dir.join(filtered_file_name(date));
    write_csv(&mut enriched_to_frame(workers)?, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filtered_name_embeds_compact_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            filtered_file_name(date),
            "data_pemanen_tersertifikasi_20260307.csv"
        );
    }
}
