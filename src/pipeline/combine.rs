//! Concatenates per-export trail and meta tables into the full tables.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::constants::{FULL_META_CSV, FULL_META_PARQUET, FULL_TRAIL_CSV, FULL_TRAIL_PARQUET};
use crate::error::{AuditError, Result};
use crate::infra::csv_io::{read_meta, read_trail, write_meta, write_trail};
use crate::infra::parquet_out::write_string_table;
use crate::observability::metrics::{self, MetricName};
use crate::pipeline::dates::{to_timed, to_untimed};
use crate::types::{MetaRecord, TrailEntry};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CombineReport {
    pub trail_rows: usize,
    pub meta_rows: usize,
    pub duplicates_dropped: usize,
    pub date_errors: usize,
}

/// Reformat trail dates to `YYYY-MM-DD 14:00:00`, then stable-sort by date.
/// Returns the number of dates left unchanged because they did not parse.
pub fn combine_trails(entries: &mut [TrailEntry]) -> usize {
    let mut errors = 0;
    for entry in entries.iter_mut() {
        match to_timed(&entry.date) {
            Ok(date) => entry.date = date,
            Err(e) => {
                errors += 1;
                note_bad_date("Date", &entry.order_num, &e);
            }
        }
    }
    entries.sort_by(|a, b| a.date.cmp(&b.date));
    errors
}

/// Keep the last snapshot per order (by input order), sorted by order number,
/// with the four date columns reformatted to `YYYY-MM-DD`.
pub fn combine_meta(records: Vec<MetaRecord>, report: &mut CombineReport) -> Vec<MetaRecord> {
    let before = records.len();
    let mut records = records;
    records.sort_by(|a, b| a.order_num.cmp(&b.order_num));

    let mut latest: Vec<MetaRecord> = Vec::with_capacity(records.len());
    for record in records {
        match latest.last_mut() {
            Some(last) if last.order_num == record.order_num => *last = record,
            _ => latest.push(record),
        }
    }
    report.duplicates_dropped += before - latest.len();

    for record in latest.iter_mut() {
        let order_num = record.order_num.clone();
        for (column, value) in [
            ("Delivery_Date", &mut record.delivery_date),
            ("Order_Date", &mut record.order_date),
            ("Ship_Date", &mut record.ship_date),
            ("Requested_Delivery_Date", &mut record.requested_delivery_date),
        ] {
            match to_untimed(value.as_str()) {
                Ok(date) => *value = date,
                Err(e) => {
                    report.date_errors += 1;
                    note_bad_date(column, &order_num, &e);
                }
            }
        }
    }
    latest
}

fn note_bad_date(column: &str, order_num: &str, error: &AuditError) {
    warn!(column, order_num, %error, "Leaving unparseable date unchanged");
    metrics::combine::date_reformat_error(column);
}

/// Paths written by [`run_combine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedFiles {
    pub trail: PathBuf,
    pub meta: PathBuf,
    pub csv: Option<(PathBuf, PathBuf)>,
}

/// Read every trail and meta CSV, combine them and write the full tables
#[instrument(skip_all, fields(out_dir = %out_dir.display()))]
pub fn run_combine(
    trail_inputs: &[PathBuf],
    meta_inputs: &[PathBuf],
    out_dir: &Path,
    write_csv: bool,
) -> Result<(CombinedFiles, CombineReport)> {
    let _timer = metrics::time_operation(MetricName::CombineDuration);
    fs::create_dir_all(out_dir)?;
    let mut report = CombineReport::default();

    let mut trail = Vec::new();
    for path in trail_inputs {
        metrics::combine::input_file("trail");
        trail.extend(read_trail(path)?);
    }
    report.date_errors += combine_trails(&mut trail);
    report.trail_rows = trail.len();

    let mut meta = Vec::new();
    for path in meta_inputs {
        metrics::combine::input_file("meta");
        meta.extend(read_meta(path)?);
    }
    let meta = combine_meta(meta, &mut report);
    report.meta_rows = meta.len();

    let trail_path = out_dir.join(FULL_TRAIL_PARQUET);
    let trail_rows: Vec<[&str; 3]> = trail.iter().map(TrailEntry::values).collect();
    write_string_table(&trail_path, &TrailEntry::COLUMNS, &trail_rows)?;

    let meta_path = out_dir.join(FULL_META_PARQUET);
    let meta_rows: Vec<[&str; 15]> = meta.iter().map(MetaRecord::values).collect();
    write_string_table(&meta_path, &MetaRecord::COLUMNS, &meta_rows)?;

    let csv = if write_csv {
        let trail_csv = out_dir.join(FULL_TRAIL_CSV);
        let meta_csv = out_dir.join(FULL_META_CSV);
        write_trail(&trail_csv, &trail)?;
        write_meta(&meta_csv, &meta)?;
        Some((trail_csv, meta_csv))
    } else {
        None
    };

    metrics::combine::trail_rows(report.trail_rows);
    metrics::combine::meta_rows(report.meta_rows);
    metrics::combine::meta_duplicates_dropped(report.duplicates_dropped);
    info!(
        trail_rows = report.trail_rows,
        meta_rows = report.meta_rows,
        duplicates_dropped = report.duplicates_dropped,
        date_errors = report.date_errors,
        "Combined {} trail and {} meta files into {}",
        trail_inputs.len(),
        meta_inputs.len(),
        out_dir.display()
    );

    Ok((
        CombinedFiles {
            trail: trail_path,
            meta: meta_path,
            csv,
        },
        report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(order: &str, priority: &str, order_date: &str) -> MetaRecord {
        MetaRecord {
            order_num: order.to_string(),
            priority: priority.to_string(),
            order_date: order_date.to_string(),
            ..MetaRecord::default()
        }
    }

    #[test]
    fn trail_dates_are_reformatted_then_sorted_stably() {
        let mut entries = vec![
            TrailEntry::new("2", "17-MAY-23", "Order Created"),
            TrailEntry::new("1", "16-MAY-23", "Order Created"),
            TrailEntry::new("1", "16-MAY-23", "Carrier added to order"),
        ];
        assert_eq!(combine_trails(&mut entries), 0);
        assert_eq!(entries[0].date, "2023-05-16 14:00:00");
        assert_eq!(entries[0].activity, "Order Created");
        assert_eq!(entries[1].activity, "Carrier added to order");
        assert_eq!(entries[2].order_num, "2");
    }

    #[test]
    fn bad_trail_date_is_kept_and_counted() {
        let mut entries = vec![TrailEntry::new("1", "soon", "Order Created")];
        assert_eq!(combine_trails(&mut entries), 1);
        assert_eq!(entries[0].date, "soon");
    }

    #[test]
    fn meta_keeps_last_snapshot_per_order() {
        let mut report = CombineReport::default();
        let combined = combine_meta(
            vec![
                meta("20", "1", "01-JAN-23"),
                meta("10", "1", ""),
                meta("20", "3", "02-JAN-23"),
            ],
            &mut report,
        );

        assert_eq!(combined.len(), 2);
        assert_eq!(combined[0].order_num, "10");
        assert_eq!(combined[0].order_date, "");
        assert_eq!(combined[1].priority, "3");
        assert_eq!(combined[1].order_date, "2023-01-02");
        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(report.date_errors, 0);
    }
}
