use csv::{ReaderBuilder, StringRecord, Writer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::config::{ColumnConfig, Config};
use crate::constants::{DROPPED_FILE_SUFFIX, META_FILE_SUFFIX, TRAIL_FILE_SUFFIX};
use crate::error::{AuditError, Result};
use crate::observability::metrics;
use crate::pipeline::processing::QuarantineRecord;
use crate::pipeline::BatchOutput;
use crate::types::{MetaRecord, RawChangeRecord, TrailEntry};

// Header-less fallbacks for the leading export columns
const TIMESTAMP_POSITION: usize = 0;
const USER_POSITION: usize = 1;
const ACTION_POSITION: usize = 3;

/// The order-table rows of one export file
#[derive(Debug, Clone, Default)]
pub struct ExportBatch {
    pub records: Vec<RawChangeRecord>,
    /// Rows belonging to other tables
    pub filtered: usize,
}

#[derive(Debug)]
struct ColumnIndex {
    timestamp: Option<usize>,
    user: Option<usize>,
    table: usize,
    action: Option<usize>,
    old_values: usize,
    new_values: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, columns: &ColumnConfig) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).ok_or_else(|| AuditError::MissingColumn(name.to_string()));
        let fallback = |name: &str, position: usize| {
            find(name).or_else(|| (position < headers.len()).then_some(position))
        };

        Ok(Self {
            timestamp: fallback(&columns.timestamp, TIMESTAMP_POSITION),
            user: fallback(&columns.user, USER_POSITION),
            table: require(&columns.table)?,
            action: fallback(&columns.action, ACTION_POSITION),
            old_values: require(&columns.old_values)?,
            new_values: require(&columns.new_values)?,
        })
    }
}

fn cell(row: &StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|i| row.get(i))
        .unwrap_or_default()
        .to_string()
}

/// Read an audit export, keeping only rows of the configured table
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_export(path: &Path, config: &Config) -> Result<ExportBatch> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let index = ColumnIndex::resolve(&headers, &config.columns)?;
    debug!(?index, "Resolved export columns");

    let mut batch = ExportBatch::default();
    let mut rows_read = 0;
    for row in reader.records() {
        let row = row?;
        rows_read += 1;

        let table_name = cell(&row, Some(index.table));
        if table_name.trim() != config.schema.table_name {
            batch.filtered += 1;
            continue;
        }

        batch.records.push(RawChangeRecord {
            timestamp: cell(&row, index.timestamp),
            user: cell(&row, index.user),
            table_name,
            action: cell(&row, index.action),
            raw_old: cell(&row, Some(index.old_values)),
            raw_new: cell(&row, Some(index.new_values)),
        });
    }

    metrics::transform::rows_read(rows_read);
    metrics::transform::rows_filtered(batch.filtered);
    info!(
        "Read {} rows from {} ({} for {}, {} filtered)",
        rows_read,
        path.display(),
        batch.records.len(),
        config.schema.table_name,
        batch.filtered
    );
    Ok(batch)
}

pub fn write_trail(path: &Path, entries: &[TrailEntry]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(TrailEntry::COLUMNS)?;
    for entry in entries {
        writer.write_record(entry.values())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_meta(path: &Path, records: &[MetaRecord]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(MetaRecord::COLUMNS)?;
    for record in records {
        writer.write_record(record.values())?;
    }
    writer.flush()?;
    Ok(())
}

/// Write quarantined rows with their original columns plus diagnostics
pub fn write_quarantine(
    path: &Path,
    records: &[QuarantineRecord],
    columns: &ColumnConfig,
) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        columns.timestamp.as_str(),
        columns.user.as_str(),
        columns.table.as_str(),
        columns.action.as_str(),
        columns.old_values.as_str(),
        columns.new_values.as_str(),
        "LIST_OLD",
        "LIST_NEW",
        "ORDER_NUMBER",
        "LIST_LENGTH_OLD",
        "LIST_LENGTH_NEW",
        "REASON",
    ])?;

    for q in records {
        let list_old = serde_json::to_string(&q.old_fields)?;
        let list_new = serde_json::to_string(&q.new_fields)?;
        let old_len = q.old_fields.len().to_string();
        let new_len = q.new_fields.len().to_string();
        let reason = q.reason.to_string();
        writer.write_record([
            q.record.timestamp.as_str(),
            q.record.user.as_str(),
            q.record.table_name.as_str(),
            q.record.action.as_str(),
            q.record.raw_old.as_str(),
            q.record.raw_new.as_str(),
            list_old.as_str(),
            list_new.as_str(),
            q.order_num.as_str(),
            old_len.as_str(),
            new_len.as_str(),
            reason.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Paths written for one transformed export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub trail: PathBuf,
    pub meta: PathBuf,
    /// Only present when at least one row was quarantined
    pub dropped: Option<PathBuf>,
}

/// Write `<base>_TRAIL.csv`, `<base>_META.csv` and, if needed, `<base>_DROPPED.csv`
pub fn write_batch_outputs(
    out_dir: &Path,
    base: &str,
    output: &BatchOutput,
    columns: &ColumnConfig,
) -> Result<WrittenFiles> {
    fs::create_dir_all(out_dir)?;

    let trail = out_dir.join(format!("{}{}", base, TRAIL_FILE_SUFFIX));
    write_trail(&trail, &output.trail)?;

    let meta = out_dir.join(format!("{}{}", base, META_FILE_SUFFIX));
    write_meta(&meta, &output.meta)?;

    let dropped = if output.quarantine.is_empty() {
        None
    } else {
        let path = out_dir.join(format!("{}{}", base, DROPPED_FILE_SUFFIX));
        write_quarantine(&path, &output.quarantine, columns)?;
        Some(path)
    };

    info!(
        trail = %trail.display(),
        meta = %meta.display(),
        dropped = ?dropped,
        "Wrote batch outputs"
    );
    Ok(WrittenFiles {
        trail,
        meta,
        dropped,
    })
}

pub fn read_trail(path: &Path) -> Result<Vec<TrailEntry>> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let entries = reader
        .deserialize()
        .collect::<std::result::Result<Vec<TrailEntry>, _>>()?;
    Ok(entries)
}

pub fn read_meta(path: &Path) -> Result<Vec<MetaRecord>> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<MetaRecord>, _>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn export(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_only_order_rows() {
        let file = export(
            "TIMESTAMP,USERNAME,TABLENAME,ACTION,OLD_VALUES,NEW_VALUES\n\
             16-MAY-23,ETL,T_ORDER,UPDATE,\"ORDER_NUMBER: 1, STATUS: Open\",\"ORDER_NUMBER: 1, STATUS: Closed\"\n\
             16-MAY-23,ETL,T_SHIPMENT,UPDATE,a,b\n",
        );
        let batch = read_export(file.path(), &Config::default()).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.filtered, 1);
        assert_eq!(batch.records[0].raw_new, "ORDER_NUMBER: 1, STATUS: Closed");
        assert_eq!(batch.records[0].user, "ETL");
    }

    #[test]
    fn unnamed_leading_columns_fall_back_to_position() {
        let file = export(
            "WHEN,WHO,TABLENAME,WHAT,OLD_VALUES,NEW_VALUES\n\
             17-MAY-23,jdoe,T_ORDER,INSERT,,ORDER_NUMBER: 2\n",
        );
        let batch = read_export(file.path(), &Config::default()).unwrap();
        let record = &batch.records[0];
        assert_eq!(record.timestamp, "17-MAY-23");
        assert_eq!(record.user, "jdoe");
        assert_eq!(record.action, "INSERT");
        assert_eq!(record.raw_old, "");
    }

    #[test]
    fn missing_value_column_is_an_error() {
        let file = export("TIMESTAMP,TABLENAME,OLD_VALUES\n");
        let err = read_export(file.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, AuditError::MissingColumn(ref c) if c == "NEW_VALUES"));
    }

    #[test]
    fn empty_trail_still_has_a_header_and_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x_TRAIL.csv");
        write_trail(&path, &[]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap().trim(),
            "Order_num,Date,Activity"
        );
        assert!(read_trail(&path).unwrap().is_empty());

        let entries = vec![TrailEntry::new("1", "16-MAY-23", "Carrier added to order")];
        write_trail(&path, &entries).unwrap();
        assert_eq!(read_trail(&path).unwrap(), entries);
    }
}
