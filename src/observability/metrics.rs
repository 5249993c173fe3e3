//! Metrics for the audit transform and combine phases
//!
//! Recording goes through the `metrics` facade. No exporter is installed by
//! this crate; without a recorder every call is a no-op, so the helpers are
//! safe to call from tests and library users alike.

use std::fmt;
use std::time::Instant;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Transform metrics
    TransformRowsRead,
    TransformRowsFiltered,
    TransformRowsProcessed,
    TransformRowsQuarantined,
    TransformRowFailures,
    TransformTrailEntries,
    TransformMetaRecords,
    TransformDuration,

    // Combine metrics
    CombineInputFiles,
    CombineTrailRows,
    CombineMetaRows,
    CombineMetaDuplicatesDropped,
    CombineDateReformatErrors,
    CombineDuration,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::TransformRowsRead => "order_audit_transform_rows_read_total",
            MetricName::TransformRowsFiltered => "order_audit_transform_rows_filtered_total",
            MetricName::TransformRowsProcessed => "order_audit_transform_rows_processed_total",
            MetricName::TransformRowsQuarantined => "order_audit_transform_rows_quarantined_total",
            MetricName::TransformRowFailures => "order_audit_transform_row_failures_total",
            MetricName::TransformTrailEntries => "order_audit_transform_trail_entries_total",
            MetricName::TransformMetaRecords => "order_audit_transform_meta_records_total",
            MetricName::TransformDuration => "order_audit_transform_duration_seconds",

            MetricName::CombineInputFiles => "order_audit_combine_input_files_total",
            MetricName::CombineTrailRows => "order_audit_combine_trail_rows_total",
            MetricName::CombineMetaRows => "order_audit_combine_meta_rows_total",
            MetricName::CombineMetaDuplicatesDropped => "order_audit_combine_meta_duplicates_dropped_total",
            MetricName::CombineDateReformatErrors => "order_audit_combine_date_reformat_errors_total",
            MetricName::CombineDuration => "order_audit_combine_duration_seconds",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            TransformRowsRead,
            TransformRowsFiltered,
            TransformRowsProcessed,
            TransformRowsQuarantined,
            TransformRowFailures,
            TransformTrailEntries,
            TransformMetaRecords,
            TransformDuration,
            CombineInputFiles,
            CombineTrailRows,
            CombineMetaRows,
            CombineMetaDuplicatesDropped,
            CombineDateReformatErrors,
            CombineDuration,
        ]
        .into_iter()
    }
}

/// A timing guard that records elapsed seconds to a histogram when dropped
pub struct TimingGuard {
    start: Instant,
    histogram_name: &'static str,
}

impl TimingGuard {
    pub fn new(histogram_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            histogram_name,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        ::metrics::histogram!(self.histogram_name).record(self.elapsed_secs());
    }
}

pub fn time_operation(metric: MetricName) -> TimingGuard {
    TimingGuard::new(metric.as_str())
}

// ============================================================================
// Transform Metrics
// ============================================================================

pub mod transform {
    use super::MetricName;

    pub fn rows_read(count: usize) {
        ::metrics::counter!(MetricName::TransformRowsRead.as_str()).increment(count as u64);
    }

    pub fn rows_filtered(count: usize) {
        ::metrics::counter!(MetricName::TransformRowsFiltered.as_str()).increment(count as u64);
    }

    pub fn row_processed() {
        ::metrics::counter!(MetricName::TransformRowsProcessed.as_str()).increment(1);
    }

    pub fn row_quarantined() {
        ::metrics::counter!(MetricName::TransformRowsQuarantined.as_str()).increment(1);
    }

    pub fn row_failed(stage: &str) {
        ::metrics::counter!(MetricName::TransformRowFailures.as_str(), "stage" => stage.to_string())
            .increment(1);
    }

    pub fn trail_entries(count: usize) {
        ::metrics::counter!(MetricName::TransformTrailEntries.as_str()).increment(count as u64);
    }

    pub fn meta_record() {
        ::metrics::counter!(MetricName::TransformMetaRecords.as_str()).increment(1);
    }
}

// ============================================================================
// Combine Metrics
// ============================================================================

pub mod combine {
    use super::MetricName;

    pub fn input_file(kind: &str) {
        ::metrics::counter!(MetricName::CombineInputFiles.as_str(), "kind" => kind.to_string())
            .increment(1);
    }

    pub fn trail_rows(count: usize) {
        ::metrics::counter!(MetricName::CombineTrailRows.as_str()).increment(count as u64);
    }

    pub fn meta_rows(count: usize) {
        ::metrics::counter!(MetricName::CombineMetaRows.as_str()).increment(count as u64);
    }

    pub fn meta_duplicates_dropped(count: usize) {
        ::metrics::counter!(MetricName::CombineMetaDuplicatesDropped.as_str())
            .increment(count as u64);
    }

    pub fn date_reformat_error(column: &str) {
        ::metrics::counter!(MetricName::CombineDateReformatErrors.as_str(), "column" => column.to_string())
            .increment(1);
    }
}
