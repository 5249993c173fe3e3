//! The audit transform: change-log rows in, trail / meta / quarantine out.
//!
//! Each row runs tokenize -> validate -> condense -> (diff, extract). The
//! batch is a fold over rows into a [`BatchOutput`]; partial outputs can be
//! merged, so the same fold serves a single file or many.

pub mod combine;
pub mod dates;
pub mod processing;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::{AuditError, Result};
use crate::observability::metrics::{self, MetricName};
use crate::parser::{tokenize, FieldEntry, LabelSet};
use crate::types::{MetaRecord, RawChangeRecord, TrailEntry};
use processing::{
    condense, validate_pair, FieldLayout, MergeGroup, MetaExtractor, QuarantineRecord,
    TrailDiffEngine,
};

/// Which per-row stage failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Trail,
    Meta,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Trail => "trail",
            Stage::Meta => "meta",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A well-formed row whose trail or meta stage errored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub order_num: String,
    pub stage: Stage,
    pub error: String,
}

/// What one row contributed to the batch
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Transformed {
        trail: Vec<TrailEntry>,
        meta: MetaRecord,
    },
    /// At least one stage failed; whatever the other stage produced is kept
    Partial {
        trail: Vec<TrailEntry>,
        meta: Option<MetaRecord>,
        failures: Vec<RowFailure>,
    },
    Quarantined(QuarantineRecord),
}

/// Row accounting. `total == processed + quarantined + failed` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub processed: usize,
    pub quarantined: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.total == self.processed + self.quarantined + self.failed
    }

    fn merge(&mut self, other: BatchReport) {
        self.total += other.total;
        self.processed += other.processed;
        self.quarantined += other.quarantined;
        self.failed += other.failed;
    }
}

/// Accumulated result of transforming a batch of rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutput {
    pub trail: Vec<TrailEntry>,
    pub meta: Vec<MetaRecord>,
    pub quarantine: Vec<QuarantineRecord>,
    pub failures: Vec<RowFailure>,
    pub report: BatchReport,
}

impl BatchOutput {
    /// Fold one row's outcome in
    pub fn absorb(mut self, outcome: RowOutcome) -> Self {
        self.report.total += 1;
        match outcome {
            RowOutcome::Transformed { trail, meta } => {
                self.report.processed += 1;
                self.trail.extend(trail);
                self.meta.push(meta);
            }
            RowOutcome::Partial {
                trail,
                meta,
                failures,
            } => {
                self.report.failed += 1;
                self.trail.extend(trail);
                self.drop_superseded_meta(&failures);
                self.meta.extend(meta);
                self.failures.extend(failures);
            }
            RowOutcome::Quarantined(record) => {
                self.report.quarantined += 1;
                self.quarantine.push(record);
            }
        }
        self
    }

    /// Append another partial output after this one
    pub fn merge(mut self, other: BatchOutput) -> Self {
        self.trail.extend(other.trail);
        self.drop_superseded_meta(&other.failures);
        self.meta.extend(other.meta);
        self.quarantine.extend(other.quarantine);
        self.failures.extend(other.failures);
        self.report.merge(other.report);
        self
    }

    /// An order whose latest row failed meta extraction gets no snapshot,
    /// rather than an older one
    fn drop_superseded_meta(&mut self, failures: &[RowFailure]) {
        for failure in failures.iter().filter(|f| f.stage == Stage::Meta) {
            self.meta
                .retain(|record| record.order_num.trim() != failure.order_num);
        }
    }

    /// Keep the last meta snapshot per order, sorted by order number
    pub fn finish(mut self) -> Self {
        let latest: BTreeMap<String, MetaRecord> = self
            .meta
            .drain(..)
            .map(|record| (record.order_num.clone(), record))
            .collect();
        self.meta = latest.into_values().collect();
        self
    }
}

/// The per-schema transform, built once from configuration
#[derive(Debug, Clone)]
pub struct AuditTransform {
    labels: LabelSet,
    expected_width: usize,
    order_number_field: String,
    merge_groups: Vec<MergeGroup>,
    layout: FieldLayout,
    trail: TrailDiffEngine,
    meta: MetaExtractor,
}

impl AuditTransform {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let layout = config.layout();
        Ok(Self {
            labels: config.label_set(),
            expected_width: config.expected_width(),
            order_number_field: config.trail.order_number_field.clone(),
            merge_groups: config.schema.merge_groups.clone(),
            meta: MetaExtractor::new(layout.clone(), config.meta.clone(), config.hubs.clone()),
            trail: TrailDiffEngine::from_config(&config.trail),
            layout,
        })
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    /// Transform one change-log row
    pub fn process_record(&self, record: &RawChangeRecord) -> RowOutcome {
        let old_fields = tokenize(&record.raw_old, &self.labels);
        let new_fields = tokenize(&record.raw_new, &self.labels);
        let order_num = self.order_number(&old_fields, &new_fields);

        if let Err(reason) = validate_pair(&old_fields, &new_fields, self.expected_width) {
            warn!(order_num = %order_num, %reason, "Quarantining change record");
            metrics::transform::row_quarantined();
            return RowOutcome::Quarantined(QuarantineRecord {
                order_num,
                record: record.clone(),
                old_fields,
                new_fields,
                reason,
            });
        }

        let old = self.condensed(&old_fields);
        let new = self.condensed(&new_fields);

        let trail = self
            .layout
            .check(&old)
            .and_then(|_| self.layout.check(&new))
            .and_then(|_| self.trail.diff(&order_num, &record.timestamp, &old, &new));
        let meta = self.layout.check(&new).and_then(|_| self.meta.extract(&new));

        match (trail, meta) {
            (Ok(trail), Ok(meta)) => {
                metrics::transform::row_processed();
                metrics::transform::trail_entries(trail.len());
                metrics::transform::meta_record();
                RowOutcome::Transformed { trail, meta }
            }
            (trail, meta) => {
                let mut failures = Vec::new();
                let trail = match trail {
                    Ok(entries) => {
                        metrics::transform::trail_entries(entries.len());
                        entries
                    }
                    Err(e) => {
                        failures.push(self.failure(&order_num, Stage::Trail, e));
                        Vec::new()
                    }
                };
                let meta = match meta {
                    Ok(record) => {
                        metrics::transform::meta_record();
                        Some(record)
                    }
                    Err(e) => {
                        failures.push(self.failure(&order_num, Stage::Meta, e));
                        None
                    }
                };
                RowOutcome::Partial {
                    trail,
                    meta,
                    failures,
                }
            }
        }
    }

    /// Transform a batch of rows
    #[instrument(skip_all)]
    pub fn run<'a, I>(&self, records: I) -> BatchOutput
    where
        I: IntoIterator<Item = &'a RawChangeRecord>,
    {
        let _timer = metrics::time_operation(MetricName::TransformDuration);
        let output = records
            .into_iter()
            .map(|record| self.process_record(record))
            .fold(BatchOutput::default(), BatchOutput::absorb)
            .finish();

        info!(
            total = output.report.total,
            processed = output.report.processed,
            quarantined = output.report.quarantined,
            failed = output.report.failed,
            trail_entries = output.trail.len(),
            meta_records = output.meta.len(),
            "Batch transformed"
        );
        output
    }

    /// `ORDER_NUMBER` from the new list, else the old list, else empty
    fn order_number(&self, old_fields: &[String], new_fields: &[String]) -> String {
        let find = |fields: &[String]| {
            fields
                .iter()
                .map(|f| FieldEntry::parse(f))
                .find(|entry| entry.label == self.order_number_field)
                .map(|entry| entry.value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        find(new_fields)
            .or_else(|| find(old_fields))
            .unwrap_or_default()
    }

    fn condensed(&self, fields: &[String]) -> Vec<FieldEntry> {
        let entries = fields.iter().map(|f| FieldEntry::parse(f)).collect();
        condense(entries, &self.merge_groups)
    }

    fn failure(&self, order_num: &str, stage: Stage, error: AuditError) -> RowFailure {
        warn!(order_num, %stage, %error, "Row stage failed; skipping");
        metrics::transform::row_failed(stage.as_str());
        RowFailure {
            order_num: order_num.to_string(),
            stage,
            error: error.to_string(),
        }
    }
}
