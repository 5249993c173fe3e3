use std::collections::HashSet;
use tracing::trace;

use crate::config::TrailConfig;
use crate::constants::{
    ADDED_SUFFIX, ORDER_CREATED_ACTIVITY, STATUS_ACTIVITY_PREFIX, UPDATED_SUFFIX,
};
use crate::error::{AuditError, Result};
use crate::parser::FieldEntry;
use crate::types::TrailEntry;

/// Compares the condensed before/after field lists of one change record and
/// narrates each changed field as a trail entry.
#[derive(Debug, Clone)]
pub struct TrailDiffEngine {
    order_number_field: String,
    status_field: String,
    skip_fields: HashSet<String>,
}

impl TrailDiffEngine {
    pub fn new(
        order_number_field: impl Into<String>,
        status_field: impl Into<String>,
        skip_fields: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            order_number_field: order_number_field.into(),
            status_field: status_field.into(),
            skip_fields: skip_fields.into_iter().collect(),
        }
    }

    pub fn from_config(config: &TrailConfig) -> Self {
        Self::new(
            config.order_number_field.clone(),
            config.status_field.clone(),
            config.skip_fields.iter().cloned(),
        )
    }

    /// Diff two aligned field lists.
    ///
    /// A changed order number means the order was just created: a single
    /// `Order Created` entry is returned and nothing else in the row is
    /// narrated. Otherwise every changed, non-skipped field yields one entry.
    /// Any error discards the whole row; no partial entries are returned.
    pub fn diff(
        &self,
        order_num: &str,
        timestamp: &str,
        old: &[FieldEntry],
        new: &[FieldEntry],
    ) -> Result<Vec<TrailEntry>> {
        if old.len() != new.len() {
            return Err(AuditError::WidthMismatch {
                old: old.len(),
                new: new.len(),
            });
        }

        let order_number_changed = old
            .iter()
            .zip(new)
            .find(|(_, after)| after.label == self.order_number_field)
            .is_some_and(|(before, after)| changed(before, after));
        if order_number_changed {
            return Ok(vec![TrailEntry::new(order_num, timestamp, ORDER_CREATED_ACTIVITY)]);
        }

        let mut entries = Vec::new();
        for (position, (before, after)) in old.iter().zip(new).enumerate() {
            if before.label != after.label {
                return Err(AuditError::Misaligned {
                    position,
                    expected: before.label.clone(),
                    found: after.label.clone(),
                });
            }
            if self.skip_fields.contains(&after.label) || !changed(before, after) {
                continue;
            }

            let activity = if after.label == self.status_field {
                format!("{}{}", STATUS_ACTIVITY_PREFIX, after.value.trim())
            } else {
                let suffix = if before.is_empty() {
                    ADDED_SUFFIX
                } else {
                    UPDATED_SUFFIX
                };
                format!("{}{}", activity_label(&after.label, position)?, suffix)
            };
            trace!(order_num, field = %after.label, %activity, "field changed");
            entries.push(TrailEntry::new(order_num, timestamp, activity));
        }

        Ok(entries)
    }
}

fn changed(before: &FieldEntry, after: &FieldEntry) -> bool {
    before.value.trim() != after.value.trim()
}

/// `DELIVERY_LOCATION_INFO` -> `Delivery_location_info`
fn activity_label(label: &str, position: usize) -> Result<String> {
    let mut chars = label.chars();
    let first = chars.next().ok_or(AuditError::EmptyLabel { position })?;
    Ok(first.to_string() + &chars.as_str().to_lowercase())
}
