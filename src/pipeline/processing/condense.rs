use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AuditError, Result};
use crate::parser::FieldEntry;

/// A set of fields folded into one composite field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeGroup {
    /// Label of the composite field
    pub label: String,
    /// Source field labels, in concatenation order
    pub sources: Vec<String>,
}

impl MergeGroup {
    pub fn new(label: &str, sources: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Positions of this group's sources in `fields`, in source order.
    /// `None` when any source is absent.
    pub fn source_positions(&self, fields: &[FieldEntry]) -> Option<Vec<usize>> {
        self.sources
            .iter()
            .map(|source| fields.iter().position(|f| &f.label == source))
            .collect()
    }
}

/// Fold each merge group's sources into a composite appended at the end of
/// the list. Composites are appended in group order. A group whose sources
/// are not all present is left alone, so condensing twice is a no-op.
///
/// Old and new lists must be condensed independently with the same groups to
/// stay aligned.
pub fn condense(mut fields: Vec<FieldEntry>, merge_groups: &[MergeGroup]) -> Vec<FieldEntry> {
    for group in merge_groups {
        let Some(positions) = group.source_positions(&fields) else {
            continue;
        };

        let value = positions
            .iter()
            .map(|&p| fields[p].value.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut removal = positions;
        removal.sort_unstable();
        removal.dedup();
        for position in removal.into_iter().rev() {
            fields.remove(position);
        }

        fields.push(FieldEntry::new(group.label.clone(), value));
    }
    fields
}

/// The named layout of a condensed field list. Built once per schema; lets the
/// trail and metadata stages address fields by label instead of by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    labels: Vec<String>,
    positions: HashMap<String, usize>,
}

impl FieldLayout {
    pub fn new(raw_labels: &[String], merge_groups: &[MergeGroup]) -> Self {
        let skeleton = raw_labels
            .iter()
            .map(|label| FieldEntry::new(label.clone(), String::new()))
            .collect();
        let labels: Vec<String> = condense(skeleton, merge_groups)
            .into_iter()
            .map(|entry| entry.label)
            .collect();
        let positions = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        Self { labels, positions }
    }

    pub fn width(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// Confirm that `fields` carries exactly this layout's labels, in order
    pub fn check(&self, fields: &[FieldEntry]) -> Result<()> {
        if fields.len() != self.width() {
            return Err(AuditError::LayoutWidth {
                expected: self.width(),
                found: fields.len(),
            });
        }
        for (position, (expected, entry)) in self.labels.iter().zip(fields).enumerate() {
            if *expected != entry.label {
                return Err(AuditError::Misaligned {
                    position,
                    expected: expected.clone(),
                    found: entry.label.clone(),
                });
            }
        }
        Ok(())
    }

    /// The entry for `label` in a list that follows this layout
    pub fn entry<'a>(&self, fields: &'a [FieldEntry], label: &str) -> Result<&'a FieldEntry> {
        let position = self.position(label).ok_or_else(|| AuditError::MissingField {
            label: label.to_string(),
        })?;
        let entry = fields.get(position).ok_or_else(|| AuditError::MissingField {
            label: label.to_string(),
        })?;
        if entry.label != label {
            return Err(AuditError::Misaligned {
                position,
                expected: label.to_string(),
                found: entry.label.clone(),
            });
        }
        Ok(entry)
    }

    pub fn value<'a>(&self, fields: &'a [FieldEntry], label: &str) -> Result<&'a str> {
        self.entry(fields, label).map(|entry| entry.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::constants;

    fn entries(pairs: &[(&str, &str)]) -> Vec<FieldEntry> {
        pairs.iter().map(|(l, v)| FieldEntry::new(*l, *v)).collect()
    }

    fn groups() -> Vec<MergeGroup> {
        vec![
            MergeGroup::new("LOCATION", &["ADDR", "CITY"]),
            MergeGroup::new("CONTACT", &["NAME", "PHONE"]),
        ]
    }

    #[test]
    fn composites_are_appended_in_group_order() {
        let fields = entries(&[
            ("ORDER_NUMBER", "7"),
            ("ADDR", "1 Main St"),
            ("NAME", "Pat"),
            ("CITY", "Leeds"),
            ("PHONE", "555"),
            ("STATUS", "Open"),
        ]);

        let condensed = condense(fields, &groups());
        assert_eq!(
            condensed,
            entries(&[
                ("ORDER_NUMBER", "7"),
                ("STATUS", "Open"),
                ("LOCATION", "1 Main St, Leeds"),
                ("CONTACT", "Pat, 555"),
            ])
        );
    }

    #[test]
    fn condensing_twice_is_a_no_op() {
        let fields = entries(&[
            ("ADDR", "a"),
            ("CITY", "b"),
            ("NAME", "c"),
            ("PHONE", "d"),
        ]);
        let once = condense(fields, &groups());
        let twice = condense(once.clone(), &groups());
        assert_eq!(once, twice);
    }

    #[test]
    fn group_with_missing_source_is_skipped() {
        let fields = entries(&[("ADDR", "a"), ("NAME", "c"), ("PHONE", "d")]);
        let condensed = condense(fields, &groups());
        assert_eq!(
            condensed,
            entries(&[("ADDR", "a"), ("CONTACT", "c, d")])
        );
    }

    #[test]
    fn empty_sources_still_join_with_separators() {
        let fields = entries(&[("ADDR", ""), ("CITY", "")]);
        let condensed = condense(fields, &groups()[..1]);
        assert_eq!(condensed[0].value, ", ");
    }

    #[test]
    fn reference_layout_positions() {
        let layout = Config::default().layout();
        assert_eq!(layout.width(), 43);
        assert_eq!(layout.position(constants::ORDER_NUMBER_FIELD), Some(0));
        assert_eq!(layout.position(constants::STATUS_FIELD), Some(30));
        assert_eq!(layout.position(constants::WAREHOUSE_FIELD), Some(33));
        assert_eq!(layout.position("IWRS_ORDER"), Some(36));
        assert_eq!(layout.position(constants::DELIVERY_LOCATION_INFO), Some(39));
        assert_eq!(layout.position(constants::SHIP_TO_CONTACT_INFO), Some(42));
        assert_eq!(layout.position("DELIVERY_CITY"), None);
    }

    #[test]
    fn check_detects_misaligned_lists() {
        let layout = FieldLayout::new(
            &["A".to_string(), "B".to_string()],
            &[],
        );
        assert!(layout.check(&entries(&[("A", "1"), ("B", "2")])).is_ok());
        assert!(matches!(
            layout.check(&entries(&[("B", "1"), ("A", "2")])),
            Err(AuditError::Misaligned { position: 0, .. })
        ));
        assert!(matches!(
            layout.check(&entries(&[("A", "1")])),
            Err(AuditError::LayoutWidth {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn value_reads_by_label() {
        let layout = FieldLayout::new(&["A".to_string(), "B".to_string()], &[]);
        let fields = entries(&[("A", "1"), ("B", "2")]);
        assert_eq!(layout.value(&fields, "B").unwrap(), "2");
        assert!(matches!(
            layout.value(&fields, "C"),
            Err(AuditError::MissingField { .. })
        ));
    }
}
