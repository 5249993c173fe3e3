//! Property tests for field recovery, condensation and batch accounting.

use proptest::prelude::*;

use order_audit::config::Config;
use order_audit::constants::ORDER_FIELD_LABELS;
use order_audit::parser::{parse_fields, FieldEntry};
use order_audit::pipeline::processing::condense;
use order_audit::pipeline::AuditTransform;
use order_audit::types::RawChangeRecord;

/// Values may hold commas, colons and spaces, but never start or end with
/// padding, which the tokenizer trims.
fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z0-9]([a-z0-9 ,:.]{0,10}[a-z0-9])?".prop_map(|s| s),
    ]
}

fn arb_entry() -> impl Strategy<Value = FieldEntry> {
    (prop::sample::select(ORDER_FIELD_LABELS.to_vec()), arb_value())
        .prop_map(|(label, value)| FieldEntry::new(label, value))
}

fn render(entries: &[FieldEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}: {}", e.label, e.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn full_list(values: &[String]) -> Vec<FieldEntry> {
    ORDER_FIELD_LABELS
        .iter()
        .zip(values)
        .map(|(label, value)| FieldEntry::new(*label, value.clone()))
        .collect()
}

proptest! {
    #[test]
    fn rendered_fields_are_recovered(entries in prop::collection::vec(arb_entry(), 0..8)) {
        let labels = Config::default().label_set();
        let recovered = parse_fields(&render(&entries), &labels);
        prop_assert_eq!(recovered, entries);
    }

    #[test]
    fn condensation_is_idempotent(values in prop::collection::vec(arb_value(), 55)) {
        let groups = Config::default().schema.merge_groups;
        let once = condense(full_list(&values), &groups);
        let twice = condense(once.clone(), &groups);
        prop_assert_eq!(once.len(), 43);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn every_row_is_accounted_for(
        rows in prop::collection::vec(
            (any::<bool>(), prop::sample::select(vec!["01", "02", "99"]), "[A-Z][a-z]{0,6}"),
            0..12,
        )
    ) {
        let transform = AuditTransform::from_config(&Config::default()).unwrap();
        let records: Vec<RawChangeRecord> = rows
            .iter()
            .enumerate()
            .map(|(i, (well_formed, warehouse, status))| {
                let number = i.to_string();
                let new = full_list(
                    &ORDER_FIELD_LABELS
                        .iter()
                        .map(|label| match *label {
                            "ORDER_NUMBER" => number.clone(),
                            "WH_ID" => warehouse.to_string(),
                            "STATUS" => status.clone(),
                            _ => String::new(),
                        })
                        .collect::<Vec<_>>(),
                );
                let mut raw_new = render(&new);
                if !well_formed {
                    raw_new = render(&new[..10]);
                }
                RawChangeRecord {
                    timestamp: "16-MAY-23".to_string(),
                    user: "u".to_string(),
                    table_name: "T_ORDER".to_string(),
                    action: "UPDATE".to_string(),
                    raw_old: render(&new),
                    raw_new,
                }
            })
            .collect();

        let output = transform.run(&records);
        prop_assert_eq!(output.report.total, records.len());
        prop_assert!(output.report.is_complete());
        prop_assert_eq!(
            output.report.quarantined,
            rows.iter().filter(|(ok, _, _)| !ok).count()
        );
    }
}
