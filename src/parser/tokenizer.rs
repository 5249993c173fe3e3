use std::collections::HashSet;

/// The known field-label vocabulary of a schema
pub type LabelSet = HashSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Consuming the running value of the current field
    InValue,
    /// Just passed a `,` at `comma`; deciding whether it ends the field
    AtBoundary { comma: usize },
}

/// Split one raw change-log string into `LABEL: value` field strings.
///
/// A `,` ends the current field only when the text after it (past any spaces)
/// up to the next `:` is a member of `labels`. Every other `,` and `:` is
/// literal punctuation inside the running value. The first field's label is
/// whatever precedes the first `:`.
///
/// Trailing `,` and spaces are trimmed from every emitted field. Input with no
/// `:` yields no fields.
///
/// A value whose text is exactly a known label, placed right after a `,`, is
/// indistinguishable from a field boundary and will be split there. A `:`
/// never starts a field on its own: `LABEL: a: OTHER: b` is one field.
pub fn tokenize(raw: &str, labels: &LabelSet) -> Vec<String> {
    let mut fields = Vec::new();

    let mut field_start = skip_spaces(raw, 0);
    let Some(first_colon) = find_from(raw, field_start, ':') else {
        return fields;
    };

    let mut cursor = first_colon + 1;
    // Only ever moves forward, so each `:` is inspected once.
    let mut next_colon = find_from(raw, cursor, ':');
    let mut state = ScanState::InValue;

    loop {
        match state {
            ScanState::InValue => match find_from(raw, cursor, ',') {
                Some(comma) => {
                    cursor = comma + 1;
                    state = ScanState::AtBoundary { comma };
                }
                None => {
                    fields.push(finish_field(&raw[field_start..]));
                    break;
                }
            },
            ScanState::AtBoundary { comma } => {
                let label_start = skip_spaces(raw, cursor);
                while let Some(colon) = next_colon {
                    if colon >= label_start {
                        break;
                    }
                    next_colon = find_from(raw, colon + 1, ':');
                }

                if let Some(colon) = next_colon {
                    if labels.contains(&raw[label_start..colon]) {
                        fields.push(finish_field(&raw[field_start..comma]));
                        field_start = label_start;
                        cursor = colon + 1;
                    }
                }
                state = ScanState::InValue;
            }
        }
    }

    fields
}

fn find_from(raw: &str, from: usize, needle: char) -> Option<usize> {
    raw[from..].find(needle).map(|i| i + from)
}

fn skip_spaces(raw: &str, from: usize) -> usize {
    let rest = &raw[from..];
    from + (rest.len() - rest.trim_start_matches(' ').len())
}

fn finish_field(text: &str) -> String {
    text.trim_end_matches(|c: char| c == ',' || c == ' ').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> LabelSet {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn splits_well_formed_fields() {
        let known = labels(&["ORDER_NUMBER", "CARRIER", "STATUS"]);
        let fields = tokenize("ORDER_NUMBER: 1001, CARRIER: UPS, STATUS: Open", &known);
        assert_eq!(fields, vec!["ORDER_NUMBER: 1001", "CARRIER: UPS", "STATUS: Open"]);
    }

    #[test]
    fn commas_inside_values_are_absorbed() {
        let known = labels(&["DELIVERY_ADDR1", "DELIVERY_CITY"]);
        let fields = tokenize(
            "DELIVERY_ADDR1: Building 4, Floor 2, Room 12, DELIVERY_CITY: Indianapolis",
            &known,
        );
        assert_eq!(
            fields,
            vec![
                "DELIVERY_ADDR1: Building 4, Floor 2, Room 12",
                "DELIVERY_CITY: Indianapolis"
            ]
        );
    }

    #[test]
    fn only_a_comma_can_open_a_field() {
        let known = labels(&["DETAILS_FOR_RECEIVER", "STATUS"]);
        let fields = tokenize("DETAILS_FOR_RECEIVER: Attn: STATUS: Open", &known);
        assert_eq!(fields, vec!["DETAILS_FOR_RECEIVER: Attn: STATUS: Open"]);

        let fields = tokenize("DETAILS_FOR_RECEIVER: Attn: STATUS: Open, STATUS: Closed", &known);
        assert_eq!(
            fields,
            vec!["DETAILS_FOR_RECEIVER: Attn: STATUS: Open", "STATUS: Closed"]
        );
    }

    #[test]
    fn colons_inside_values_are_absorbed() {
        let known = labels(&["DETAILS_FOR_RECEIVER", "PRIORITY"]);
        let fields = tokenize(
            "DETAILS_FOR_RECEIVER: Attn: pharmacy, deliver 09:30, PRIORITY: 1",
            &known,
        );
        assert_eq!(
            fields,
            vec!["DETAILS_FOR_RECEIVER: Attn: pharmacy, deliver 09:30", "PRIORITY: 1"]
        );
    }

    #[test]
    fn unknown_label_like_text_stays_in_value() {
        let known = labels(&["CARRIER", "STATUS"]);
        let fields = tokenize("CARRIER: DHL, NOTE: fragile, STATUS: Open", &known);
        assert_eq!(fields, vec!["CARRIER: DHL, NOTE: fragile", "STATUS: Open"]);
    }

    #[test]
    fn empty_values_are_kept_and_trimmed() {
        let known = labels(&["BACKORDER", "CARRIER", "DEA_NUMBER"]);
        let fields = tokenize("BACKORDER: , CARRIER: ,DEA_NUMBER: ", &known);
        assert_eq!(fields, vec!["BACKORDER:", "CARRIER:", "DEA_NUMBER:"]);
    }

    #[test]
    fn extra_spaces_before_label_are_separators() {
        let known = labels(&["CARRIER", "STATUS"]);
        let fields = tokenize("CARRIER: UPS,    STATUS: Open", &known);
        assert_eq!(fields, vec!["CARRIER: UPS", "STATUS: Open"]);
    }

    #[test]
    fn single_leading_space_of_value_is_preserved() {
        let known = labels(&["CARRIER"]);
        let fields = tokenize("CARRIER:  UPS", &known);
        assert_eq!(fields, vec!["CARRIER:  UPS"]);
    }

    #[test]
    fn no_colon_yields_no_fields() {
        let known = labels(&["CARRIER"]);
        assert!(tokenize("", &known).is_empty());
        assert!(tokenize("just, some, text", &known).is_empty());
    }

    #[test]
    fn first_label_need_not_be_known() {
        let known = labels(&["STATUS"]);
        let fields = tokenize("LEGACY: x, STATUS: Open", &known);
        assert_eq!(fields, vec!["LEGACY: x", "STATUS: Open"]);
    }

    #[test]
    fn value_equal_to_a_label_is_split_at_that_point() {
        // Known limitation: the value text "STATUS" followed by ':' reads as a boundary.
        let known = labels(&["DETAILS_FOR_RECEIVER", "STATUS"]);
        let fields = tokenize("DETAILS_FOR_RECEIVER: see, STATUS: later, STATUS: Open", &known);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], "DETAILS_FOR_RECEIVER: see");
    }
}
