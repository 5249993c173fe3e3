//! Recovery of labelled field lists from the export's delimited text blobs.
//!
//! Each OLD_VALUES / NEW_VALUES cell is a single string of the form
//! `LABEL: value, LABEL: value, ...` with no escaping. The tokenizer splits it
//! back into fields using the label vocabulary as the only reliable boundary
//! marker; [`FieldEntry`] gives each recovered field a label/value shape.

mod field;
mod tokenizer;

pub use field::{parse_fields, FieldEntry};
pub use tokenizer::{tokenize, LabelSet};
