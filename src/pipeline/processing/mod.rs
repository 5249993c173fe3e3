// Per-row processing stages: width validation, condensation, trail diff, metadata extraction

pub mod condense;
pub mod meta;
pub mod trail;
pub mod validate;

pub use condense::{condense, FieldLayout, MergeGroup};
pub use meta::MetaExtractor;
pub use trail::TrailDiffEngine;
pub use validate::{validate, validate_pair, QuarantineReason, QuarantineRecord, QuarantineSide};
