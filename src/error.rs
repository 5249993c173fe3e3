use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Field list width mismatch: old has {old} fields, new has {new}")]
    WidthMismatch { old: usize, new: usize },

    #[error("Condensed list has {found} fields, layout expects {expected}")]
    LayoutWidth { expected: usize, found: usize },

    #[error("Field at position {position} is misaligned: expected '{expected}', found '{found}'")]
    Misaligned {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Field '{label}' is not part of the condensed layout")]
    MissingField { label: String },

    #[error("Field at position {position} has an empty label")]
    EmptyLabel { position: usize },

    #[error("Warehouse code '{code}' has no hub mapping")]
    LookupMiss { code: String },

    #[error("Unrecognized date '{value}'")]
    InvalidDate { value: String },
}

pub type Result<T> = std::result::Result<T, AuditError>;
