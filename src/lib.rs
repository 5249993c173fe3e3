pub mod config;
pub mod constants;
pub mod error;
pub mod infra;
pub mod logging;
pub mod observability;
pub mod parser;
pub mod pipeline;
pub mod types;

pub use config::Config;
pub use error::{AuditError, Result};
pub use pipeline::{AuditTransform, BatchOutput, BatchReport};
