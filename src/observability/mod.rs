// Observability: metric names and per-phase recording helpers

pub mod metrics;

pub use self::metrics::{time_operation, MetricName, TimingGuard};
