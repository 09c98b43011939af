pub mod days_to_unsubscribe;
pub mod summary;

pub use days_to_unsubscribe::{annotate_days_to_unsubscribe, calculate_days_to_unsubscribe};
pub use summary::{compute_metrics, MetricsSummary};
