//! Storage abstraction for classified reports.

use async_trait::async_trait;

use crate::error::PersistError;
use crate::report::StatsReport;

/// A store that can persist one report per call.
///
/// Implementations must be safe to share across concurrent requests; any
/// connection they use is acquired for the duration of a single call.
#[async_trait]
pub trait StatsStore: Send + Sync + 'static {
    /// Write `report` as exactly one row in its variant's table.
    async fn insert_report(&self, report: &StatsReport) -> Result<(), PersistError>;

    /// Lightweight liveness check.
    async fn ping(&self) -> anyhow::Result<()>;
}
