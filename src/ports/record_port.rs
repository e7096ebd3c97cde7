//! Snapshot persistence port.

use crate::domain::error::SnapshotError;
use crate::domain::metrics::MetricsRecord;
use std::path::Path;

/// Port for appending snapshot rows to a durable log.
pub trait RecordPort {
    fn append(&self, symbol: &str, record: &MetricsRecord) -> Result<(), SnapshotError>;

    /// Where rows end up, for operator messages.
    fn location(&self) -> &Path;
}
