//! Domain error types.

/// Top-level error type for snaptrader.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("{source_name} fetch failed: {reason}")]
    DataSource { source_name: String, reason: String },

    #[error("insufficient data for {symbol}: no candles returned")]
    InsufficientData { symbol: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to write {path}: {reason}")]
    Persist { path: String, reason: String },
}

impl SnapshotError {
    pub fn history(reason: impl Into<String>) -> Self {
        SnapshotError::DataSource {
            source_name: "history".into(),
            reason: reason.into(),
        }
    }

    pub fn fundamentals(reason: impl Into<String>) -> Self {
        SnapshotError::DataSource {
            source_name: "fundamentals".into(),
            reason: reason.into(),
        }
    }

    /// Errors raised before any row was written; the run is abandoned cleanly.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            SnapshotError::DataSource { .. } | SnapshotError::InsufficientData { .. }
        )
    }
}

impl From<&SnapshotError> for std::process::ExitCode {
    fn from(err: &SnapshotError) -> Self {
        let code: u8 = match err {
            SnapshotError::Persist { .. } => 1,
            SnapshotError::ConfigParse { .. }
            | SnapshotError::ConfigMissing { .. }
            | SnapshotError::ConfigInvalid { .. } => 2,
            SnapshotError::DataSource { .. } => 3,
            SnapshotError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
