use thiserror::Error;

/// Errors that abort a whole scan. Individual probe failures never show up here;
/// they are reported as a closed port instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot resolve target {target:?}: {source}")]
    Resolution {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid port range {start}-{end} (start > end)")]
    InvalidRange { start: i64, end: i64 },

    #[error("port out of range: {value} (expected 0-65535)")]
    PortOutOfRange { value: i64 },

    #[error("invalid port value: {input:?}")]
    InvalidPort { input: String },

    #[error("no ports selected")]
    EmptyPortList,

    #[error("probe task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type ScanResult<T> = Result<T, ScanError>;

impl ScanError {
    /// Whether the error was raised while checking the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidRange { .. }
                | ScanError::PortOutOfRange { .. }
                | ScanError::InvalidPort { .. }
                | ScanError::EmptyPortList
        )
    }
}
