//! Error taxonomy for a reconciliation run.

use std::path::PathBuf;

/// Errors that abort a run.
///
/// Parse anomalies inside cells never surface here: they resolve to defaults at the point
/// of reading. Everything below is fatal and is turned into a failed `RunResult` by the
/// orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read workbook {path:?}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl ReconError {
    pub fn workbook(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Workbook {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = ReconError::Config("No loan files and no billing file provided.".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: No loan files and no billing file provided."
        );
    }

    #[test]
    fn test_io_error_converts() {
        fn open() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing.xlsx"))?;
            Ok(())
        }

        match open() {
            Err(ReconError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
