use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("unrecognized granularity `{0}` (expected week, month, quarter or year)")]
    InvalidGranularity(String),

    #[error("no row has a parseable `timestamp` ({dropped} rows dropped)")]
    NoValidRows { dropped: usize },

    #[error("no aggregate records to render")]
    NothingToRender,
}

#[derive(Error, Debug)]
pub enum NpsError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NpsError {
    pub fn is_validation(&self) -> bool {
        matches!(self, NpsError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, NpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_names_the_field() {
        let err = NpsError::from(ValidationError::MissingColumn("nps".to_string()));
        assert_eq!(
            err.to_string(),
            "Validation error: missing required column `nps`"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn invalid_granularity_echoes_the_value() {
        let err = ValidationError::InvalidGranularity("fortnight".to_string());
        assert!(err.to_string().contains("`fortnight`"));
    }

    #[test]
    fn io_error_carries_path() {
        let err = NpsError::Io {
            path: PathBuf::from("/tmp/responses.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/responses.csv"));
        assert!(msg.contains("no such file"));
        assert!(!err.is_validation());
    }
}
