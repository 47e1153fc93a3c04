//! Error types for run sources.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for record source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors a record source can report for a fetch.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to connect to database: {0}")]
    Connect(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("row decode error: {0}")]
    Decode(String),

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let cases = [
            (SourceError::Connect("refused".to_string()), "failed to connect to database: refused"),
            (SourceError::Query("syntax".to_string()), "query error: syntax"),
            (SourceError::Decode("status".to_string()), "row decode error: status"),
            (SourceError::Timeout(Duration::from_secs(30)), "fetch timed out after 30s"),
        ];

        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }
}
