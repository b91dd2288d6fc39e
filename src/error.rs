use std::{sync::Arc, time::Duration};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("The sequence was cancelled before the item was produced.")]
    Cancelled,

    #[error("Item was not produced within {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Producer task join error: {0}")]
    ProducerJoin(#[from] tokio::task::JoinError),

    #[error("Error external to paced occurred: {0}")]
    External(Arc<str>),

    #[cfg(feature = "serde")]
    #[error("Couldn't parse the configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// `true` when production stopped because of a shutdown or an explicit cancel.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_error_keeps_message() {
        let err = Error::External("sensor offline".into());
        assert_eq!(err.to_string(), "Error external to paced occurred: sensor offline");
        assert!(!err.is_cancelled());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_predicates() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(Error::Timeout(Duration::from_millis(5)).is_timeout());
        assert!(!Error::InvalidConfig("x".into()).is_timeout());
    }
}
