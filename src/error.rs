//! Error types shared by the chart loader, action parser and config layer.

/// Failure while turning chart text into note descriptors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartError {
    #[error("malformed chart row at line {line}: {reason}")]
    MalformedChartRow { line: usize, reason: String },
}

impl ChartError {
    pub(crate) fn row(line: usize, reason: impl Into<String>) -> Self {
        ChartError::MalformedChartRow {
            line,
            reason: reason.into(),
        }
    }
}

/// Failure while decoding a textual action (JS boundary, replay scripts).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("unknown action: {0:?}")]
    UnknownAction(String),
}

/// Failure while reading or checking a game config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[cfg(feature = "serde_json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
