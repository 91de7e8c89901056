use thiserror::Error;

/// Failures surfaced by time parsing, interval validation, and grid
/// configuration. Layout and aggregation assume pre-validated input and
/// never produce these themselves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrellisError {
    #[error("invalid time '{0}': expected HH:MM between 00:00 and 24:00")]
    InvalidFormat(String),

    #[error("invalid interval {0}..{1}: start must lie before end within the day")]
    InvalidInterval(u16, u16),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type TrellisResult<T> = Result<T, TrellisError>;
