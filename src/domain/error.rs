//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for pesowatch.
///
/// Data-quality problems (short windows, missing sources) never show up here:
/// the domain resolves them with fallbacks. What remains are I/O failures,
/// configuration problems and requests that break a call contract.
#[derive(Debug, thiserror::Error)]
pub enum PesowatchError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("data parse error: {reason}")]
    DataParse { reason: String },

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

    #[error("no data for {series}")]
    NoData { series: String },

    #[error("window {start} to {end} contains no rows")]
    EmptyWindow { start: NaiveDate, end: NaiveDate },

    #[error("unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("invalid goal: {reason}")]
    InvalidGoal { reason: String },

    #[error("invalid horizon: {months} months (must be between 1 and {max})")]
    InvalidHorizon { months: i64, max: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PesowatchError> for std::process::ExitCode {
    fn from(err: &PesowatchError) -> Self {
        let code: u8 = match err {
            PesowatchError::Io(_) => 1,
            PesowatchError::ConfigParse { .. }
            | PesowatchError::ConfigMissing { .. }
            | PesowatchError::ConfigInvalid { .. } => 2,
            PesowatchError::DataSource { .. } | PesowatchError::DataParse { .. } => 3,
            PesowatchError::InvalidGoal { .. }
            | PesowatchError::InvalidHorizon { .. }
            | PesowatchError::UnknownColumn { .. } => 4,
            PesowatchError::NoData { .. } | PesowatchError::EmptyWindow { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
