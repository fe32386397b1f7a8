use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used across the whole crate.
pub type Result<T> = std::result::Result<T, OracleErr>;

/// Every failure the forecasting pipeline can report.
#[derive(Debug)]
pub enum OracleErr {
    /// The series has fewer points than training needs.
    SeriesTooShort {
        got: usize,
        min: usize,
    },
    /// The window is at least as long as the series.
    LagTooLarge {
        lag: usize,
        len: usize,
    },
    /// A vector or matrix has the wrong dimension.
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// The holdout does not leave a usable training prefix.
    InvalidHoldout {
        holdout: usize,
        len: usize,
    },
    /// Not enough observed values to fill one input window.
    HistoryTooShort {
        got: usize,
        lag: usize,
    },
    /// A configuration value cannot be used.
    InvalidConfig(String),
    /// The persisted model was written with another format version.
    UnsupportedVersion {
        got: i64,
        expected: i64,
    },
    /// The persisted model violates a structural invariant.
    MalformedModel(String),
    /// A computed quantity turned into NaN or infinity.
    NonFinite(&'static str),
    /// The input source had no numeric values.
    EmptySeries,
    Io(io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
}

impl Display for OracleErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleErr::SeriesTooShort { got, min } => {
                write!(f, "series too short: got {got} points, need at least {min}")
            }
            OracleErr::LagTooLarge { lag, len } => {
                write!(f, "series length ({len}) must be larger than lag ({lag})")
            }
            OracleErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "shape mismatch for {what}: got {got}, expected {expected}"),
            OracleErr::InvalidHoldout { holdout, len } => write!(
                f,
                "invalid holdout {holdout}: must be positive and smaller than the series length ({len})"
            ),
            OracleErr::HistoryTooShort { got, lag } => {
                write!(f, "observed history has {got} points, lag needs {lag}")
            }
            OracleErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            OracleErr::UnsupportedVersion { got, expected } => {
                write!(f, "unsupported model version: {got} (expected {expected})")
            }
            OracleErr::MalformedModel(msg) => write!(f, "malformed model: {msg}"),
            OracleErr::NonFinite(what) => write!(f, "{what} is not finite"),
            OracleErr::EmptySeries => write!(f, "no numeric values found"),
            OracleErr::Io(e) => write!(f, "io error: {e}"),
            OracleErr::Json(e) => write!(f, "json error: {e}"),
            OracleErr::Csv(e) => write!(f, "csv error: {e}"),
        }
    }
}

impl Error for OracleErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OracleErr::Io(e) => Some(e),
            OracleErr::Json(e) => Some(e),
            OracleErr::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for OracleErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for OracleErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<csv::Error> for OracleErr {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}
