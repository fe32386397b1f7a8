//! Single hidden layer neural forecaster for univariate time series.
//!
//! A series is standardized, cut into sliding windows of `lag` points and fed
//! to a small `tanh` network trained with plain SGD. The trained model can
//! forecast autoregressively, be validated on a holdout tail and be stored as
//! versioned JSON.

pub mod arch;
pub mod dataset;
mod error;
mod forecast;
pub mod optimization;
pub mod persistence;
pub mod report;
pub mod training;
mod validation;

pub use error::{OracleErr, Result};
pub use forecast::forecast;
pub use persistence::{load_model, save_model};
pub use training::{train, TrainConfig, TrainResult};
pub use validation::{validate, ValidationMetrics};
