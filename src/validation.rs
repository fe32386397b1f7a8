use log::debug;
use serde::Serialize;

use crate::{training::TrainResult, OracleErr, Result};

/// One-step-ahead error metrics over a holdout tail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidationMetrics {
    pub count: usize,
    pub mae: f64,
    pub rmse: f64,
    /// Mean absolute percentage error, in percent. Points whose actual value
    /// is zero do not take part in it.
    pub mape: f64,
}

/// Evaluates `result` on the last `holdout` points of `series`.
///
/// Each held-out point is predicted from the `lag` real values right before
/// it, so predictions never feed back into later inputs.
///
/// # Errors
/// `OracleErr::InvalidHoldout` unless `0 < holdout < series.len()`, and
/// `OracleErr::HistoryTooShort` if the first held-out point has fewer than
/// `lag` predecessors.
pub fn validate(result: &TrainResult, series: &[f64], holdout: usize) -> Result<ValidationMetrics> {
    if holdout == 0 || holdout >= series.len() {
        return Err(OracleErr::InvalidHoldout {
            holdout,
            len: series.len(),
        });
    }

    let lag = result.lag();
    let start = series.len() - holdout;
    if start < lag {
        return Err(OracleErr::HistoryTooShort { got: start, lag });
    }

    let mut abs_sum = 0.;
    let mut sq_sum = 0.;
    let mut pct_sum = 0.;
    let mut pct_count = 0usize;

    for t in start..series.len() {
        let actual = series[t];
        let err = actual - result.predict_next(&series[t - lag..t])?;

        abs_sum += err.abs();
        sq_sum += err * err;
        if actual != 0. {
            pct_sum += (err / actual).abs();
            pct_count += 1;
        }
    }

    let n = holdout as f64;
    let mape = if pct_count > 0 {
        100. * pct_sum / pct_count as f64
    } else {
        0.
    };

    let metrics = ValidationMetrics {
        count: holdout,
        mae: abs_sum / n,
        rmse: (sq_sum / n).sqrt(),
        mape,
    };
    debug!("validated on {holdout} points: {metrics:?}");

    Ok(metrics)
}
