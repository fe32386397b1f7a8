use crate::{training::TrainResult, OracleErr, Result};

/// Predicts the `steps` values that follow `history`.
///
/// Every prediction is appended to the history and becomes part of the input
/// window of the next step, so errors compound the further out it goes.
///
/// # Arguments
/// * `result` - The trained model.
/// * `history` - Observed values, at least `result.lag()` of them.
/// * `steps` - The amount of future points to predict.
///
/// # Returns
/// The predictions in raw units, index 0 being one step past the end of
/// `history`.
pub fn forecast(result: &TrainResult, history: &[f64], steps: usize) -> Result<Vec<f64>> {
    let lag = result.lag();
    if history.len() < lag {
        return Err(OracleErr::HistoryTooShort {
            got: history.len(),
            lag,
        });
    }

    let mut buffer = history.to_vec();
    buffer.reserve(steps);
    let mut predictions = Vec::with_capacity(steps);

    for _ in 0..steps {
        let window = &buffer[buffer.len() - lag..];
        let next = result.predict_next(window)?;
        predictions.push(next);
        buffer.push(next);
    }

    Ok(predictions)
}
