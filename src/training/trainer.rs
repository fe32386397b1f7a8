use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};

use super::{TrainConfig, Windows};
use crate::{
    arch::{loss::SquaredError, Gradients, Mlp, Standardizer},
    optimization::GradientDescent,
    OracleErr, Result,
};

/// The least amount of points a series needs to be trained on.
pub const MIN_SERIES_LEN: usize = 6;

/// A trained model together with everything needed to use it on raw values.
#[derive(Debug, Clone)]
pub struct TrainResult {
    model: Mlp,
    scaler: Standardizer,
    lag: usize,
    mse: f64,
    residual_std_dev: f64,
}

impl TrainResult {
    pub(crate) fn new(model: Mlp, scaler: Standardizer, mse: f64, residual_std_dev: f64) -> Self {
        Self {
            lag: model.input_size(),
            model,
            scaler,
            mse,
            residual_std_dev,
        }
    }

    pub fn model(&self) -> &Mlp {
        &self.model
    }

    pub fn scaler(&self) -> &Standardizer {
        &self.scaler
    }

    pub fn lag(&self) -> usize {
        self.lag
    }

    /// In-sample mean squared error, in the series' own units.
    pub fn mse(&self) -> f64 {
        self.mse
    }

    /// Population standard deviation of the in-sample residuals.
    pub fn residual_std_dev(&self) -> f64 {
        self.residual_std_dev
    }

    /// Predicts the value following `window`, both in raw units.
    pub fn predict_next(&self, window: &[f64]) -> Result<f64> {
        let normalized = self.scaler.transform_slice(window);
        let pred = self.model.predict(&normalized)?;
        Ok(self.scaler.inverse(pred))
    }
}

/// Runs the SGD training loop of a single model.
///
/// The trainer owns the only generator of the run: it is drawn from first by
/// the weight initialization and then by one shuffle per epoch.
pub struct Trainer {
    config: TrainConfig,
    rng: StdRng,
    optimizer: GradientDescent,
    loss_fn: SquaredError,
}

impl Trainer {
    /// Creates a new `Trainer`, filling unusable config fields with defaults.
    pub fn new(config: TrainConfig) -> Self {
        let config = config.with_defaults();

        Self {
            rng: StdRng::seed_from_u64(config.seed),
            optimizer: GradientDescent::new(config.learning_rate),
            loss_fn: SquaredError::new(),
            config,
        }
    }

    /// Trains a new model on `series`.
    ///
    /// # Errors
    /// Returns an error if the series is too short for the configured lag, or
    /// if training diverged into non-finite parameters.
    pub fn train(mut self, series: &[f64]) -> Result<TrainResult> {
        let TrainConfig {
            lag,
            hidden,
            epochs,
            ..
        } = self.config;

        if series.len() < MIN_SERIES_LEN {
            return Err(OracleErr::SeriesTooShort {
                got: series.len(),
                min: MIN_SERIES_LEN,
            });
        }
        if series.len() <= lag {
            return Err(OracleErr::LagTooLarge {
                lag,
                len: series.len(),
            });
        }

        let scaler = Standardizer::fit(series);
        let mut windows = Windows::new(scaler.transform_slice(series), lag)?;
        debug!(
            "training on {} windows: lag {lag}, hidden {hidden}, epochs {epochs}, lr {}, seed {}",
            windows.len(),
            self.config.learning_rate,
            self.config.seed,
        );

        let mut model = Mlp::random(lag, hidden, &mut self.rng)?;
        let mut grad = Gradients::zeros_like(&model);
        let log_every = (epochs / 10).max(1);

        for epoch in 0..epochs {
            windows.shuffle(&mut self.rng);
            let loss = self.run_epoch(&mut model, &mut grad, &windows)?;

            if (epoch + 1) % log_every == 0 {
                debug!("epoch {}/{epochs}: loss {loss:.6}", epoch + 1);
            }
        }

        if !model.is_finite() {
            return Err(OracleErr::NonFinite("trained model parameters"));
        }

        let (mse, residual_std_dev) = evaluate(&model, &scaler, series, &windows)?;
        info!("trained model: mse {mse:.6}, residual std dev {residual_std_dev:.6}");

        Ok(TrainResult::new(model, scaler, mse, residual_std_dev))
    }

    /// Makes one SGD pass over the windows in their shuffled order.
    ///
    /// # Returns
    /// The mean normalized loss of the pass, measured before each update.
    fn run_epoch(&self, model: &mut Mlp, grad: &mut Gradients, windows: &Windows) -> Result<f64> {
        let mut total_loss = 0.;

        for (x, y) in windows.shuffled() {
            let (h, y_pred) = model.forward(x)?;
            total_loss += self.loss_fn.loss(y_pred, y);

            let d_out = self.loss_fn.loss_prime(y_pred, y);
            model.backward(x, &h, d_out, grad)?;
            self.optimizer.update_params(model, grad);
        }

        Ok(total_loss / windows.len() as f64)
    }
}

/// Trains a model on `series` following `config`.
pub fn train(series: &[f64], config: TrainConfig) -> Result<TrainResult> {
    Trainer::new(config).train(series)
}

/// Measures the in-sample error of `model` over every window, in raw units.
///
/// # Returns
/// The mean squared residual and the population standard deviation of the
/// residuals.
fn evaluate(
    model: &Mlp,
    scaler: &Standardizer,
    series: &[f64],
    windows: &Windows,
) -> Result<(f64, f64)> {
    let lag = windows.lag();
    let residuals = windows
        .iter()
        .enumerate()
        .map(|(i, (x, _))| {
            let pred = scaler.inverse(model.predict(x)?);
            Ok(series[lag + i] - pred)
        })
        .collect::<Result<Vec<f64>>>()?;

    let n = residuals.len() as f64;
    let mse = residuals.iter().map(|r| r * r).sum::<f64>() / n;
    let mean = residuals.iter().sum::<f64>() / n;
    let variance = residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    if !mse.is_finite() || !variance.is_finite() {
        return Err(OracleErr::NonFinite("in-sample error"));
    }

    Ok((mse, variance.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(n: usize, start: f64, slope: f64) -> Vec<f64> {
        (0..n).map(|i| start + slope * i as f64).collect()
    }

    fn quick(lag: usize, hidden: usize, epochs: usize, seed: u64) -> TrainConfig {
        TrainConfig {
            lag,
            hidden,
            epochs,
            learning_rate: 0.008,
            seed,
        }
    }

    #[test]
    fn rejects_series_shorter_than_six() {
        let err = train(&[1., 2., 3., 4., 5.], quick(2, 3, 10, 0)).unwrap_err();
        assert!(matches!(err, OracleErr::SeriesTooShort { got: 5, min: 6 }));
    }

    #[test]
    fn rejects_lag_not_smaller_than_series() {
        let series = linear(8, 0., 1.);
        let err = train(&series, quick(8, 3, 10, 0)).unwrap_err();
        assert!(matches!(err, OracleErr::LagTooLarge { lag: 8, len: 8 }));
    }

    #[test]
    fn default_lag_applies_before_length_check() {
        // Lag 0 becomes the default of 6, which a 6 point series cannot hold.
        let series = linear(6, 0., 1.);
        let err = train(&series, quick(0, 3, 10, 0)).unwrap_err();
        assert!(matches!(err, OracleErr::LagTooLarge { lag: 6, len: 6 }));
    }

    #[test]
    fn result_carries_lag_and_scaler() {
        let series = linear(30, 10., 2.);
        let result = train(&series, quick(4, 5, 50, 1)).unwrap();

        assert_eq!(result.lag(), 4);
        assert_eq!(result.model().input_size(), 4);
        assert_eq!(result.model().hidden_size(), 5);
        assert_eq!(*result.scaler(), Standardizer::fit(&series));
        assert!(result.mse().is_finite() && result.mse() >= 0.);
        assert!(result.residual_std_dev().is_finite() && result.residual_std_dev() >= 0.);
    }

    #[test]
    fn same_seed_gives_identical_models() {
        let series: Vec<f64> = (0..50).map(|i| (i as f64 * 0.3).sin() * 4. + 10.).collect();

        let a = train(&series, quick(5, 6, 120, 21)).unwrap();
        let b = train(&series, quick(5, 6, 120, 21)).unwrap();
        let c = train(&series, quick(5, 6, 120, 22)).unwrap();

        assert_eq!(a.model(), b.model());
        assert_eq!(a.mse().to_bits(), b.mse().to_bits());
        assert_ne!(a.model(), c.model());
    }

    #[test]
    fn training_reduces_the_in_sample_error() {
        let series: Vec<f64> = (0..60).map(|i| (i as f64 * 0.25).sin() * 3.).collect();

        let barely = train(&series, quick(5, 8, 1, 4)).unwrap();
        let trained = train(&series, quick(5, 8, 600, 4)).unwrap();

        assert!(trained.mse() < barely.mse());
    }

    #[test]
    fn constant_series_trains_without_blowing_up() {
        let series = vec![3.5; 20];
        let result = train(&series, quick(3, 4, 100, 2)).unwrap();

        assert_eq!(result.scaler().std(), 1.);
        assert!(result.mse().is_finite());
        assert!(result.predict_next(&[3.5, 3.5, 3.5]).unwrap().is_finite());
    }

    #[test]
    fn diverging_training_is_reported() {
        let series = linear(40, 0., 1.);
        let config = TrainConfig {
            learning_rate: 1e6,
            ..quick(4, 6, 50, 0)
        };

        assert!(matches!(
            train(&series, config),
            Err(OracleErr::NonFinite(_))
        ));
    }
}
