use serde::{Deserialize, Serialize};

/// Below this fitted deviation the series is treated as constant.
const MIN_STD: f64 = 1e-9;

/// Zero-mean, unit-variance transform fitted on a series.
///
/// `std` is never zero once fitted, so `transform` can always divide by it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    #[serde(alias = "Mean")]
    mean: f64,
    #[serde(alias = "Std")]
    std: f64,
}

impl Standardizer {
    /// Fits the population mean and standard deviation of `values`.
    ///
    /// An empty slice yields the identity transform (mean 0, std 1), and a
    /// (near) constant series gets std 1.
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self { mean: 0., std: 1. };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut std = variance.sqrt();
        if std < MIN_STD {
            std = 1.;
        }

        Self { mean, std }
    }

    /// Builds a standardizer from already known moments.
    pub(crate) fn from_moments(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std(&self) -> f64 {
        self.std
    }

    pub fn transform(&self, v: f64) -> f64 {
        (v - self.mean) / self.std
    }

    pub fn inverse(&self, v: f64) -> f64 {
        v * self.std + self.mean
    }

    pub fn transform_slice(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }
}
