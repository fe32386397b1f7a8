use std::{fs, path::Path};

use serde::Deserialize;

use crate::Result;

pub const DEFAULT_LAG: usize = 6;
pub const DEFAULT_HIDDEN: usize = 12;
pub const DEFAULT_EPOCHS: usize = 1800;
pub const DEFAULT_LEARNING_RATE: f64 = 0.008;
pub const DEFAULT_SEED: u64 = 42;

/// Hyperparameters of one training run.
///
/// Every field may be omitted from a config file. Zero sizes and non-positive
/// learning rates fall back to their defaults when training starts.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Window length, the amount of past points fed to the network.
    pub lag: usize,
    pub hidden: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    /// Seed of the generator used for initialization and shuffling.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            lag: DEFAULT_LAG,
            hidden: DEFAULT_HIDDEN,
            epochs: DEFAULT_EPOCHS,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: DEFAULT_SEED,
        }
    }
}

impl TrainConfig {
    /// Reads a config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Replaces every unusable field by its default.
    pub fn with_defaults(mut self) -> Self {
        if self.lag == 0 {
            self.lag = DEFAULT_LAG;
        }
        if self.hidden == 0 {
            self.hidden = DEFAULT_HIDDEN;
        }
        if self.epochs == 0 {
            self.epochs = DEFAULT_EPOCHS;
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.) {
            self.learning_rate = DEFAULT_LEARNING_RATE;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn zeroed_fields_fall_back_to_defaults() {
        let cfg = TrainConfig {
            lag: 0,
            hidden: 0,
            epochs: 0,
            learning_rate: -1.,
            seed: 7,
        }
        .with_defaults();

        assert_eq!(
            cfg,
            TrainConfig {
                seed: 7,
                ..TrainConfig::default()
            }
        );
    }

    #[test]
    fn nan_learning_rate_falls_back() {
        let cfg = TrainConfig {
            learning_rate: f64::NAN,
            ..TrainConfig::default()
        };
        assert_eq!(cfg.with_defaults().learning_rate, DEFAULT_LEARNING_RATE);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"lag": 4, "learning_rate": 0.01}}"#).unwrap();

        let cfg = TrainConfig::from_json_file(file.path()).unwrap();
        assert_eq!(cfg.lag, 4);
        assert_eq!(cfg.learning_rate, 0.01);
        assert_eq!(cfg.hidden, DEFAULT_HIDDEN);
        assert_eq!(cfg.epochs, DEFAULT_EPOCHS);
        assert_eq!(cfg.seed, DEFAULT_SEED);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "lag = 4").unwrap();
        assert!(TrainConfig::from_json_file(file.path()).is_err());
    }
}
