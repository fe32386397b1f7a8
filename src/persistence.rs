use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use log::info;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    arch::{Mlp, Standardizer},
    training::TrainResult,
    OracleErr, Result,
};

/// Version written to, and required from, every model file.
pub const MODEL_FORMAT_VERSION: i64 = 1;

/// On-disk layout of a trained model.
///
/// Integer fields are signed so that negative values in a file reach
/// validation instead of failing as type errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedModel {
    pub version: i64,
    pub lag: i64,
    pub scaler: Standardizer,
    #[serde(default)]
    pub mse: f64,
    #[serde(default)]
    pub residual_std_dev: f64,
    pub w1: Vec<Vec<f64>>,
    pub b1: Vec<f64>,
    pub w2: Vec<f64>,
    pub b2: f64,
}

impl PersistedModel {
    /// Flattens `result` into its persisted form.
    pub fn from_result(result: &TrainResult) -> Self {
        let model = result.model();

        Self {
            version: MODEL_FORMAT_VERSION,
            lag: result.lag() as i64,
            scaler: *result.scaler(),
            mse: result.mse(),
            residual_std_dev: result.residual_std_dev(),
            w1: model.w1().rows().into_iter().map(|r| r.to_vec()).collect(),
            b1: model.b1().to_vec(),
            w2: model.w2().to_vec(),
            b2: model.b2(),
        }
    }

    /// Checks every structural invariant of the record.
    ///
    /// The version goes first, then the lag, the parameter shapes and finally
    /// the scaler.
    pub fn validate(&self) -> Result<()> {
        if self.version != MODEL_FORMAT_VERSION {
            return Err(OracleErr::UnsupportedVersion {
                got: self.version,
                expected: MODEL_FORMAT_VERSION,
            });
        }
        if self.lag <= 0 {
            return Err(OracleErr::MalformedModel(format!(
                "lag must be positive, got {}",
                self.lag
            )));
        }
        if self.w1.is_empty() || self.b1.is_empty() || self.w2.is_empty() {
            return Err(OracleErr::MalformedModel(
                "empty model parameters".to_string(),
            ));
        }

        let hidden = self.b1.len();
        if self.w1.len() != hidden {
            return Err(OracleErr::ShapeMismatch {
                what: "w1 rows",
                got: self.w1.len(),
                expected: hidden,
            });
        }
        if self.w2.len() != hidden {
            return Err(OracleErr::ShapeMismatch {
                what: "w2",
                got: self.w2.len(),
                expected: hidden,
            });
        }

        let lag = self.lag as usize;
        if let Some(row) = self.w1.iter().find(|row| row.len() != lag) {
            return Err(OracleErr::ShapeMismatch {
                what: "w1 row",
                got: row.len(),
                expected: lag,
            });
        }

        let std = self.scaler.std();
        if !(std > 0.) {
            return Err(OracleErr::MalformedModel(format!(
                "scaler std must be positive, got {std}"
            )));
        }

        Ok(())
    }

    /// Validates the record and builds a fresh `TrainResult` out of it.
    pub fn into_result(self) -> Result<TrainResult> {
        self.validate()?;

        let (hidden, lag) = (self.b1.len(), self.lag as usize);
        let flat: Vec<f64> = self.w1.into_iter().flatten().collect();
        let w1 = Array2::from_shape_vec((hidden, lag), flat)
            .map_err(|e| OracleErr::MalformedModel(e.to_string()))?;

        let model = Mlp::from_parts(w1, Array1::from(self.b1), Array1::from(self.w2), self.b2)?;
        Ok(TrainResult::new(model, self.scaler, self.mse, self.residual_std_dev))
    }

    /// Flattens `result` and checks the record would load back.
    ///
    /// # Errors
    /// Any validation error, or `OracleErr::NonFinite` if a parameter or
    /// metric cannot be stored as JSON.
    pub fn check_saveable(result: &TrainResult) -> Result<Self> {
        let record = Self::from_result(result);
        record.validate()?;

        let finite = result.model().is_finite()
            && [record.scaler.mean(), record.mse, record.residual_std_dev]
                .iter()
                .all(|v| v.is_finite());
        if !finite {
            return Err(OracleErr::NonFinite("model parameters"));
        }

        Ok(record)
    }
}

/// Writes `result` as pretty-printed JSON.
///
/// # Errors
/// Fails without writing if the record would not load back, e.g. when a
/// parameter is not finite.
pub fn to_writer<W: Write>(writer: W, result: &TrainResult) -> Result<()> {
    let record = PersistedModel::check_saveable(result)?;
    serde_json::to_writer_pretty(writer, &record)?;
    Ok(())
}

/// Reads a model written by `to_writer`.
///
/// The version tag is checked before the rest of the record is interpreted.
pub fn from_reader<R: Read>(reader: R) -> Result<TrainResult> {
    let value: Value = serde_json::from_reader(reader)?;

    let version = value
        .get("version")
        .and_then(Value::as_i64)
        .ok_or_else(|| OracleErr::MalformedModel("missing integer version".to_string()))?;
    if version != MODEL_FORMAT_VERSION {
        return Err(OracleErr::UnsupportedVersion {
            got: version,
            expected: MODEL_FORMAT_VERSION,
        });
    }

    let record: PersistedModel = serde_json::from_value(value)?;
    record.into_result()
}

/// Saves `result` to the file at `path`, replacing it if it exists.
///
/// A model that cannot be saved leaves any existing file untouched.
pub fn save_model(path: &Path, result: &TrainResult) -> Result<()> {
    let record = PersistedModel::check_saveable(result)?;

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &record)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!("saved model to {}", path.display());
    Ok(())
}

/// Loads a model from the file at `path`.
pub fn load_model(path: &Path) -> Result<TrainResult> {
    let result = from_reader(BufReader::new(File::open(path)?))?;
    info!(
        "loaded model from {}: lag {}, hidden {}",
        path.display(),
        result.lag(),
        result.model().hidden_size()
    );
    Ok(result)
}
